mod common;

use http::StatusCode;
use serde_json::json;

use common::{app, code_in};

#[tokio::test]
async fn registration_verification_and_login() {
    let app = app();

    let (status, body) = app
        .post(
            "/api/v1/user/register",
            None,
            json!({
                "firstname": "Anna",
                "lastname": "Muster",
                "email": " Anna@Example.COM ",
                "password": "secret1",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isSuccess"], true);
    assert_eq!(body["message"], "User registered. OTP sent to email.");
    assert_eq!(body["data"]["email"], "anna@example.com");

    let mails = app.mail.sent_to("anna@example.com");
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].subject, "Verify Your YogasFood Account");
    let code = code_in(&mails[0]);
    assert!(mails[0].html.contains(&code));
    assert!(mails[0].html.contains("Anna Muster"));

    // Not verified yet
    let (status, body) = app
        .post(
            "/api/v1/user/login",
            None,
            json!({ "email": "anna@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email not verified");

    let wrong = if code == "999999" { "100000" } else { "999999" };
    let (status, body) = app
        .post(
            "/api/v1/user/verify-otp",
            None,
            json!({ "email": "anna@example.com", "otp": wrong }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid or expired OTP");
    assert!(body["data"].is_null());

    let (status, body) = app
        .post(
            "/api/v1/user/verify-otp",
            None,
            json!({ "email": "anna@example.com", "otp": code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email verified successfully");

    // The code is single use
    let (status, _) = app
        .post(
            "/api/v1/user/verify-otp",
            None,
            json!({ "email": "anna@example.com", "otp": code }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/v1/user/login",
            None,
            json!({ "email": "ANNA@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn duplicate_registration_rejected() {
    let app = app();
    app.user_token("dup@example.com").await;

    let (status, body) = app
        .post(
            "/api/v1/user/register",
            None,
            json!({
                "firstname": "Other",
                "lastname": "Person",
                "email": "DUP@example.com",
                "password": "secret2",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn resend_supersedes_previous_code() {
    let app = app();
    app.post(
        "/api/v1/user/register",
        None,
        json!({
            "firstname": "Ben",
            "lastname": "Koch",
            "email": "ben@example.com",
            "password": "secret1",
        }),
    )
    .await;
    let first = app.last_code("ben@example.com");

    let (status, body) = app
        .post(
            "/api/v1/user/resend-otp",
            None,
            json!({ "email": "ben@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "New OTP sent to email");
    let mails = app.mail.sent_to("ben@example.com");
    assert_eq!(mails.len(), 2);
    assert_eq!(mails[1].subject, "Verify Your YogasFood Account - New OTP");
    let second = code_in(&mails[1]);

    if first != second {
        let (status, _) = app
            .post(
                "/api/v1/user/verify-otp",
                None,
                json!({ "email": "ben@example.com", "otp": first }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    let (status, _) = app
        .post(
            "/api/v1/user/verify-otp",
            None,
            json!({ "email": "ben@example.com", "otp": second }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/api/v1/user/resend-otp", None, json!({ "email": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is required");
}

#[tokio::test]
async fn forgot_and_reset_password() {
    let app = app();
    app.user_token("cara@example.com").await;

    let (status, body) = app
        .post(
            "/api/v1/user/forgot-password",
            None,
            json!({ "email": "cara@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset OTP sent to email");
    let code = app.last_code("cara@example.com");

    let (status, body) = app
        .post(
            "/api/v1/user/reset-password",
            None,
            json!({ "email": "cara@example.com", "otp": code, "newPassword": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "New password must not be the same as the old password"
    );

    let (status, body) = app
        .post(
            "/api/v1/user/reset-password",
            None,
            json!({ "email": "cara@example.com", "otp": code, "newPassword": "short" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters");

    let (status, body) = app
        .post(
            "/api/v1/user/reset-password",
            None,
            json!({ "email": "cara@example.com", "otp": code, "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully");

    let (status, _) = app
        .post(
            "/api/v1/user/login",
            None,
            json!({ "email": "cara@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .post(
            "/api/v1/user/login",
            None,
            json!({ "email": "cara@example.com", "password": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/api/v1/user/forgot-password",
            None,
            json!({ "email": "nobody@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found with this email");
}

#[tokio::test]
async fn profile_get_and_update() {
    let app = app();
    let token = app.user_token("dora@example.com").await;

    let (status, body) = app.get("/api/v1/user/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile fetched");
    assert_eq!(body["data"]["firstname"], "Anna");
    assert_eq!(body["data"]["ship_to_different_address"], false);

    let (status, body) = app
        .call(
            http::Method::PUT,
            "/api/v1/user/updateprofile",
            Some(&token),
            Some(json!({ "firstname": "Dora", "lastname": "Muster", "city": "Bern" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Country / Region, Street Address, Postcode / ZIP, Contact Email Address, and Phone is required"
    );

    let (status, body) = app
        .call(
            http::Method::PUT,
            "/api/v1/user/updateprofile",
            Some(&token),
            Some(json!({
                "firstname": "Dora",
                "lastname": "Muster",
                "companyname": "Yoga AG",
                "country": "Switzerland",
                "street_address": "Marktgasse 5",
                "postcode": "3011",
                "city": "Bern",
                "contact_email": "Orders@Dora.ch",
                "phone": "+41 31 000 00 00",
                "ship_to_different_address": true,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["data"]["firstname"], "Dora");
    assert_eq!(body["data"]["contact_email"], "orders@dora.ch");
    assert_eq!(body["data"]["ship_to_different_address"], true);
    assert_eq!(body["data"]["order_notes"], "");
}

#[tokio::test]
async fn auth_rejections_use_the_envelope() {
    let app = app();
    let admin = app.admin_token().await;
    let user = app.user_token("eve@example.com").await;

    let (status, body) = app.get("/api/v1/user/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["isSuccess"], false);
    assert_eq!(body["status"], 401);
    assert!(body["data"].is_null());

    let (status, _) = app.get("/api/v1/user/profile", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin token on a customer route
    let (status, _) = app.get("/api/v1/user/profile", Some(&admin)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Customer token on an admin route
    let (status, body) = app.get("/api/v1/order-status", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin role required");

    let (status, body) = app.get("/api/v1/order-status", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    // Token signed with another secret
    let foreign = food_cloud::auth::SessionIssuer::new("other-secret", 3600)
        .issue_admin_token(1, "admin@yoga.test")
        .unwrap();
    let (status, _) = app.get("/api/v1/payment-statuses", Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_register_and_login_errors() {
    let app = app();
    app.admin_token().await;

    let (status, body) = app
        .post(
            "/api/v1/admin/register",
            None,
            json!({ "name": "Again", "email": "admin@yoga.test", "password": "whatever" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Admin already exists");

    let (status, body) = app
        .post("/api/v1/admin/register", None, json!({ "name": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name, email, and password are required");

    let (status, body) = app
        .post(
            "/api/v1/admin/login",
            None,
            json!({ "email": "admin@yoga.test", "password": "wrong-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = app
        .post(
            "/api/v1/admin/login",
            None,
            json!({ "email": "not-an-email", "password": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email format");
}
