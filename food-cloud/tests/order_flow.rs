mod common;

use http::{Method, StatusCode};
use serde_json::{Value, json};

use common::app;

fn order_body() -> Value {
    json!({
        "payment_id": "pi_3Q0test",
        "payment_status_id": 2,
        "total_amount": 24.5,
        "currency": "CHF",
        "items": [
            { "name": "Dal Curry", "quantity": 2, "price": 10.0, "subtotal": 20.0 },
            { "name": "Chai", "quantity": 1, "price": 4.5, "subtotal": 4.5 },
        ],
    })
}

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["order_id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn order_moves_from_current_to_delivered() {
    let app = app();
    let admin = app.admin_token().await;
    let user = app.user_token("anna@example.com").await;

    let (status, body) = app
        .post(
            "/api/v1/delivery-persons/create-person",
            Some(&admin),
            json!({ "name": "Luca", "phone": "+41 79 000 00 00" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Delivery person added");
    let courier_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .post("/api/v1/orders/create-order", Some(&user), order_body())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order created successfully");
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
    assert!(order_id.starts_with("ORD-"));
    assert_eq!(order_id.len(), "ORD-20260101-ABC123".len());
    assert_eq!(body["data"]["order_status"], "Pending");
    assert_eq!(body["data"]["payment_status"], "Paid");
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    // Best-effort confirmation
    let mails = app.mail.sent_to("anna@example.com");
    let confirmation = mails.last().unwrap();
    assert!(confirmation.subject.contains(&order_id));
    assert!(confirmation.html.contains("Dal Curry"));
    assert!(confirmation.html.contains("24.50 CHF"));

    let (status, body) = app.get("/api/v1/orders/current", Some(&user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![order_id.clone()]);

    let uri = format!("/api/v1/orders/order/{order_id}");
    let (status, body) = app.get(&uri, Some(&user)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order fetched successfully");

    let (status, body) = app
        .get("/api/v1/orders/admin/get-current-orders", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![order_id.clone()]);
    assert_eq!(body["data"][0]["user_name"], "Anna Muster");

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/v1/orders/admin/update-order/{order_id}"),
            Some(&admin),
            Some(json!({ "order_status_id": 4, "delivery_person_id": courier_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order status updated successfully");
    assert_eq!(body["data"]["order_status"], "Delivered");
    assert_eq!(body["data"]["delivery_person_name"], "Luca");

    let (_, body) = app
        .get("/api/v1/orders/admin/get-current-orders", Some(&admin))
        .await;
    assert!(ids(&body).is_empty());
    let (_, body) = app
        .get("/api/v1/orders/admin/get-delivered-orders", Some(&admin))
        .await;
    assert_eq!(ids(&body), vec![order_id.clone()]);

    let (_, body) = app.get("/api/v1/orders/current", Some(&user)).await;
    assert!(ids(&body).is_empty());
    let (status, body) = app.get(&uri, Some(&user)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found or already delivered");
}

#[tokio::test]
async fn orders_are_private_to_their_owner() {
    let app = app();
    let anna = app.user_token("anna@example.com").await;
    let ben = app.user_token("ben@example.com").await;

    let (_, body) = app
        .post("/api/v1/orders/create-order", Some(&anna), order_body())
        .await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();

    let (status, _) = app
        .get(&format!("/api/v1/orders/order/{order_id}"), Some(&ben))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/v1/orders/current", Some(&ben)).await;
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn invalid_orders_and_updates_rejected() {
    let app = app();
    let admin = app.admin_token().await;
    let user = app.user_token("anna@example.com").await;

    let mut empty = order_body();
    empty["items"] = json!([]);
    let (status, body) = app
        .post("/api/v1/orders/create-order", Some(&user), empty)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order must contain at least one item");

    let mut unknown_payment = order_body();
    unknown_payment["payment_status_id"] = json!(99);
    let (status, body) = app
        .post("/api/v1/orders/create-order", Some(&user), unknown_payment)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Payment status not found");

    // Outside NUMERIC(10, 2): rejected before anything is stored
    let mut oversized = order_body();
    oversized["total_amount"] = json!("1000000000.123");
    let (status, body) = app
        .post("/api/v1/orders/create-order", Some(&user), oversized)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Total amount:"));
    let (_, body) = app.get("/api/v1/orders/current", Some(&user)).await;
    assert!(ids(&body).is_empty());

    // Admins cannot place customer orders
    let (status, _) = app
        .post("/api/v1/orders/create-order", Some(&admin), order_body())
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = app
        .post("/api/v1/orders/create-order", Some(&user), order_body())
        .await;
    let order_id = body["data"]["order_id"].as_str().unwrap().to_string();
    let update_uri = format!("/api/v1/orders/admin/update-order/{order_id}");

    let (status, body) = app
        .call(
            Method::PUT,
            &update_uri,
            Some(&admin),
            Some(json!({ "order_status_id": 99 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order status not found");

    let (status, _) = app
        .call(
            Method::PUT,
            &update_uri,
            Some(&admin),
            Some(json!({ "order_status_id": 2, "delivery_person_id": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/v1/orders/admin/update-order/ORD-20000101-NOPE00",
            Some(&admin),
            Some(json!({ "order_status_id": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Any transition is allowed, including back out of Delivered
    for status_id in [4, 1] {
        let (status, _) = app
            .call(
                Method::PUT,
                &update_uri,
                Some(&admin),
                Some(json!({ "order_status_id": status_id })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = app.get("/api/v1/orders/current", Some(&user)).await;
    assert_eq!(ids(&body), vec![order_id]);
}

#[tokio::test]
async fn lookup_tables_listed_for_admins() {
    let app = app();
    let admin = app.admin_token().await;

    let (status, body) = app.get("/api/v1/payment-statuses", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Payment statuses fetched");
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Pending", "Paid", "Failed", "Refunded"]);

    let (status, body) = app
        .post(
            "/api/v1/delivery-persons/create-person",
            Some(&admin),
            json!({ "name": "  ", "phone": "123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name and phone are required");

    let (status, body) = app
        .get("/api/v1/delivery-persons/get-persons", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}
