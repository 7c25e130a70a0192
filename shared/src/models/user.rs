//! User (customer) Models

use serde::{Deserialize, Serialize};

/// Outstanding one-time code on a credential
///
/// The code and its expiry exist together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpState {
    /// SHA-256 hex digest of the 6-digit code
    pub code_hash: String,
    /// Unix millis after which the code is rejected
    pub expires_at: i64,
}

impl OtpState {
    /// Still valid at `now` (inclusive of the expiry instant)
    pub fn is_valid_at(&self, now: i64) -> bool {
        now <= self.expires_at
    }
}

/// Customer credential
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub otp: Option<OtpState>,
    pub contact_email: Option<String>,
    pub created_at: i64,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).trim().to_string()
    }

    /// Address order confirmations go to
    pub fn notification_email(&self) -> &str {
        match self.contact_email.as_deref() {
            Some(addr) if !addr.trim().is_empty() => addr,
            _ => &self.email,
        }
    }
}

/// Insert payload for a new, unverified user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub otp: OtpState,
    pub created_at: i64,
}

/// Profile as returned to the customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserProfile {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub companyname: Option<String>,
    pub country: Option<String>,
    pub street_address: Option<String>,
    pub address_line2: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub email: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub ship_to_different_address: bool,
    pub order_notes: Option<String>,
}

/// Profile update request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub companyname: Option<String>,
    pub country: Option<String>,
    pub street_address: Option<String>,
    pub address_line2: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub ship_to_different_address: Option<bool>,
    pub order_notes: Option<String>,
}

/// Fully resolved profile write (required fields present, optional ones defaulted)
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileWrite {
    pub firstname: String,
    pub lastname: String,
    pub companyname: String,
    pub country: String,
    pub street_address: String,
    pub address_line2: String,
    pub postcode: String,
    pub city: String,
    pub contact_email: String,
    pub phone: String,
    pub ship_to_different_address: bool,
    pub order_notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(contact: Option<&str>) -> User {
        User {
            id: 1,
            firstname: "Anna".into(),
            lastname: "Muster".into(),
            email: "anna@x.com".into(),
            password_hash: String::new(),
            is_verified: true,
            otp: None,
            contact_email: contact.map(str::to_string),
            created_at: 0,
        }
    }

    #[test]
    fn otp_valid_through_expiry_instant() {
        let otp = OtpState {
            code_hash: "h".into(),
            expires_at: 1_000,
        };
        assert!(otp.is_valid_at(999));
        assert!(otp.is_valid_at(1_000));
        assert!(!otp.is_valid_at(1_001));
    }

    #[test]
    fn notification_email_prefers_contact() {
        assert_eq!(user(Some("c@x.com")).notification_email(), "c@x.com");
        assert_eq!(user(Some("  ")).notification_email(), "anna@x.com");
        assert_eq!(user(None).notification_email(), "anna@x.com");
    }

    #[test]
    fn user_serialization_hides_secrets() {
        let json = serde_json::to_value(user(None)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("otp").is_none());
    }
}
