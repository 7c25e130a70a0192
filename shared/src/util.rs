/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Normalize an email address for lookups and unique constraints
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
