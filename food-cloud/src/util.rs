//! Shared utility functions for food-cloud

use rand::Rng;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

pub use shared::util::{normalize_email, now_millis};

/// Random 6-digit one-time code in `[100000, 999999]`
pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// SHA-256 hex digest of a one-time code, the form stored on the credential row
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}

/// Exclusive upper bound of a `NUMERIC(10, 2)` money column
const AMOUNT_LIMIT: i64 = 100_000_000;
const AMOUNT_SCALE: u32 = 2;

/// Whether `value` is stored unchanged by a `NUMERIC(10, 2)` column:
/// non-negative, at most two decimals, below 10^8
pub fn is_storable_amount(value: Decimal) -> bool {
    !value.is_sign_negative()
        && value.normalize().scale() <= AMOUNT_SCALE
        && value < Decimal::from(AMOUNT_LIMIT)
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
