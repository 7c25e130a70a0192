use shared::models::{NewUser, OtpState, ProfileWrite, User, UserProfile};
use sqlx::PgPool;

use crate::store::StoreError;

const USER_COLUMNS: &str = "id, firstname, lastname, email, password_hash, is_verified, \
     otp_hash, otp_expires_at, contact_email, created_at";

const PROFILE_COLUMNS: &str = "id, firstname, lastname, companyname, country, street_address, \
     address_line2, postcode, city, email, contact_email, phone, ship_to_different_address, \
     order_notes";

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub otp_hash: Option<String>,
    pub otp_expires_at: Option<i64>,
    pub contact_email: Option<String>,
    pub created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let otp = match (row.otp_hash, row.otp_expires_at) {
            (Some(code_hash), Some(expires_at)) => Some(OtpState {
                code_hash,
                expires_at,
            }),
            (None, None) => None,
            _ => {
                return Err(StoreError::Backend(
                    format!("user {} has a half-set OTP", row.id).into(),
                ));
            }
        };
        Ok(User {
            id: row.id,
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            password_hash: row.password_hash,
            is_verified: row.is_verified,
            otp,
            contact_email: row.contact_email,
            created_at: row.created_at,
        })
    }
}

pub async fn create(pool: &PgPool, user: &NewUser) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO users (firstname, lastname, email, password_hash, is_verified, \
         otp_hash, otp_expires_at, created_at)
         VALUES ($1, $2, $3, $4, FALSE, $5, $6, $7)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.firstname)
    .bind(&user.lastname)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.otp.code_hash)
    .bind(user.otp.expires_at)
    .bind(user.created_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Overwrites any outstanding code
pub async fn set_otp(pool: &PgPool, email: &str, otp: &OtpState) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET otp_hash = $1, otp_expires_at = $2 WHERE email = $3")
            .bind(&otp.code_hash)
            .bind(otp.expires_at)
            .bind(email)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Single conditional UPDATE: only one of two concurrent verifications wins
pub async fn consume_otp(
    pool: &PgPool,
    email: &str,
    expected_hash: &str,
    now: i64,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE users SET is_verified = TRUE, otp_hash = NULL, otp_expires_at = NULL
         WHERE email = $1 AND otp_hash = $2 AND otp_expires_at >= $3
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(expected_hash)
    .bind(now)
    .fetch_optional(pool)
    .await
}

pub async fn reset_password(
    pool: &PgPool,
    email: &str,
    expected_hash: &str,
    now: i64,
    new_password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = $4, otp_hash = NULL, otp_expires_at = NULL
         WHERE email = $1 AND otp_hash = $2 AND otp_expires_at >= $3",
    )
    .bind(email)
    .bind(expected_hash)
    .bind(now)
    .bind(new_password_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn get_profile(pool: &PgPool, user_id: i64) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    p: &ProfileWrite,
) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE users SET
            firstname = $1, lastname = $2, companyname = $3, country = $4,
            street_address = $5, address_line2 = $6, postcode = $7, city = $8,
            contact_email = $9, phone = $10, ship_to_different_address = $11,
            order_notes = $12
         WHERE id = $13
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(&p.firstname)
    .bind(&p.lastname)
    .bind(&p.companyname)
    .bind(&p.country)
    .bind(&p.street_address)
    .bind(&p.address_line2)
    .bind(&p.postcode)
    .bind(&p.city)
    .bind(&p.contact_email)
    .bind(&p.phone)
    .bind(p.ship_to_different_address)
    .bind(&p.order_notes)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
