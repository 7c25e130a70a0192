//! Session token issuing and validation
//!
//! Tokens are HS256 JWTs carrying a role claim. Admin tokens embed the admin
//! id and email and live for the configured lifetime; user tokens embed the
//! user id only and live for seven days. Expiry is checked with zero leeway.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::User;

use crate::error::ServiceResult;
use crate::store::CredentialStore;

/// Fixed lifetime of customer sessions
pub const USER_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Role carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin or user id
    pub sub: i64,
    /// Admin email (admin tokens only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Authenticated admin, resolved from the token alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub admin_id: i64,
    pub email: String,
}

/// Issues and validates session tokens
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_ttl_secs: i64,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("admin_ttl_secs", &self.admin_ttl_secs)
            .finish_non_exhaustive()
    }
}

impl SessionIssuer {
    pub fn new(secret: &str, admin_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            admin_ttl_secs,
        }
    }

    pub fn issue_admin_token(&self, admin_id: i64, email: &str) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        self.sign(&Claims {
            sub: admin_id,
            email: Some(email.to_string()),
            role: Role::Admin,
            iat: now,
            exp: now + self.admin_ttl_secs,
        })
    }

    pub fn issue_user_token(&self, user_id: i64) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        self.sign(&Claims {
            sub: user_id,
            email: None,
            role: Role::User,
            iat: now,
            exp: now + USER_TOKEN_TTL_SECS,
        })
    }

    /// Signature, expiry and role check. No store lookup.
    pub fn validate_admin(&self, token: &str) -> Result<AdminIdentity, AppError> {
        let claims = self.decode(token)?;
        match (claims.role, claims.email) {
            (Role::Admin, Some(email)) => Ok(AdminIdentity {
                admin_id: claims.sub,
                email,
            }),
            (Role::Admin, None) => Err(AppError::invalid_token("Malformed admin token")),
            (Role::User, _) => Err(AppError::new(ErrorCode::AdminRequired)),
        }
    }

    /// Signature, expiry and role check, then the user must still exist
    pub async fn validate_user(
        &self,
        token: &str,
        store: &dyn CredentialStore,
    ) -> ServiceResult<User> {
        let claims = self.decode(token)?;
        if claims.role != Role::User {
            return Err(AppError::invalid_token("Not a user token").into());
        }
        match store.find_user_by_id(claims.sub).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!(user_id = claims.sub, "Token references a missing user");
                Err(AppError::with_message(ErrorCode::NotAuthenticated, "User not found").into())
            }
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(
            |e| {
                tracing::error!(error = %e, "Failed to sign session token");
                AppError::new(ErrorCode::InternalError)
            },
        )
    }

    fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenExpired),
                _ => {
                    tracing::debug!(error = %e, "JWT validation failed");
                    AppError::new(ErrorCode::TokenInvalid)
                }
            })
    }
}
