//! OTP credential lifecycle: registration, verification, resend, password reset
//!
//! Every issuance overwrites the previous code, so at most one code is
//! outstanding per user. Verification and reset are conditional updates on
//! the stored code hash; a code superseded between check and write loses.

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{NewUser, OtpState, User};
use validator::ValidateEmail;

use crate::auth::SessionIssuer;
use crate::email::{DispatchMode, Notification, NotificationDispatcher};
use crate::error::{ServiceError, ServiceResult};
use crate::store::{CredentialStore, StoreError};
use crate::util::{generate_code, hash_code, hash_password, normalize_email, verify_password};

/// OTP lifetime: 10 minutes
pub const OTP_TTL_MILLIS: i64 = 10 * 60 * 1000;

/// Minimum password length for users and admins
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registration request body
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`] characters
pub fn check_password_length(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    Ok(())
}

fn display_name(user: &User) -> String {
    let name = user.full_name();
    if name.is_empty() { "User".into() } else { name }
}

pub struct OtpService {
    store: Arc<dyn CredentialStore>,
    dispatcher: Arc<NotificationDispatcher>,
    sessions: SessionIssuer,
}

impl OtpService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        dispatcher: Arc<NotificationDispatcher>,
        sessions: SessionIssuer,
    ) -> Self {
        Self {
            store,
            dispatcher,
            sessions,
        }
    }

    /// Issue a fresh code for `user`, superseding any outstanding one.
    /// Returns the plaintext code for dispatch.
    pub async fn issue(&self, user: &User, now: i64) -> ServiceResult<String> {
        let code = generate_code();
        let otp = OtpState {
            code_hash: hash_code(&code),
            expires_at: now + OTP_TTL_MILLIS,
        };
        if !self.store.set_otp(&user.email, &otp).await? {
            return Err(AppError::new(ErrorCode::UserNotFound).into());
        }
        tracing::debug!(user_id = user.id, "OTP issued");
        Ok(code)
    }

    /// Create an unverified user and mail the first code
    pub async fn register(&self, req: RegisterRequest, now: i64) -> ServiceResult<User> {
        let firstname = req.firstname.trim();
        let lastname = req.lastname.trim();
        let email = normalize_email(&req.email);
        if firstname.is_empty() {
            return Err(AppError::validation("Firstname is required").into());
        }
        if lastname.is_empty() {
            return Err(AppError::validation("Lastname is required").into());
        }
        if email.is_empty() || !email.validate_email() {
            return Err(AppError::validation("Valid email is required").into());
        }
        check_password_length(&req.password)?;

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
        }

        let code = generate_code();
        let new_user = NewUser {
            firstname: firstname.to_string(),
            lastname: lastname.to_string(),
            email: email.clone(),
            password_hash: hash_password(&req.password)?,
            otp: OtpState {
                code_hash: hash_code(&code),
                expires_at: now + OTP_TTL_MILLIS,
            },
            created_at: now,
        };
        let user = match self.store.create_user(new_user).await {
            Ok(user) => user,
            Err(StoreError::Conflict(_)) => {
                return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(user_id = user.id, email = %user.email, "User registered");

        self.dispatcher
            .dispatch(
                DispatchMode::MustSucceed,
                &user.email,
                &Notification::RegistrationOtp {
                    name: display_name(&user),
                    code,
                },
            )
            .await?;
        Ok(user)
    }

    /// Consume the outstanding code and mark the user verified
    pub async fn verify(&self, email: &str, code: &str, now: i64) -> ServiceResult<User> {
        let email = normalize_email(email);
        if email.is_empty() || code.trim().is_empty() {
            return Err(AppError::validation("Email and OTP required").into());
        }
        if self.store.find_user_by_email(&email).await?.is_none() {
            return Err(AppError::new(ErrorCode::UserNotFound).into());
        }
        match self.store.consume_otp(&email, &hash_code(code), now).await? {
            Some(user) => {
                tracing::info!(user_id = user.id, "Email verified");
                Ok(user)
            }
            None => Err(AppError::new(ErrorCode::OtpInvalid).into()),
        }
    }

    /// Issue and mail a new verification code. The previous one need not have expired.
    pub async fn resend(&self, email: &str, now: i64) -> ServiceResult<()> {
        let user = self.require_user(email).await?;
        let code = self.issue(&user, now).await?;
        self.dispatcher
            .dispatch(
                DispatchMode::MustSucceed,
                &user.email,
                &Notification::ResendOtp {
                    name: display_name(&user),
                    code,
                },
            )
            .await?;
        Ok(())
    }

    /// Issue and mail a password reset code
    pub async fn forgot_password(&self, email: &str, now: i64) -> ServiceResult<()> {
        let user = self.require_user(email).await?;
        let code = self.issue(&user, now).await?;
        self.dispatcher
            .dispatch(
                DispatchMode::MustSucceed,
                &user.email,
                &Notification::PasswordResetOtp {
                    name: display_name(&user),
                    code,
                },
            )
            .await?;
        Ok(())
    }

    /// Replace the password with a valid code. Verification state is not required.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
        now: i64,
    ) -> ServiceResult<()> {
        let email = normalize_email(email);
        if email.is_empty() || code.trim().is_empty() || new_password.is_empty() {
            return Err(AppError::validation("Email, OTP, and new password are required").into());
        }
        check_password_length(new_password)?;

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

        let code_hash = hash_code(code);
        let code_ok = user
            .otp
            .as_ref()
            .is_some_and(|otp| otp.code_hash == code_hash && otp.is_valid_at(now));
        if !code_ok {
            return Err(AppError::new(ErrorCode::OtpInvalid).into());
        }

        if verify_password(new_password, &user.password_hash) {
            return Err(AppError::new(ErrorCode::SamePassword).into());
        }

        let new_hash = hash_password(new_password)?;
        if !self
            .store
            .reset_password(&email, &code_hash, now, &new_hash)
            .await?
        {
            // Superseded or expired between the check and the write
            return Err(AppError::new(ErrorCode::OtpInvalid).into());
        }
        tracing::info!(user_id = user.id, "Password reset");
        Ok(())
    }

    /// Password login for verified users
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::InvalidLogin))?;

        if !verify_password(password, &user.password_hash) {
            tracing::warn!(user_id = user.id, "Login with wrong password");
            return Err(AppError::new(ErrorCode::InvalidLogin).into());
        }
        if !user.is_verified {
            return Err(AppError::new(ErrorCode::EmailNotVerified).into());
        }

        let token = self.sessions.issue_user_token(user.id)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok(LoginOutcome { token, user })
    }

    async fn require_user(&self, email: &str) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::validation("Email is required").into());
        }
        self.store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::{MailError, MailTransport, OutgoingMail};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const NOW: i64 = 1_767_225_600_000;

    #[derive(Default)]
    struct Outbox(Mutex<Vec<OutgoingMail>>);

    impl Outbox {
        /// Code from the latest mail's text body
        fn last_code(&self) -> String {
            let mails = self.0.lock().unwrap();
            let text = &mails.last().unwrap().text;
            text.split_whitespace()
                .map(|w| w.trim_end_matches('.'))
                .find(|w| w.len() == 6 && w.chars().all(|c| c.is_ascii_digit()))
                .unwrap()
                .to_string()
        }
    }

    #[async_trait]
    impl MailTransport for Outbox {
        async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
            self.0.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    struct Down;

    #[async_trait]
    impl MailTransport for Down {
        async fn deliver(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
            Err(MailError::InvalidAddress("relay unavailable".into()))
        }
    }

    fn templates_dir() -> std::path::PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
    }

    fn service_with(transport: Arc<dyn MailTransport>) -> (OtpService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(templates_dir(), transport).unwrap());
        let service = OtpService::new(
            store.clone(),
            dispatcher,
            SessionIssuer::new("test-secret", 3600),
        );
        (service, store)
    }

    fn request(email: &str) -> RegisterRequest {
        RegisterRequest {
            firstname: "Anna".into(),
            lastname: "Muster".into(),
            email: email.into(),
            password: "secret1".into(),
        }
    }

    #[tokio::test]
    async fn register_validates_before_writing() {
        let (service, store) = service_with(Arc::new(Outbox::default()));

        let mut req = request("a@x.com");
        req.firstname = " ".into();
        let err = service.register(req, NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let err = service.register(request("not-an-email"), NOW).await.unwrap_err();
        assert_eq!(AppError::from(err).message, "Valid email is required");

        let mut req = request("a@x.com");
        req.password = "12345".into();
        let err = service.register(req, NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PasswordTooShort);

        assert!(store.find_user_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn register_normalizes_email_and_rejects_duplicates() {
        let outbox = Arc::new(Outbox::default());
        let (service, _store) = service_with(outbox.clone());
        let user = service.register(request(" A@X.com "), NOW).await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert!(!user.is_verified);

        let mails = outbox.0.lock().unwrap().clone();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "a@x.com");
        assert_eq!(mails[0].subject, "Verify Your YogasFood Account");

        let err = service.register(request("a@x.com"), NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmailAlreadyRegistered);
    }

    #[tokio::test]
    async fn register_fails_when_mail_cannot_be_sent() {
        let (service, _store) = service_with(Arc::new(Down));
        let err = service.register(request("a@x.com"), NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DispatchFailed);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_code_then_accepts_right_one() {
        let outbox = Arc::new(Outbox::default());
        let (service, _store) = service_with(outbox.clone());
        service.register(request("a@x.com"), NOW).await.unwrap();
        let code = outbox.last_code();
        let wrong = if code == "999999" { "100000" } else { "999999" };

        let err = service.verify("a@x.com", wrong, NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpInvalid);

        let user = service.verify("a@x.com", &code, NOW).await.unwrap();
        assert!(user.is_verified);
        assert!(user.otp.is_none());

        // Consumed codes cannot be replayed
        let err = service.verify("a@x.com", &code, NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpInvalid);
    }

    #[tokio::test]
    async fn verify_unknown_email_is_not_found() {
        let (service, _store) = service_with(Arc::new(Outbox::default()));
        let err = service.verify("ghost@x.com", "123456", NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn expiry_boundary_is_inclusive() {
        let outbox = Arc::new(Outbox::default());
        let (service, _store) = service_with(outbox.clone());
        service.register(request("a@x.com"), NOW).await.unwrap();
        let code = outbox.last_code();

        let expiry = NOW + OTP_TTL_MILLIS;
        let err = service.verify("a@x.com", &code, expiry + 1_000).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpInvalid);
        assert!(service.verify("a@x.com", &code, expiry).await.is_ok());
    }

    #[tokio::test]
    async fn resend_supersedes_previous_code() {
        let outbox = Arc::new(Outbox::default());
        let (service, _store) = service_with(outbox.clone());
        service.register(request("a@x.com"), NOW).await.unwrap();
        let first = outbox.last_code();

        service.resend("a@x.com", NOW + 1).await.unwrap();
        let second = outbox.last_code();
        assert_eq!(
            outbox.0.lock().unwrap().last().unwrap().subject,
            "Verify Your YogasFood Account - New OTP"
        );

        if first != second {
            let err = service.verify("a@x.com", &first, NOW + 2).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::OtpInvalid);
        }
        assert!(service.verify("a@x.com", &second, NOW + 2).await.is_ok());

        let err = service.resend("ghost@x.com", NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn login_requires_verification() {
        let outbox = Arc::new(Outbox::default());
        let (service, _store) = service_with(outbox.clone());
        service.register(request("a@x.com"), NOW).await.unwrap();

        let err = service.login("a@x.com", "secret1").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::EmailNotVerified);
        let err = service.login("a@x.com", "wrong-pass").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLogin);
        let err = service.login("ghost@x.com", "secret1").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidLogin);

        service.verify("a@x.com", &outbox.last_code(), NOW).await.unwrap();
        let outcome = service.login("A@x.com", "secret1").await.unwrap();
        assert!(!outcome.token.is_empty());
        assert_eq!(outcome.user.email, "a@x.com");
    }

    #[tokio::test]
    async fn reset_with_same_password_leaves_hash_untouched() {
        let outbox = Arc::new(Outbox::default());
        let (service, store) = service_with(outbox.clone());
        service.register(request("a@x.com"), NOW).await.unwrap();
        let before = store.find_user_by_email("a@x.com").await.unwrap().unwrap();

        service.forgot_password("a@x.com", NOW).await.unwrap();
        assert_eq!(
            outbox.0.lock().unwrap().last().unwrap().subject,
            "Password Reset Request - YogasFood"
        );
        let code = outbox.last_code();

        let err = service
            .reset_password("a@x.com", &code, "secret1", NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SamePassword);
        let after = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(after.password_hash, before.password_hash);
        assert!(after.otp.is_some());

        // Unverified users may reset
        service
            .reset_password("a@x.com", &code, "secret2", NOW)
            .await
            .unwrap();
        let after = store.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert!(after.otp.is_none());
        assert!(verify_password("secret2", &after.password_hash));

        let err = service
            .reset_password("a@x.com", &code, "secret3", NOW)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OtpInvalid);
    }

    #[tokio::test]
    async fn forgot_password_unknown_email() {
        let (service, _store) = service_with(Arc::new(Outbox::default()));
        let err = service.forgot_password("ghost@x.com", NOW).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }
}
