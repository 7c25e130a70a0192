//! Server configuration

use std::path::PathBuf;

use crate::BoxError;
use crate::logger::DEFAULT_FILTER;

/// SMTP relay settings (`EMAIL_*`)
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// STARTTLS port
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for session tokens
    pub jwt_secret: String,
    /// Admin session lifetime in seconds (`JWT_EXPIRES_IN`, e.g. `1d`, `12h`, `3600`)
    pub admin_token_ttl_secs: i64,
    /// SMTP relay; `None` falls back to the console transport
    pub smtp: Option<SmtpConfig>,
    /// Sender address (the SMTP user)
    pub mail_from_address: String,
    /// Display name on outgoing mail
    pub mail_from_name: String,
    /// Directory holding `otp.html` and `order_confirmation.html`
    pub template_dir: PathBuf,
    /// Directory uploaded images are written to and served from
    pub upload_dir: PathBuf,
    /// Tracing filter directive
    pub log_level: String,
    /// Optional directory for rolling log files
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let jwt_secret = require_secret(&get, "JWT_SECRET", &environment)?;
        let admin_token_ttl_secs = match get("JWT_EXPIRES_IN") {
            Some(raw) => parse_duration_secs(&raw)?,
            None => 24 * 60 * 60,
        };

        let smtp = match (get("EMAIL_HOST"), get("EMAIL_USER"), get("EMAIL_PASS")) {
            (Some(host), Some(username), Some(password)) => Some(SmtpConfig {
                host,
                port: get("EMAIL_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username,
                password,
            }),
            _ => None,
        };
        let mail_from_address = get("EMAIL_USER").unwrap_or_else(|| "noreply@localhost".into());

        Ok(Self {
            database_url: get("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            http_port: get("PORT").and_then(|p| p.parse().ok()).unwrap_or(5000),
            environment,
            jwt_secret,
            admin_token_ttl_secs,
            smtp,
            mail_from_address,
            mail_from_name: get("MAIL_FROM_NAME").unwrap_or_else(|| "Yoga Food".into()),
            template_dir: get("TEMPLATE_DIR")
                .unwrap_or_else(|| "templates".into())
                .into(),
            upload_dir: get("UPLOAD_DIR").unwrap_or_else(|| "uploads".into()).into(),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_FILTER.into()),
            log_dir: get("LOG_DIR"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Require a secret: must be set and non-empty outside development.
fn require_secret<G>(get: &G, name: &str, environment: &str) -> Result<String, BoxError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(v) => Ok(v),
        None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
        None => Err(format!("{name} must be set in {environment} environment").into()),
    }
}

/// Parse `JWT_EXPIRES_IN` style durations: bare seconds or `<n>s|m|h|d`.
pub fn parse_duration_secs(raw: &str) -> Result<i64, BoxError> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };
    let value: i64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration: {raw}"))?;
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(format!("invalid duration unit in {raw}").into()),
    };
    if value <= 0 {
        return Err(format!("duration must be positive: {raw}").into());
    }
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("duration out of range: {raw}").into())
}
