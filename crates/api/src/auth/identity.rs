//! Verification of identity-provider tokens.
//!
//! Sign-in is delegated to an external identity provider. It hands the
//! browser an HS256-signed JWT whose claims carry the user's verified email;
//! this module only checks the signature and expiry and reads the email.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityClaims {
    /// The signed-in user's email address.
    pub email: String,
    /// Whether the provider verified the address. Absent means verified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for validating identity tokens.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
}

impl IdentityConfig {
    /// Load identity configuration from environment variables.
    ///
    /// | Env Var           | Required |
    /// |-------------------|----------|
    /// | `IDENTITY_SECRET` | **yes**  |
    ///
    /// # Panics
    ///
    /// Panics if `IDENTITY_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("IDENTITY_SECRET")
            .expect("IDENTITY_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "IDENTITY_SECRET must not be empty");
        Self { secret }
    }
}

/// Issue a token the way the identity provider does.
///
/// Used by tests and local tooling; production tokens come from the provider.
pub fn issue_identity_token(
    email: &str,
    lifetime_secs: i64,
    config: &IdentityConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = IdentityClaims {
        email: email.to_string(),
        email_verified: Some(true),
        exp: now + lifetime_secs,
        iat: now,
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a token and return the normalized (trimmed, lowercase) email.
///
/// Returns `None` for a token that is well-formed but explicitly unverified
/// or carries an empty email.
pub fn verified_email(
    token: &str,
    config: &IdentityConfig,
) -> Result<Option<String>, jsonwebtoken::errors::Error> {
    let token_data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    let claims = token_data.claims;

    if claims.email_verified == Some(false) {
        return Ok(None);
    }
    let email = claims.email.trim().to_lowercase();
    Ok((!email.is_empty()).then_some(email))
}
