use crate::configuration::JwtSettings;
use crate::models::{Identity, Role};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde_derive::{Deserialize, Serialize};

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "iss")]
    pub issuer: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Identity {
            subject_id: claims.user_id.clone(),
            email: claims.email.clone(),
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token is malformed: {0}")]
    MalformedToken(String),
    #[error("token issuer does not match")]
    IssuerMismatch,
    #[error("signing secret must be at least 32 bytes")]
    WeakSecret,
    #[error("token could not be signed: {0}")]
    Signing(String),
}

/// Issues and validates HS256 tokens. Every node issuing or validating
/// tokens has to be configured with the same secret and issuer.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(settings: &JwtSettings) -> Result<Self, TokenError> {
        let secret = settings.secret.as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: settings.issuer.clone(),
            ttl: Duration::seconds(settings.ttl_seconds),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn issue(&self, identity: &Identity) -> Result<(String, Claims), TokenError> {
        self.issue_with_ttl(identity, self.ttl)
    }

    pub fn issue_with_ttl(
        &self,
        identity: &Identity,
        ttl: Duration,
    ) -> Result<(String, Claims), TokenError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: identity.subject_id.clone(),
            email: identity.email.clone(),
            role: identity.role,
            issuer: self.issuer.clone(),
            issued_at: now.timestamp(),
            expires_at: (now + ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))?;

        Ok((token, claims))
    }

    /// Checks run in a fixed order: structure, expiry, signature, issuer.
    /// An expired token is reported as `Expired` whoever signed it.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let unverified = peek_claims(token)?;
        if Utc::now().timestamp() > unverified.expires_at {
            return Err(TokenError::Expired);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.set_issuer(&[self.issuer.as_str()]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
                _ => TokenError::MalformedToken(err.to_string()),
            })
    }
}

/// Decode the payload without looking at the signature.
fn peek_claims(token: &str) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::MalformedToken(
            "expected 3 parts (header.payload.signature)".to_string(),
        ));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|err| TokenError::MalformedToken(format!("payload is not base64url: {err}")))?;

    serde_json::from_slice(&payload)
        .map_err(|err| TokenError::MalformedToken(format!("claims can't be parsed: {err}")))
}

/// Returns the credential after `Bearer `, or `None` for any other scheme.
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    authorization
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn settings(secret: &str, issuer: &str) -> JwtSettings {
        JwtSettings {
            secret: secret.to_string(),
            issuer: issuer.to_string(),
            ttl_seconds: 3600,
        }
    }

    fn customer() -> Identity {
        Identity {
            subject_id: "5".to_string(),
            email: "a@b.com".to_string(),
            role: Role::Customer,
        }
    }

    #[test]
    fn issued_token_validates_to_same_claims() {
        let codec = TokenCodec::new(&settings(SECRET, "customer-service")).unwrap();
        let (token, issued) = codec.issue(&customer()).unwrap();

        let claims = codec.validate(&token).unwrap();
        assert_eq!(issued, claims);
        assert_eq!("5", claims.user_id);
        assert_eq!(Role::Customer, claims.role);
        assert_eq!(3600, claims.expires_at - claims.issued_at);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = TokenCodec::new(&settings(SECRET, "customer-service")).unwrap();
        let (token, _) = codec
            .issue_with_ttl(&customer(), Duration::seconds(-60))
            .unwrap();

        assert_eq!(Err(TokenError::Expired), codec.validate(&token));
    }

    #[test]
    fn expired_token_from_other_secret_is_still_expired() {
        let other = TokenCodec::new(&settings(&"x".repeat(40), "customer-service")).unwrap();
        let codec = TokenCodec::new(&settings(SECRET, "customer-service")).unwrap();
        let (token, _) = other
            .issue_with_ttl(&customer(), Duration::seconds(-60))
            .unwrap();

        assert_eq!(Err(TokenError::Expired), codec.validate(&token));
    }

    #[test]
    fn foreign_secret_fails_signature() {
        let other = TokenCodec::new(&settings(&"x".repeat(40), "customer-service")).unwrap();
        let codec = TokenCodec::new(&settings(SECRET, "customer-service")).unwrap();
        let (token, _) = other.issue(&customer()).unwrap();

        assert_eq!(Err(TokenError::InvalidSignature), codec.validate(&token));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let other = TokenCodec::new(&settings(SECRET, "someone-else")).unwrap();
        let codec = TokenCodec::new(&settings(SECRET, "customer-service")).unwrap();
        let (token, _) = other.issue(&customer()).unwrap();

        assert_eq!(Err(TokenError::IssuerMismatch), codec.validate(&token));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = TokenCodec::new(&settings(SECRET, "customer-service")).unwrap();

        assert!(matches!(
            codec.validate("not-a-token"),
            Err(TokenError::MalformedToken(_))
        ));
        assert!(matches!(
            codec.validate("a.%%%.c"),
            Err(TokenError::MalformedToken(_))
        ));
    }

    #[test]
    fn short_secret_is_refused() {
        assert!(matches!(
            TokenCodec::new(&settings("too-short", "customer-service")),
            Err(TokenError::WeakSecret)
        ));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(Some("abc.def.ghi"), extract_bearer_token("Bearer abc.def.ghi"));
        assert_eq!(None, extract_bearer_token("Basic dXNlcjpwdw=="));
        assert_eq!(None, extract_bearer_token("Bearer "));
    }
}
