use crate::errors::Error;
use crate::helpers::jwt::{extract_bearer_token, TokenCodec, TokenError};
use crate::middleware::authentication::get_header;
use crate::middleware::authorization::AccessSubject;
use crate::models;
use actix_web::{dev::ServiceRequest, web, HttpMessage};
use std::sync::Arc;

/// Same body for every rejected token, whatever the cause.
const INVALID_TOKEN: &str = "Invalid or expired token";

#[tracing::instrument(name = "Authenticate with JWT", skip(req))]
pub fn try_jwt(req: &mut ServiceRequest) -> Result<bool, Error> {
    let authorization = get_header::<String>(req, "authorization").map_err(|err| {
        tracing::warn!("Unreadable authorization header: {err}");
        Error::Unauthorized(INVALID_TOKEN.to_string())
    })?;
    let Some(authorization) = authorization else {
        return Ok(false);
    };

    // Other schemes are treated as no credential at all.
    let Some(token) = extract_bearer_token(&authorization) else {
        return Ok(false);
    };

    let codec = req.app_data::<web::Data<TokenCodec>>().ok_or_else(|| {
        tracing::error!("token codec is not registered");
        Error::Internal("Authentication failed".to_string())
    })?;

    let claims = codec.validate(token).map_err(|err| match err {
        TokenError::InvalidSignature
        | TokenError::Expired
        | TokenError::MalformedToken(_)
        | TokenError::IssuerMismatch => {
            tracing::warn!("Bearer token rejected: {err}");
            Error::Unauthorized(INVALID_TOKEN.to_string())
        }
        other => {
            tracing::error!("Bearer token could not be checked: {other}");
            Error::Internal("Authentication failed".to_string())
        }
    })?;

    let identity = models::Identity::from(&claims);
    tracing::debug!("ACL check for JWT role: {}", identity.role);
    let subject = AccessSubject(identity.role.to_string());

    if req.extensions_mut().insert(Arc::new(identity)).is_some() {
        tracing::error!("identity already bound to request");
        return Err(Error::Internal("Authentication failed".to_string()));
    }

    if req.extensions_mut().insert(subject).is_some() {
        tracing::error!("access subject already set");
        return Err(Error::Internal("Authentication failed".to_string()));
    }

    Ok(true)
}
