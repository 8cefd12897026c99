use crate::errors::Error;
use crate::forms;
use crate::helpers::TokenCodec;
use crate::services::CustomerService;
use crate::views;
use actix_web::{post, web, HttpResponse, Responder, Result};
use chrono::{DateTime, Utc};

#[tracing::instrument(name = "Customer login.", skip(service, codec))]
#[post("/auth/login")]
pub async fn login_handler(
    form: web::Json<forms::LoginForm>,
    service: web::Data<CustomerService>,
    codec: web::Data<TokenCodec>,
) -> Result<impl Responder, Error> {
    let form = form.into_inner();
    let (Some(email), Some(password)) = (
        forms::non_blank(form.email),
        forms::non_blank(form.password),
    ) else {
        return Err(Error::BadRequest("Email and password are required".to_string()));
    };

    let identity = service.authenticate(&email, &password).await?;
    let (access_token, claims) = codec.issue(&identity).map_err(|err| {
        tracing::error!("Token issue failed: {err}");
        Error::Internal("Token could not be issued".to_string())
    })?;
    let expires_at = DateTime::<Utc>::from_timestamp(claims.expires_at, 0)
        .ok_or_else(|| Error::Internal("Token expiry out of range".to_string()))?;

    tracing::info!("Customer {} logged in", identity.subject_id);
    Ok(HttpResponse::Ok().json(views::Login {
        id: identity.subject_id,
        email: identity.email,
        role: identity.role,
        access_token,
        token_type: "Bearer",
        expires_at,
    }))
}
