use crate::errors::Error;
use crate::middleware::authorization::{AccessSubject, ANONYMOUS};
use actix_web::dev::ServiceRequest;
use actix_web::HttpMessage;

#[tracing::instrument(name = "authenticate as anonym", skip(req))]
pub fn anonym(req: &mut ServiceRequest) -> Result<bool, Error> {
    let subject = AccessSubject(ANONYMOUS.to_string());
    if req.extensions_mut().insert(subject).is_some() {
        tracing::error!("access subject already set");
        return Err(Error::Internal("Authentication failed".to_string()));
    }

    Ok(true)
}
