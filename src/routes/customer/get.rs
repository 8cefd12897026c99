use crate::errors::Error;
use crate::forms;
use crate::models;
use crate::routes::customer::ensure_owner;
use crate::services::CustomerService;
use crate::views;
use actix_web::{get, web, HttpResponse, Responder, Result};
use std::sync::Arc;

#[tracing::instrument(name = "Get customer.", skip(service))]
#[get("/{id}")]
pub async fn item_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    path: web::Path<(String,)>,
    service: web::Data<CustomerService>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner().0;
    ensure_owner(&identity, &id)?;

    let customer = service.get_by_id(&id).await?;

    Ok(HttpResponse::Ok().json(views::Customer::from(customer)))
}

#[tracing::instrument(name = "Get customer by email.", skip(service))]
#[get("/email/{email}")]
pub async fn by_email_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    path: web::Path<(String,)>,
    service: web::Data<CustomerService>,
) -> Result<impl Responder, Error> {
    let email = path.into_inner().0;
    // Ownership is decided on the stored record, never on the token's email claim.
    let customer = match service.get_by_email(&email).await {
        Err(Error::NotFound(_)) if !identity.is_admin() => {
            tracing::warn!("Customer {} asked for unknown {email}", identity.subject_id);
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        result => result?,
    };
    ensure_owner(&identity, &customer.id)?;

    Ok(HttpResponse::Ok().json(views::Customer::from(customer)))
}

#[tracing::instrument(name = "List customers.", skip(service))]
#[get("")]
pub async fn list_handler(
    query: web::Query<forms::PageQuery>,
    service: web::Data<CustomerService>,
) -> Result<impl Responder, Error> {
    let (page, size) = query.normalize();
    let customers = service.list(page, size).await?;

    Ok(HttpResponse::Ok().json(customers.map(views::Customer::from)))
}
