use crate::errors::Error;
use crate::forms;
use crate::models;
use crate::routes::customer::ensure_owner;
use crate::services::CustomerService;
use crate::views;
use actix_web::{put, web, HttpResponse, Responder, Result};
use std::sync::Arc;

#[tracing::instrument(name = "Update customer.", skip(form, service))]
#[put("/{id}")]
pub async fn update_handler(
    identity: web::ReqData<Arc<models::Identity>>,
    path: web::Path<(String,)>,
    form: web::Json<forms::CustomerUpdateForm>,
    service: web::Data<CustomerService>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner().0;
    ensure_owner(&identity, &id)?;

    let customer = service.update(&id, form.into_inner()).await?;

    Ok(HttpResponse::Ok().json(views::Customer::from(customer)))
}
