use crate::errors::Error;
use crate::forms;
use crate::services::CustomerService;
use crate::views;
use actix_web::{post, web, HttpResponse, Responder, Result};
use serde_valid::Validate;

#[tracing::instrument(name = "Register customer.", skip_all)]
#[post("")]
pub async fn add_handler(
    form: web::Json<forms::CustomerForm>,
    service: web::Data<CustomerService>,
) -> Result<impl Responder, Error> {
    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Err(Error::BadRequest(errors.to_string()));
    }

    let customer = service.create(form).await?;

    Ok(HttpResponse::Created().json(views::Customer::from(customer)))
}
