use crate::errors::Error;
use crate::services::CustomerService;
use actix_web::{delete, web, HttpResponse, Responder, Result};

#[tracing::instrument(name = "Delete customer.", skip(service))]
#[delete("/{id}")]
pub async fn delete_handler(
    path: web::Path<(String,)>,
    service: web::Data<CustomerService>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner().0;
    if !service.delete(&id).await? {
        return Err(Error::NotFound(format!("Customer not found with id: {id}")));
    }

    Ok(HttpResponse::NoContent().finish())
}
