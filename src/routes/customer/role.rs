use crate::errors::Error;
use crate::forms;
use crate::services::CustomerService;
use crate::views;
use actix_web::{put, web, HttpResponse, Responder, Result};

#[tracing::instrument(name = "Update customer role.", skip(service))]
#[put("/{id}/role")]
pub async fn role_handler(
    path: web::Path<(String,)>,
    form: web::Json<forms::RoleForm>,
    service: web::Data<CustomerService>,
) -> Result<impl Responder, Error> {
    let id = path.into_inner().0;
    let customer = service.update_role(&id, form.role.as_deref()).await?;

    Ok(HttpResponse::Ok().json(views::Customer::from(customer)))
}
