use crate::configuration::Settings;
use crate::db::{CustomerRepository, IdAllocator};
use crate::errors::Error;
use crate::helpers::TokenCodec;
use crate::middleware;
use crate::routes;
use crate::services::CustomerService;
use actix_web::{dev::Server, error, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub async fn run(
    listener: TcpListener,
    repository: Arc<dyn CustomerRepository>,
    ids: Arc<dyn IdAllocator>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let codec = TokenCodec::new(&settings.jwt)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let codec = web::Data::new(codec);

    let customer_service = web::Data::new(CustomerService::new(repository, ids));

    let authorization = middleware::authorization::AccessControl::try_new().await?;
    let error_translator = middleware::error_handler::ErrorTranslator::new(settings.debug_stacktrace);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let msg = match err {
            error::JsonPayloadError::Deserialize(err) => format!(
                "Malformed request body at line {}, column {}: {}",
                err.line(),
                err.column(),
                err
            ),
            other => format!("Malformed request body: {other}"),
        };
        Error::BadRequest(msg).into()
    });
    let path_config = web::PathConfig::default()
        .error_handler(|err, _req| Error::BadRequest(format!("Invalid path: {err}")).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| Error::BadRequest(format!("Invalid query: {err}")).into());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(authorization.clone())
            .wrap(middleware::authentication::Manager::new())
            .wrap(error_translator)
            .wrap(TracingLogger::default())
            .app_data(json_config.clone())
            .app_data(path_config.clone())
            .app_data(query_config.clone())
            .app_data(codec.clone())
            .app_data(customer_service.clone())
            .route("/health_check", web::get().to(routes::health_check))
            .service(
                web::scope("/customers")
                    .service(routes::customer::login_handler)
                    .service(routes::customer::by_email_handler)
                    .service(routes::customer::role_handler)
                    .service(routes::customer::list_handler)
                    .service(routes::customer::add_handler)
                    .service(routes::customer::item_handler)
                    .service(routes::customer::update_handler)
                    .service(routes::customer::delete_handler),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
