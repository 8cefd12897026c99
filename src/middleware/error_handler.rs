use crate::errors::Error;
use crate::helpers::ErrorResponse;
use actix_web::{
    body::{EitherBody, MessageBody},
    error::InternalError,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    HttpResponse, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

const UNEXPECTED: &str = "An unexpected error occurred";

/// Rewrites every failed response into an [`ErrorResponse`] carrying the
/// request path. `stackTrace` is only filled in with `debug_stacktrace`.
#[derive(Clone, Copy, Default)]
pub struct ErrorTranslator {
    debug_stacktrace: bool,
}

impl ErrorTranslator {
    pub fn new(debug_stacktrace: bool) -> Self {
        Self { debug_stacktrace }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ErrorTranslator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = ErrorTranslatorMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorTranslatorMiddleware {
            service: Rc::new(service),
            debug_stacktrace: self.debug_stacktrace,
        }))
    }
}

pub struct ErrorTranslatorMiddleware<S> {
    service: Rc<S>,
    debug_stacktrace: bool,
}

impl<S, B> Service<ServiceRequest> for ErrorTranslatorMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let debug_stacktrace = self.debug_stacktrace;
        // No extra handle on the request here: the router needs it unshared.
        let path = req.path().to_string();

        Box::pin(async move {
            match service.call(req).await {
                Ok(res) => {
                    let translated = res
                        .response()
                        .error()
                        .map(|err| translate(err, &path, debug_stacktrace));
                    match translated {
                        Some(response) => {
                            let (request, _) = res.into_parts();
                            Ok(ServiceResponse::new(request, response).map_into_right_body())
                        }
                        None => Ok(res.map_into_left_body()),
                    }
                }
                Err(err) => {
                    let response = translate(&err, &path, debug_stacktrace);
                    Err(InternalError::from_response(err.to_string(), response).into())
                }
            }
        })
    }
}

fn translate(err: &actix_web::Error, path: &str, debug_stacktrace: bool) -> HttpResponse {
    let (status, category, message) = match err.as_error::<Error>() {
        Some(known) => (known.status_code(), known.category(), known.to_string()),
        None => {
            let status = err.as_response_error().status_code();
            if status.is_server_error() {
                let message = if debug_stacktrace {
                    err.to_string()
                } else {
                    UNEXPECTED.to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", message)
            } else {
                (StatusCode::BAD_REQUEST, "BadRequest", err.to_string())
            }
        }
    };

    if status.is_server_error() {
        tracing::error!(path, error = ?err, "{category}: {message}");
    } else {
        tracing::warn!(path, "{category}: {message}");
    }

    let body = ErrorResponse::new(status, category, message, path.to_string())
        .with_stack_trace(debug_stacktrace.then(|| format!("{err:?}")));

    HttpResponse::build(status).json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn taxonomy_errors_keep_their_status() {
        let err: actix_web::Error = Error::NotFound("Customer not found with id: 9".into()).into();
        let response = translate(&err, "/customers/9", false);
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let body = body_of(response).await;
        assert_eq!(404, body["status"]);
        assert_eq!("NotFound", body["error"]);
        assert_eq!("/customers/9", body["path"]);
        assert!(body.get("stackTrace").is_none());
    }

    #[actix_web::test]
    async fn unknown_server_errors_hide_details() {
        let err = actix_web::error::ErrorInternalServerError("pool exhausted at 10.0.0.3");
        let body = body_of(translate(&err, "/customers", false)).await;
        assert_eq!("InternalError", body["error"]);
        assert_eq!(UNEXPECTED, body["message"]);
    }

    #[actix_web::test]
    async fn debug_mode_adds_trace() {
        let err: actix_web::Error = Error::Database("connection refused".into()).into();
        let response = translate(&err, "/customers", true);
        assert_eq!(StatusCode::BAD_GATEWAY, response.status());

        let body = body_of(response).await;
        assert_eq!("DatabaseFailure", body["error"]);
        assert!(body["stackTrace"].as_str().unwrap().contains("Database"));
    }

    #[actix_web::test]
    async fn routed_requests_pass_through_translator() {
        use actix_web::{test, web, App};

        async fn echo(path: web::Path<(String,)>) -> Result<HttpResponse, Error> {
            match path.into_inner().0.as_str() {
                "missing" => Err(Error::NotFound("Customer not found with id: missing".into())),
                id => Ok(HttpResponse::Ok().body(id.to_string())),
            }
        }

        let app = test::init_service(
            App::new()
                .wrap(ErrorTranslator::new(false))
                .service(web::scope("/customers").route("/{id}", web::get().to(echo))),
        )
        .await;

        let request = test::TestRequest::get().uri("/customers/7").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(test::read_body(response).await, "7");

        let request = test::TestRequest::get().uri("/customers/missing").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!("NotFound", body["error"]);
        assert_eq!("/customers/missing", body["path"]);
    }
}
