use crate::errors::Error;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    HttpMessage,
};
use casbin::{CoreApi, DefaultModel, Enforcer, StringAdapter};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::io::ErrorKind;
use std::rc::Rc;
use std::sync::Arc;

const MODEL: &str = include_str!("../../access_control/model.conf");
const POLICY: &str = include_str!("../../access_control/policy.csv");

/// Subject of unauthenticated requests.
pub const ANONYMOUS: &str = "anonym";

/// Casbin subject for the current request: `anonym` or the caller's role.
#[derive(Debug, Clone)]
pub struct AccessSubject(pub String);

/// Route-level policy. Which roles may call which `(path, method)` is
/// defined by the compiled-in Casbin model and policy.
#[derive(Clone)]
pub struct AccessControl {
    enforcer: Arc<Enforcer>,
}

impl AccessControl {
    pub async fn try_new() -> Result<Self, std::io::Error> {
        let model = DefaultModel::from_str(MODEL)
            .await
            .map_err(|err| std::io::Error::new(ErrorKind::Other, format!("{err:?}")))?;
        let enforcer = Enforcer::new(model, StringAdapter::new(POLICY))
            .await
            .map_err(|err| std::io::Error::new(ErrorKind::Other, format!("{err:?}")))?;

        Ok(Self {
            enforcer: Arc::new(enforcer),
        })
    }

    pub fn is_allowed(&self, subject: &str, path: &str, method: &str) -> Result<bool, String> {
        self.enforcer
            .enforce((subject, path, method))
            .map_err(|err| format!("{err:?}"))
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessControl
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AccessControlMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessControlMiddleware {
            service: Rc::new(service),
            access: self.clone(),
        }))
    }
}

pub struct AccessControlMiddleware<S> {
    service: Rc<S>,
    access: AccessControl,
}

impl<S, B> Service<ServiceRequest> for AccessControlMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let access = self.access.clone();

        Box::pin(async move {
            let subject = req.extensions().get::<AccessSubject>().cloned();
            let Some(AccessSubject(subject)) = subject else {
                tracing::error!("request reached access control without a subject");
                return Err(Error::Internal("Authorization failed".to_string()).into());
            };

            let path = req.path().to_string();
            let method = req.method().as_str().to_string();

            match access.is_allowed(&subject, &path, &method) {
                Ok(true) => service.call(req).await,
                Ok(false) if subject == ANONYMOUS => {
                    tracing::warn!("anonymous caller denied {method} {path}");
                    Err(Error::Unauthorized("Authentication required".to_string()).into())
                }
                Ok(false) => {
                    tracing::warn!("{subject} denied {method} {path}");
                    Err(Error::Forbidden("Access denied".to_string()).into())
                }
                Err(err) => {
                    tracing::error!("Policy check failed for {method} {path}: {err}");
                    Err(Error::Internal("Authorization failed".to_string()).into())
                }
            }
        })
    }
}
