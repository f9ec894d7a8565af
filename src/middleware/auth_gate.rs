/// Bearer-token Authentication Gate
///
/// Validates the Authorization header on protected routes and injects the
/// verified `AuthContext` into request extensions for downstream handlers.
/// Responds 401 with a distinct code for each failure so clients can tell
/// "refresh and retry" (`ACCESS_TOKEN_EXPIRED`) from "re-login"
/// (`INVALID_ACCESS_TOKEN` / `MISSING_ACCESS_TOKEN`).

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{validate_access_token, AuthContext};
use crate::configuration::AuthSettings;
use crate::error::{AppError, AuthError};

pub struct AuthGate {
    auth_config: AuthSettings,
}

impl AuthGate {
    pub fn new(auth_config: AuthSettings) -> Self {
        Self { auth_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthGateService {
            service: Rc::new(service),
            auth_config: self.auth_config.clone(),
        }))
    }
}

pub struct AuthGateService<S> {
    service: Rc<S>,
    auth_config: AuthSettings,
}

fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn reject<B>(err: AppError) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>> {
    let response = err.error_response();
    Box::pin(async move {
        Err(actix_web::error::InternalError::from_response("Unauthorized", response).into())
    })
}

impl<S, B> Service<ServiceRequest> for AuthGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = match extract_bearer_token(&req) {
            Some(token) => token,
            None => {
                tracing::warn!("Missing or malformed Authorization header");
                return reject(AppError::Auth(AuthError::MissingAccessToken));
            }
        };

        let context = validate_access_token(&token, &self.auth_config)
            .and_then(|claims| AuthContext::from_claims(&claims));

        match context {
            Ok(context) => {
                tracing::debug!(
                    user_id = %context.user_id,
                    "Access token validated"
                );
                req.extensions_mut().insert(context);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(err) => reject(err),
        }
    }
}
