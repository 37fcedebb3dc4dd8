//! Request guards for the API.

use std::future::{ready, Ready};

use actix_web::http::header;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};

use crate::auth::{AuthService, Claims};
use crate::error::StoreError;

/// Extractor proving the request carried a valid bearer token. Handlers
/// take it as an argument; requests without one fail with 401 before the
/// handler body runs.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub Claims);

impl FromRequest for AuthedUser {
    type Error = StoreError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<AuthedUser, StoreError> {
    let auth = req
        .app_data::<web::Data<AuthService>>()
        .ok_or_else(|| StoreError::Internal("auth service not configured".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(StoreError::Unauthorized)?;

    auth.verify(token).map(AuthedUser)
}
