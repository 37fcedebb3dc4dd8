use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::api::middleware::AuthedUser;
use crate::auth::{AuthService, LoginRequest, RegisterRequest};
use crate::error::StoreError;

pub async fn login(
    auth: web::Data<AuthService>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, StoreError> {
    let response = auth.login(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn register(
    auth: web::Data<AuthService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, StoreError> {
    let user = auth.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Registration successful",
        "user": user,
    })))
}

/// Tokens are stateless; sign-out is the client discarding its credential.
pub async fn logout(_user: AuthedUser) -> Result<HttpResponse, StoreError> {
    Ok(HttpResponse::Ok().json(json!({ "message": "Signed out" })))
}

pub async fn me(
    user: AuthedUser,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, StoreError> {
    let current = auth.current_user(user.0.sub).await?;
    Ok(HttpResponse::Ok().json(current))
}

pub async fn refresh(
    user: AuthedUser,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, StoreError> {
    let response = auth.refresh(user.0.sub).await?;
    Ok(HttpResponse::Ok().json(response))
}
