use actix_web::{web, HttpResponse};

use crate::api::middleware::AuthedUser;
use crate::error::StoreError;
use crate::models::ProfileUpdate;
use crate::store::Store;

/// The caller's own profile, auto-created on first use.
pub async fn get(user: AuthedUser, store: web::Data<Store>) -> Result<HttpResponse, StoreError> {
    let profile = store
        .profiles()
        .ensure(user.0.sub, &user.0.email, None)
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn update(
    user: AuthedUser,
    store: web::Data<Store>,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, StoreError> {
    let profile = store
        .profiles()
        .update(user.0.sub, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
