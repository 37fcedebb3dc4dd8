//! HTTP transport for the typed client.
//!
//! Every call attaches the stored bearer credential when one exists. A 401
//! answer clears the stored credential before the error is surfaced, so
//! subsequent calls go out unauthenticated until a new sign-in succeeds.
//! No transport exception escapes raw; everything is normalized into
//! [`ApiError`].

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::credentials::CredentialStore;
use super::{ApiError, ApiResult};
use crate::error::{ErrorBody, ErrorKind};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    credentials: CredentialStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, credentials: CredentialStore) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self.send(Method::GET, path, query, None::<&()>).await?;
        Self::decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(Method::POST, path, &[], Some(body)).await?;
        Self::decode(response).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(Method::PATCH, path, &[], Some(body)).await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(Method::DELETE, path, &[], None::<&()>).await?;
        Ok(())
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "request");

        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::transport)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.credentials.clear();
            return Err(ApiError::new(
                ErrorKind::Unauthorized,
                "authentication required",
            ));
        }
        if !response.status().is_success() {
            return Err(Self::remote_error(response).await);
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        response.json::<T>().await.map_err(ApiError::transport)
    }

    async fn remote_error(response: reqwest::Response) -> ApiError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => ApiError::new(body.kind, body.error),
            Err(_) => ApiError::new(ErrorKind::Unknown, format!("HTTP {status}")),
        }
    }
}
