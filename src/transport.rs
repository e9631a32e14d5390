//! HTTP transport.
//!
//! One reqwest client behind every endpoint group. The transport owns
//! the three cross-cutting concerns of a request: bearer-token
//! injection from [`AuthContext`], the loading counter (held as a guard
//! for the whole call, so it pairs exactly once on every exit path),
//! and mapping of transport and envelope failures into [`ApiError`].
//!
//! The transport performs no retries; polling callers layer their own
//! bounded retry on top (see [`crate::operation`]).

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::envelope::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::loading::LoadingCoordinator;

/// Transport construction parameters.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL the request paths are joined onto, e.g.
    /// `http://localhost:8000/api`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: concat!("graylink-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Typed HTTP transport over the GrayLink wire envelope.
pub struct Transport {
    client: Client,
    config: TransportConfig,
    auth: Arc<AuthContext>,
    loading: LoadingCoordinator,
}

impl Transport {
    /// Build a transport. The reqwest client is created once and reused
    /// for every request.
    pub fn new(config: TransportConfig, auth: Arc<AuthContext>, loading: LoadingCoordinator) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self {
            client,
            config,
            auth,
            loading,
        }
    }

    /// The auth context requests read their token from.
    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    /// The loading coordinator wrapped around every request.
    pub fn loading(&self) -> &LoadingCoordinator {
        &self.loading
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET expecting a typed payload.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        decode_body(&self.dispatch(self.client.get(self.url(path))).await?)
    }

    /// GET with query parameters, expecting a typed payload.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        decode_body(
            &self
                .dispatch(self.client.get(self.url(path)).query(query))
                .await?,
        )
    }

    /// POST a JSON body, expecting a typed payload.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        decode_body(
            &self
                .dispatch(self.client.post(self.url(path)).json(body))
                .await?,
        )
    }

    /// POST without a body, expecting a typed payload.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        decode_body(&self.dispatch(self.client.post(self.url(path))).await?)
    }

    /// PUT a JSON body, expecting a typed payload.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        decode_body(
            &self
                .dispatch(self.client.put(self.url(path)).json(body))
                .await?,
        )
    }

    /// DELETE expecting a typed payload.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        decode_body(&self.dispatch(self.client.delete(self.url(path))).await?)
    }

    /// POST a JSON body to an endpoint that acknowledges with null data.
    pub async fn post_ack<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        ack_body(
            &self
                .dispatch(self.client.post(self.url(path)).json(body))
                .await?,
        )
    }

    /// POST without a body to an endpoint that acknowledges with null data.
    pub async fn post_empty_ack(&self, path: &str) -> ApiResult<()> {
        ack_body(&self.dispatch(self.client.post(self.url(path))).await?)
    }

    /// Issue the request and map the response into the failure taxonomy.
    ///
    /// Returns the raw body only for 2xx responses; everything else
    /// becomes an error here so the decode step never sees it.
    async fn dispatch(&self, request: reqwest::RequestBuilder) -> ApiResult<Vec<u8>> {
        let _guard = self.loading.begin();

        let request = match self.auth.bearer_header().await {
            Some(value) => request.header(header::AUTHORIZATION, value),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!("request failed before a response arrived: {e}");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("received 401, invalidating session");
            self.auth.clear().await;
            return Err(ApiError::Auth);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            // Non-2xx bodies usually still carry an envelope; keep its
            // message and the numeric status.
            let message = serde_json::from_slice::<Envelope<serde_json::Value>>(&body)
                .map(|env| env.failure_message())
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            warn!(status = status.as_u16(), reason = %message, "request rejected");
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(body.to_vec())
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

fn decode_body<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    envelope.decode()
}

fn ack_body(body: &[u8]) -> ApiResult<()> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    envelope.ack()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let transport = Transport::new(
            TransportConfig {
                base_url: "http://localhost:8000/api/".to_string(),
                ..Default::default()
            },
            Arc::new(AuthContext::new()),
            LoadingCoordinator::default(),
        );
        assert_eq!(transport.url("/emby/status"), "http://localhost:8000/api/emby/status");
    }

    #[test]
    fn test_decode_body_rejects_non_envelope() {
        let err = decode_body::<serde_json::Value>(b"not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
