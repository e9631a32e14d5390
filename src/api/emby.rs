//! Emby server endpoints.

use std::sync::Arc;

use serde::Serialize;

use crate::api::types::{EmbyLibrary, EmbyStatus};
use crate::error::ApiResult;
use crate::transport::Transport;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    paths: &'a [String],
}

/// Emby status, library listing and refresh triggers.
#[derive(Debug, Clone)]
pub struct EmbyApi {
    transport: Arc<Transport>,
}

impl EmbyApi {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Server reachability and version.
    pub async fn status(&self) -> ApiResult<EmbyStatus> {
        self.transport.get("/emby/status").await
    }

    /// All media libraries known to the server.
    pub async fn libraries(&self) -> ApiResult<Vec<EmbyLibrary>> {
        self.transport.get("/emby/libraries").await
    }

    /// Trigger a refresh of the libraries containing `paths`.
    ///
    /// Returns as soon as the refresh is queued; track completion via
    /// [`crate::operation`] when the backend exposes a status endpoint.
    pub async fn refresh_paths(&self, paths: &[String]) -> ApiResult<()> {
        self.transport
            .post_ack("/emby/refresh", &RefreshRequest { paths })
            .await
    }

    /// Trigger a refresh of the whole library tree.
    pub async fn refresh_root(&self) -> ApiResult<()> {
        self.transport.post_empty_ack("/emby/refresh/root").await
    }

    /// Probe the configured Emby connection.
    pub async fn test_connection(&self) -> ApiResult<()> {
        self.transport.post_empty_ack("/emby/test").await
    }
}
