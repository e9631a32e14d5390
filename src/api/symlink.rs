//! Symlink maintenance endpoints.

use std::sync::Arc;

use serde::Serialize;

use crate::api::types::VerifyResult;
use crate::error::ApiResult;
use crate::transport::Transport;

#[derive(Serialize)]
struct PathRequest<'a> {
    relative_path: &'a str,
}

/// Creation, removal and verification of library symlinks.
#[derive(Debug, Clone)]
pub struct SymlinkApi {
    transport: Arc<Transport>,
}

impl SymlinkApi {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Create the symlink for one library-relative path.
    pub async fn create(&self, relative_path: &str) -> ApiResult<()> {
        self.transport
            .post_ack("/symlink/create", &PathRequest { relative_path })
            .await
    }

    /// Remove the symlink for one library-relative path.
    pub async fn remove(&self, relative_path: &str) -> ApiResult<()> {
        self.transport
            .post_ack("/symlink/remove", &PathRequest { relative_path })
            .await
    }

    /// Walk the link tree and count valid/invalid/missing entries.
    pub async fn verify(&self) -> ApiResult<VerifyResult> {
        self.transport.get("/symlink/verify").await
    }

    /// Rebuild the whole link tree. A long-running operation; this call
    /// only kicks it off and reports the resulting counts.
    pub async fn rebuild(&self) -> ApiResult<VerifyResult> {
        self.transport.post_empty("/symlink/rebuild").await
    }

    /// Delete every managed symlink.
    pub async fn clear(&self) -> ApiResult<()> {
        self.transport.post_empty_ack("/symlink/clear").await
    }
}
