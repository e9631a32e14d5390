//! File database endpoints.

use std::sync::Arc;

use serde::Serialize;

use crate::api::types::{DatabaseStats, FileRecord};
use crate::error::ApiResult;
use crate::transport::Transport;

#[derive(Serialize)]
struct PathsRequest<'a> {
    paths: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
}

/// Snapshot listing and bulk file operations.
#[derive(Debug, Clone)]
pub struct FileApi {
    transport: Arc<Transport>,
}

impl FileApi {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Snapshot of the indexed tree, optionally below `path`.
    pub async fn snapshot(&self, path: Option<&str>) -> ApiResult<Vec<FileRecord>> {
        match path {
            Some(p) => {
                self.transport
                    .get_with_query("/files/snapshot", &[("path", p)])
                    .await
            }
            None => self.transport.get("/files/snapshot").await,
        }
    }

    /// Entries directly under `path` on disk, bypassing the snapshot.
    pub async fn list_directory(&self, path: &str) -> ApiResult<Vec<FileRecord>> {
        self.transport
            .get_with_query("/file/list", &[("path", path)])
            .await
    }

    pub async fn stats(&self) -> ApiResult<DatabaseStats> {
        self.transport.get("/files/stats").await
    }

    /// Drop database records whose files no longer exist on disk.
    pub async fn cleanup(&self) -> ApiResult<()> {
        self.transport.post_empty_ack("/files/cleanup").await
    }

    pub async fn delete(&self, paths: &[String]) -> ApiResult<()> {
        self.transport
            .post_ack("/files/delete", &PathsRequest { paths, target: None })
            .await
    }

    pub async fn move_to(&self, paths: &[String], target: &str) -> ApiResult<()> {
        self.transport
            .post_ack(
                "/files/move",
                &PathsRequest {
                    paths,
                    target: Some(target),
                },
            )
            .await
    }

    pub async fn copy_to(&self, paths: &[String], target: &str) -> ApiResult<()> {
        self.transport
            .post_ack(
                "/files/copy",
                &PathsRequest {
                    paths,
                    target: Some(target),
                },
            )
            .await
    }
}
