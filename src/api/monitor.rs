//! Filesystem monitor endpoints.

use std::sync::Arc;

use crate::api::types::{LogEntry, MonitorStatus};
use crate::error::ApiResult;
use crate::transport::Transport;

/// Monitor state, start/stop and log access.
#[derive(Debug, Clone)]
pub struct MonitorApi {
    transport: Arc<Transport>,
}

impl MonitorApi {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn status(&self) -> ApiResult<MonitorStatus> {
        self.transport.get("/monitor/status").await
    }

    pub async fn start(&self) -> ApiResult<()> {
        self.transport.post_empty_ack("/monitor/start").await
    }

    pub async fn stop(&self) -> ApiResult<()> {
        self.transport.post_empty_ack("/monitor/stop").await
    }

    /// Most recent log lines, newest last.
    pub async fn logs(&self, limit: u32) -> ApiResult<Vec<LogEntry>> {
        self.transport
            .get_with_query("/monitor/logs", &[("limit", limit)])
            .await
    }

    pub async fn clear_logs(&self) -> ApiResult<()> {
        self.transport.post_empty_ack("/monitor/logs/clear").await
    }
}
