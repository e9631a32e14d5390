//! System settings endpoints.

use std::sync::Arc;

use serde::Serialize;

use crate::api::types::{EmbyConnectionTest, SystemSettings};
use crate::error::ApiResult;
use crate::transport::Transport;

#[derive(Serialize)]
struct PasswordRequest<'a> {
    new_password: &'a str,
}

/// Read and update the mutable system configuration.
#[derive(Debug, Clone)]
pub struct SettingApi {
    transport: Arc<Transport>,
}

impl SettingApi {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self) -> ApiResult<SystemSettings> {
        self.transport.get("/settings").await
    }

    pub async fn update(&self, settings: &SystemSettings) -> ApiResult<()> {
        self.transport.post_ack("/settings", settings).await
    }

    /// Probe an Emby server with candidate credentials before saving.
    pub async fn test_emby(&self, params: &EmbyConnectionTest) -> ApiResult<()> {
        self.transport.post_ack("/settings/test-emby", params).await
    }

    pub async fn update_password(&self, new_password: &str) -> ApiResult<()> {
        self.transport
            .post_ack("/settings/password", &PasswordRequest { new_password })
            .await
    }
}
