//! Google Drive device-authorization endpoints.
//!
//! The backend brokers the OAuth device flow: the console asks it for a
//! device code, shows the operator the verification URL and user code,
//! and polls until the backend reports the grant has completed.

use std::sync::Arc;

use serde::Serialize;

use crate::api::types::{DeviceAuthStart, DeviceAuthStatus};
use crate::error::ApiResult;
use crate::transport::Transport;

#[derive(Serialize)]
struct DeviceCodeRequest<'a> {
    device_code: &'a str,
}

/// Device-flow authorization for the configured Google Drive account.
#[derive(Debug, Clone)]
pub struct GdriveApi {
    transport: Arc<Transport>,
}

impl GdriveApi {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Begin the device flow. The caller shows `user_code` and
    /// `verification_url` to the operator and then polls
    /// [`check_auth`](Self::check_auth) with the returned `device_code`.
    pub async fn start_auth(&self) -> ApiResult<DeviceAuthStart> {
        self.transport.post_empty("/gdrive/start-auth").await
    }

    /// Check whether the operator has approved the device code yet.
    pub async fn check_auth(&self, device_code: &str) -> ApiResult<DeviceAuthStatus> {
        self.transport
            .post("/gdrive/check-auth", &DeviceCodeRequest { device_code })
            .await
    }
}
