//! Session and account endpoints.
//!
//! The only module that writes to [`AuthContext`]: login stores the
//! returned token, logout clears it even when the server call fails.

use std::sync::Arc;

use tracing::info;

use crate::api::types::{LoginForm, LoginSession, UserProfile};
use crate::auth::AuthContext;
use crate::error::ApiResult;
use crate::transport::Transport;

/// Login, logout and profile access.
#[derive(Debug, Clone)]
pub struct UserApi {
    transport: Arc<Transport>,
    auth: Arc<AuthContext>,
}

impl UserApi {
    pub(crate) fn new(transport: Arc<Transport>, auth: Arc<AuthContext>) -> Self {
        Self { transport, auth }
    }

    /// Authenticate and store the session token for subsequent requests.
    pub async fn login(&self, form: &LoginForm) -> ApiResult<LoginSession> {
        let session: LoginSession = self.transport.post("/auth/login", form).await?;
        self.auth.set_token(session.token.clone()).await;
        info!(username = %session.username, "logged in");
        Ok(session)
    }

    /// End the session. The local token is dropped regardless of how
    /// the server call went.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self.transport.post_empty_ack("/auth/logout").await;
        self.auth.clear().await;
        result
    }

    /// Profile of the signed-in operator.
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.transport.get("/user/info").await
    }
}
