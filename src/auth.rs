//! Session token storage.
//!
//! `AuthContext` holds the current bearer token. It is shared read-only
//! by every outgoing request and mutated only by login, logout, and the
//! transport's 401 handler. Token issuance lives on the server; this
//! side only stores and presents it.

use tokio::sync::RwLock;
use tracing::debug;

/// Shared holder for the current bearer token.
#[derive(Debug, Default)]
pub struct AuthContext {
    token: RwLock<Option<String>>,
}

impl AuthContext {
    /// Create an empty, unauthenticated context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context pre-loaded with a token (e.g. restored from storage).
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Store a new token, replacing any existing one.
    pub async fn set_token(&self, token: impl Into<String>) {
        let mut slot = self.token.write().await;
        *slot = Some(token.into());
        debug!("session token stored");
    }

    /// Drop the stored token. Subsequent requests omit the auth header.
    pub async fn clear(&self) {
        let mut slot = self.token.write().await;
        if slot.take().is_some() {
            debug!("session token cleared");
        }
    }

    /// Current token, if any.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// `Bearer <token>` header value, when a token is held.
    pub async fn bearer_header(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|t| format!("Bearer {t}"))
    }

    /// Whether a token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_lifecycle() {
        let auth = AuthContext::new();
        assert!(!auth.is_authenticated().await);
        assert_eq!(auth.bearer_header().await, None);

        auth.set_token("abc123").await;
        assert!(auth.is_authenticated().await);
        assert_eq!(auth.token().await.as_deref(), Some("abc123"));
        assert_eq!(
            auth.bearer_header().await.as_deref(),
            Some("Bearer abc123")
        );

        auth.clear().await;
        assert!(!auth.is_authenticated().await);
        assert_eq!(auth.token().await, None);
    }

    #[tokio::test]
    async fn test_preloaded_token() {
        let auth = AuthContext::with_token("restored");
        assert_eq!(auth.token().await.as_deref(), Some("restored"));
    }
}
