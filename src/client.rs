//! Top-level client handle.
//!
//! `GraylinkClient` owns the shared pieces - auth context, loading
//! coordinator, transport, operation registry - and hands out the
//! endpoint groups built on them. No ambient globals: everything the
//! transport needs is threaded through this one object, so tests can
//! build as many isolated clients as they like.

use std::sync::Arc;

use crate::api::{EmbyApi, FileApi, GdriveApi, MonitorApi, SettingApi, SymlinkApi, UserApi};
use crate::auth::AuthContext;
use crate::loading::LoadingCoordinator;
use crate::operation::{OperationRegistry, OperationStatus, OperationTracker, TrackerConfig};
use crate::transport::{Transport, TransportConfig};

/// Handle to one GrayLink backend.
#[derive(Clone)]
pub struct GraylinkClient {
    auth: Arc<AuthContext>,
    loading: LoadingCoordinator,
    transport: Arc<Transport>,
    operations: Arc<OperationRegistry>,
}

impl std::fmt::Debug for GraylinkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraylinkClient")
            .field("base_url", &self.transport.base_url())
            .field("operations", &self.operations.len())
            .finish()
    }
}

impl GraylinkClient {
    /// Build a client from transport configuration, with default
    /// loading debounce and operation grace period.
    pub fn new(config: TransportConfig) -> Self {
        let auth = Arc::new(AuthContext::new());
        let loading = LoadingCoordinator::default();
        let transport = Arc::new(Transport::new(config, Arc::clone(&auth), loading.clone()));
        Self {
            auth,
            loading,
            transport,
            operations: Arc::new(OperationRegistry::default()),
        }
    }

    /// Shorthand for a client against `base_url` with defaults.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(TransportConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn loading(&self) -> &LoadingCoordinator {
        &self.loading
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    pub fn operations(&self) -> &Arc<OperationRegistry> {
        &self.operations
    }

    pub fn emby(&self) -> EmbyApi {
        EmbyApi::new(Arc::clone(&self.transport))
    }

    pub fn monitor(&self) -> MonitorApi {
        MonitorApi::new(Arc::clone(&self.transport))
    }

    pub fn symlink(&self) -> SymlinkApi {
        SymlinkApi::new(Arc::clone(&self.transport))
    }

    pub fn gdrive(&self) -> GdriveApi {
        GdriveApi::new(Arc::clone(&self.transport))
    }

    pub fn files(&self) -> FileApi {
        FileApi::new(Arc::clone(&self.transport))
    }

    pub fn settings(&self) -> SettingApi {
        SettingApi::new(Arc::clone(&self.transport))
    }

    pub fn user(&self) -> UserApi {
        UserApi::new(Arc::clone(&self.transport), Arc::clone(&self.auth))
    }

    /// Track a long-running operation whose progress is served by a
    /// status endpoint returning `{state, progress}`.
    ///
    /// The tracker polls `path` through this client's transport, so the
    /// checks carry auth and count against the loading indicator like
    /// any other request.
    pub fn track_status_endpoint(
        &self,
        id: impl Into<String>,
        path: impl Into<String>,
        config: TrackerConfig,
    ) -> Arc<OperationTracker> {
        let transport = Arc::clone(&self.transport);
        let path = path.into();
        self.operations.begin(id, config, move || {
            let transport = Arc::clone(&transport);
            let path = path.clone();
            async move { transport.get::<OperationStatus>(&path).await }
        })
    }
}
