//! GrayLink client core - typed HTTP access to the GrayLink backend
//!
//! GrayLink watches a media library on disk, mirrors it through symbolic
//! links and keeps an Emby server in sync. This crate is the client-side
//! core that the administration console builds on: one transport, one
//! response contract, and explicit machinery for the operations that do
//! not finish within a single request.
//!
//! ## Components
//!
//! - **Envelope**: decodes the `{code, message, data}` wire wrapper into
//!   a typed `ApiResult<T>`
//! - **Transport**: issues requests over reqwest, injects the bearer
//!   token, and maps transport and business failures into one taxonomy
//! - **Operation tracking**: polls a status endpoint for long-running
//!   server work (library refresh, monitor scan, symlink rebuild) with
//!   monotonic progress and bounded retries
//! - **Poller**: reusable interval loop with non-overlapping ticks and
//!   idempotent restart
//! - **Loading**: reference-counted, debounced busy indicator shared by
//!   every request
//! - **Api**: typed endpoint groups (Emby, monitor, symlink, files,
//!   settings, auth)

pub mod api;
pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod loading;
pub mod operation;
pub mod poller;
pub mod transport;

pub use auth::AuthContext;
pub use client::GraylinkClient;
pub use envelope::Envelope;
pub use error::{ApiError, ApiResult};
pub use loading::{LoadingCoordinator, LoadingGuard};
pub use operation::{
    OperationRegistry, OperationState, OperationStatus, OperationTracker, TrackerConfig,
};
pub use poller::Poller;
pub use transport::{Transport, TransportConfig};
