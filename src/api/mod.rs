//! Typed endpoint groups.
//!
//! Thin wrappers over [`Transport`](crate::transport::Transport): one
//! struct per backend area, one method per endpoint. All failure
//! handling and auth injection happens in the transport; these modules
//! only name paths and payload types.

pub mod emby;
pub mod file;
pub mod gdrive;
pub mod monitor;
pub mod setting;
pub mod symlink;
pub mod types;
pub mod user;

pub use emby::EmbyApi;
pub use file::FileApi;
pub use gdrive::GdriveApi;
pub use monitor::MonitorApi;
pub use setting::SettingApi;
pub use symlink::SymlinkApi;
pub use user::UserApi;
