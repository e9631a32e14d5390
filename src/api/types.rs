//! Payload types shared by the endpoint groups.

use serde::{Deserialize, Serialize};

/// Emby server reachability as the backend sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbyStatus {
    pub connected: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub server_name: Option<String>,
}

/// One Emby media library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbyLibrary {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Counters reported by the filesystem monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorStats {
    #[serde(default)]
    pub new_files: u64,
    #[serde(default)]
    pub processed_files: u64,
    #[serde(default)]
    pub error_count: u64,
}

/// Current state of the filesystem monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub running: bool,
    #[serde(default)]
    pub interval: Option<u64>,
    #[serde(default)]
    pub last_scan: Option<String>,
    #[serde(default)]
    pub stats: MonitorStats,
}

/// One monitor log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: i64,
    pub time: String,
    pub level: String,
    pub message: String,
}

/// Outcome of a symlink verification or rebuild pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub valid: u64,
    pub invalid: u64,
    pub missing: u64,
}

/// Mutable system settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub emby_url: String,
    pub emby_api_key: String,
    pub monitor_interval: u64,
    pub monitor_paths: Vec<String>,
    #[serde(default)]
    pub monitor_extensions: Vec<String>,
    #[serde(default)]
    pub monitor_exclude_paths: Vec<String>,
    #[serde(default)]
    pub monitor_auto_start: bool,
}

/// Connection parameters for probing an Emby server before saving them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbyConnectionTest {
    pub host: String,
    pub api_key: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Roles and permissions attached to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRoles {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginSession {
    pub token: String,
    pub username: String,
    #[serde(default, rename = "userInfo")]
    pub user_info: Option<UserRoles>,
}

/// Account details for the signed-in operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One entry of a snapshot or directory listing.
///
/// Snapshot entries carry size and mtime; directory-listing entries
/// only name, path, and the directory flag, so everything past the
/// path is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_directory: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

/// Codes handed out when the Google Drive device flow starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAuthStart {
    pub user_code: String,
    pub verification_url: String,
    pub device_code: String,
    pub expires_in: u64,
}

/// Polled device-flow state: `pending` until the operator approves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAuthStatus {
    pub status: String,
}

impl DeviceAuthStatus {
    /// Whether the backend has stored a usable token.
    pub fn is_authorized(&self) -> bool {
        self.status == "success"
    }
}

/// Aggregate numbers from the file database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    #[serde(default)]
    pub total_files: u64,
    #[serde(default)]
    pub total_size: u64,
}
