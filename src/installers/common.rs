//! Common installer utilities shared between the runtime and plugin installers

use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{log_download, log_error};
use crate::utils::Fetcher;

use super::TaskContext;

/// Runtime directory created by the BepInEx archive, relative to the game root
pub const RUNTIME_DIR: &str = "BepInEx";
/// Runtime configuration file name inside `BepInEx/config`
pub const RUNTIME_CONFIG_FILE: &str = "BepInEx.cfg";
/// Suffix appended to a plugin file name when it is disabled
pub const DISABLED_SUFFIX: &str = ".disabled";

// ============================================================================
// Shared Installation Errors
// ============================================================================

/// Custom error type for installation operations
#[derive(Debug)]
pub enum InstallError {
    /// No valid game installation located
    PathNotFound,
    /// Plugin install attempted before the runtime was bootstrapped
    RuntimePrerequisiteMissing,
    /// No matching binary in the repository's latest release
    AssetNotFound { repository: String },
    /// Mod name is not in the catalog
    UnknownMod { name: String },
    /// Transport or HTTP-level failure
    NetworkFailure { url: String, reason: String },
    /// Permission/IO error during write, delete, rename or extract
    FilesystemFailure { path: String, reason: String },
    /// User cancelled the operation
    Cancelled,
}

impl std::fmt::Display for InstallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallError::PathNotFound => {
                write!(f, "Selected folder is not a Gorilla Tag installation")
            }
            InstallError::RuntimePrerequisiteMissing => write!(
                f,
                "BepInEx is required for modding. Install it before installing any mods!"
            ),
            InstallError::AssetNotFound { repository } => {
                write!(f, "No DLL found in the latest release of {}", repository)
            }
            InstallError::UnknownMod { name } => write!(f, "Unknown mod: {}", name),
            InstallError::NetworkFailure { url, reason } => {
                write!(f, "Download failed for {}: {}", url, reason)
            }
            InstallError::FilesystemFailure { path, reason } => {
                write!(f, "File operation failed on '{}': {}", path, reason)
            }
            InstallError::Cancelled => write!(f, "Operation cancelled by user"),
        }
    }
}

impl std::error::Error for InstallError {}

impl InstallError {
    pub fn filesystem(path: &Path, err: impl std::fmt::Display) -> Self {
        InstallError::FilesystemFailure {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    pub fn network(url: &str, err: impl std::fmt::Display) -> Self {
        InstallError::NetworkFailure {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Fail with `Cancelled` once the user asked to stop
pub fn check_cancelled(ctx: &TaskContext) -> Result<(), InstallError> {
    if ctx.is_cancelled() {
        return Err(InstallError::Cancelled);
    }
    Ok(())
}

// ============================================================================
// Runtime Layout
// ============================================================================

pub fn runtime_dir(root: &Path) -> PathBuf {
    root.join(RUNTIME_DIR)
}

pub fn plugins_dir(root: &Path) -> PathBuf {
    runtime_dir(root).join("plugins")
}

pub fn config_dir(root: &Path) -> PathBuf {
    runtime_dir(root).join("config")
}

/// Whether the runtime layout is complete under `root`.
///
/// The config file is written last during bootstrap, so a half-finished
/// bootstrap reports `false`.
pub fn runtime_layout_present(root: &Path) -> bool {
    runtime_dir(root).join("core").is_dir()
        && plugins_dir(root).is_dir()
        && config_dir(root).join(RUNTIME_CONFIG_FILE).is_file()
}

// ============================================================================
// Downloads
// ============================================================================

/// Download a URL fully into memory, treating any non-2xx status as a failure
pub fn download_bytes(fetcher: &dyn Fetcher, url: &str) -> Result<Vec<u8>, InstallError> {
    log_download(&format!("GET {}", url));

    let response = fetcher.get(url).map_err(|e| {
        log_error(&format!("Request to {} failed: {}", url, e));
        InstallError::network(url, e)
    })?;

    if !response.is_success() {
        log_error(&format!("{} returned HTTP {}", url, response.status));
        return Err(InstallError::network(url, format!("HTTP {}", response.status)));
    }

    log_download(&format!("Received {} bytes from {}", response.body.len(), url));
    Ok(response.body)
}

/// Truncate-and-write `bytes` to `path`, creating the parent directory
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), InstallError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| InstallError::filesystem(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| InstallError::filesystem(path, e))
}
