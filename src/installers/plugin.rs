//! Plugin DLL install/uninstall/disable/enable
//!
//! The plugins directory is the only record of what is installed. Every
//! action looks the file name up from the mod's latest release, so a release
//! that renames its DLL leaves the old file behind untouched.

use std::fs;
use std::path::Path;

use super::common::{download_bytes, write_file, InstallError, DISABLED_SUFFIX};
use crate::catalog::ModEntry;
use crate::config::AppConfig;
use crate::game_finder::InstallationTarget;
use crate::github::latest_binary_asset;
use crate::logging::{log_error, log_install};
use crate::utils::Fetcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginAction {
    Install,
    Uninstall,
    Disable,
    Enable,
}

impl PluginAction {
    pub fn verb(&self) -> &'static str {
        match self {
            PluginAction::Install => "install",
            PluginAction::Uninstall => "uninstall",
            PluginAction::Disable => "disable",
            PluginAction::Enable => "enable",
        }
    }
}

/// What an action did on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Installed { file_name: String, bytes: usize },
    Uninstalled { file_name: String },
    Disabled { file_name: String },
    Enabled { file_name: String },
    /// The file the action applies to was not there
    NothingToDo { file_name: String },
}

impl Outcome {
    /// Status line for `mod_name`
    pub fn describe(&self, mod_name: &str) -> String {
        match self {
            Outcome::Installed { file_name, bytes } => {
                format!("{} installed ({}, {} bytes)", mod_name, file_name, bytes)
            }
            Outcome::Uninstalled { .. } => format!("{} uninstalled", mod_name),
            Outcome::Disabled { .. } => format!("{} disabled", mod_name),
            Outcome::Enabled { .. } => format!("{} enabled", mod_name),
            Outcome::NothingToDo { file_name } => {
                format!("{}: {} not present, nothing to do", mod_name, file_name)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Installed,
    Disabled,
    Absent,
}

/// A file found in the plugins directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFile {
    /// Name without the `.disabled` suffix
    pub file_name: String,
    pub disabled: bool,
}

/// Apply `action` for one mod.
///
/// `Install` refuses to run before BepInEx is bootstrapped and does no I/O in
/// that case. The other actions succeed with `NothingToDo` when their file is
/// missing.
pub fn apply(
    fetcher: &dyn Fetcher,
    config: &AppConfig,
    target: &InstallationTarget,
    entry: &ModEntry,
    action: PluginAction,
) -> Result<Outcome, InstallError> {
    if action == PluginAction::Install && !target.runtime_present() {
        return Err(InstallError::RuntimePrerequisiteMissing);
    }

    let not_found = || InstallError::AssetNotFound {
        repository: entry.repository_id.clone(),
    };
    let asset =
        latest_binary_asset(fetcher, config, &entry.repository_id).ok_or_else(not_found)?;
    let file_name = asset.file_name().ok_or_else(not_found)?.to_string();

    let plugins = target.plugins_dir();
    let dest = plugins.join(&file_name);
    let disabled = plugins.join(format!("{}{}", file_name, DISABLED_SUFFIX));

    let outcome = match action {
        PluginAction::Install => {
            let bytes = download_bytes(fetcher, &asset.url)?;
            write_file(&dest, &bytes)?;
            Outcome::Installed {
                file_name,
                bytes: bytes.len(),
            }
        }
        PluginAction::Uninstall => {
            if !dest.is_file() {
                return Ok(Outcome::NothingToDo { file_name });
            }
            fs::remove_file(&dest).map_err(|e| fs_error(&dest, e))?;
            Outcome::Uninstalled { file_name }
        }
        PluginAction::Disable => {
            if !dest.is_file() {
                return Ok(Outcome::NothingToDo { file_name });
            }
            fs::rename(&dest, &disabled).map_err(|e| fs_error(&dest, e))?;
            Outcome::Disabled { file_name }
        }
        PluginAction::Enable => {
            // an active copy (e.g. reinstalled since) takes precedence
            if !disabled.is_file() || dest.exists() {
                return Ok(Outcome::NothingToDo { file_name });
            }
            fs::rename(&disabled, &dest).map_err(|e| fs_error(&disabled, e))?;
            Outcome::Enabled { file_name }
        }
    };

    log_install(&outcome.describe(&entry.display_name));
    Ok(outcome)
}

fn fs_error(path: &Path, err: std::io::Error) -> InstallError {
    log_error(&format!("{}: {}", path.display(), err));
    InstallError::filesystem(path, err)
}

/// State of one plugin file, read from disk
pub fn plugin_state(target: &InstallationTarget, file_name: &str) -> PluginState {
    let plugins = target.plugins_dir();
    if plugins.join(file_name).is_file() {
        PluginState::Installed
    } else if plugins.join(format!("{}{}", file_name, DISABLED_SUFFIX)).is_file() {
        PluginState::Disabled
    } else {
        PluginState::Absent
    }
}

/// Every file in the plugins directory, sorted by name
pub fn list_plugins(target: &InstallationTarget) -> Vec<PluginFile> {
    let Ok(entries) = fs::read_dir(target.plugins_dir()) else {
        return Vec::new();
    };

    let mut files: Vec<PluginFile> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            match name.strip_suffix(DISABLED_SUFFIX) {
                Some(stem) => PluginFile {
                    file_name: stem.to_string(),
                    disabled: true,
                },
                None => PluginFile {
                    file_name: name,
                    disabled: false,
                },
            }
        })
        .collect();
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name).then(a.disabled.cmp(&b.disabled)));
    files
}
