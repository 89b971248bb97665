//! Session state shared by every front-end operation
//!
//! Holds what the user picked (game directory, selected mods, developer
//! override directory) and runs operations against it. Nothing here is
//! global; a front end owns one `Session` and passes it around.

use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, ModEntry};
use crate::config::AppConfig;
use crate::game_finder::{self, find_installation, InstallationTarget};
use crate::installers::{
    self, check_cancelled, InstallError, Outcome, PluginAction, PluginFile, TaskContext,
};
use crate::logging::{log_action, log_error, log_info};
use crate::utils::Fetcher;

/// Result of one mod in a batch
#[derive(Debug)]
pub struct ModReport {
    pub mod_name: String,
    pub result: Result<Outcome, InstallError>,
}

impl ModReport {
    /// Human-readable status line
    pub fn status_line(&self) -> String {
        match &self.result {
            Ok(outcome) => outcome.describe(&self.mod_name),
            Err(InstallError::Cancelled) => format!("{}: skipped (cancelled)", self.mod_name),
            Err(e) => format!("Error with {}: {}", self.mod_name, e),
        }
    }
}

/// Snapshot of the on-disk state
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub target: Option<PathBuf>,
    pub runtime_present: bool,
    pub plugins: Vec<PluginFile>,
}

pub struct Session {
    pub config: AppConfig,
    pub catalog: Catalog,
    target: Option<PathBuf>,
    /// Developer override: used as-is, never validated
    dev_override: Option<PathBuf>,
    selected: Vec<String>,
}

impl Session {
    pub fn new(config: AppConfig, catalog: Catalog) -> Self {
        let target = config.game_path.clone();
        Self {
            config,
            catalog,
            target,
            dev_override: None,
            selected: Vec::new(),
        }
    }

    pub fn with_dev_override(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        log_info(&format!("Developer override directory: {}", path.display()));
        self.target = Some(path.clone());
        self.dev_override = Some(path);
        self
    }

    pub fn target_path(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    pub fn is_dev(&self) -> bool {
        self.dev_override.is_some()
    }

    // ========================================================================
    // Path selection
    // ========================================================================

    /// Accept `path` if it holds the game somewhere at or below it.
    ///
    /// On success the stored target becomes the directory containing the
    /// executable, not `path` itself. On failure the stored target is kept.
    pub fn validate(&mut self, path: &Path) -> bool {
        match find_installation(path) {
            Some(found) => {
                log_info(&format!("Using path: {}", found.display()));
                self.target = Some(found);
                true
            }
            None => {
                log_error(&format!(
                    "{} is not a Gorilla Tag installation",
                    path.display()
                ));
                false
            }
        }
    }

    /// Choose a directory: validated normally, taken verbatim in developer mode
    pub fn select_path(&mut self, path: &Path) -> bool {
        if self.is_dev() {
            self.target = Some(path.to_path_buf());
            return true;
        }
        self.validate(path)
    }

    /// Detect the game from well-known roots (or use the developer override)
    pub fn detect(&mut self) -> Option<PathBuf> {
        let found = match &self.dev_override {
            Some(path) => Some(path.clone()),
            None => game_finder::detect(),
        };
        if let Some(path) = &found {
            self.target = Some(path.clone());
        }
        found
    }

    /// Remember the current target as the default for next time
    pub fn remember_target(&mut self) {
        if self.is_dev() {
            return;
        }
        if self.config.game_path != self.target {
            self.config.game_path = self.target.clone();
            self.config.save();
        }
    }

    pub fn target(&self) -> Result<InstallationTarget, InstallError> {
        self.target
            .as_ref()
            .map(InstallationTarget::new)
            .ok_or(InstallError::PathNotFound)
    }

    /// Target checked against the marker executable (skipped in developer mode)
    fn validated_target(&mut self) -> Result<InstallationTarget, InstallError> {
        if self.is_dev() {
            return self.target();
        }
        let current = self.target.clone().ok_or(InstallError::PathNotFound)?;
        if !self.validate(&current) {
            return Err(InstallError::PathNotFound);
        }
        self.target()
    }

    // ========================================================================
    // Mod selection
    // ========================================================================

    /// Replace the selection; every name must be in the catalog
    pub fn select<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), InstallError> {
        let mut selected = Vec::new();
        for name in names {
            let entry = self.catalog.find(name.as_ref()).ok_or_else(|| {
                InstallError::UnknownMod {
                    name: name.as_ref().to_string(),
                }
            })?;
            selected.push(entry.display_name.clone());
        }
        self.selected = selected;
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.selected = self
            .catalog
            .entries()
            .map(|m| m.display_name.clone())
            .collect();
    }

    /// Selected mods in catalog order
    pub fn selected_entries(&self) -> Vec<ModEntry> {
        self.catalog
            .entries()
            .filter(|m| self.selected.contains(&m.display_name))
            .cloned()
            .collect()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Install BepInEx into the target
    pub fn bootstrap(&mut self, fetcher: &dyn Fetcher, ctx: &TaskContext) -> Result<(), InstallError> {
        log_action("Install BepInEx");
        let target = self.validated_target()?;
        installers::install_runtime(fetcher, &self.config, &target, ctx)
    }

    /// Remove BepInEx and every plugin. Confirmation is the caller's job.
    pub fn unmod(&self) -> Result<(), InstallError> {
        log_action("Unmod game");
        installers::uninstall_runtime(&self.target()?)
    }

    /// Apply `action` to every selected mod, one at a time, in catalog order.
    ///
    /// A failing mod doesn't stop the batch and nothing is rolled back. Once
    /// cancelled, the remaining mods report `Cancelled`. Installing without
    /// BepInEx fails up front.
    pub fn run_batch(
        &self,
        fetcher: &dyn Fetcher,
        action: PluginAction,
        ctx: &TaskContext,
    ) -> Result<Vec<ModReport>, InstallError> {
        log_action(&format!("{} selected mods", action.verb()));
        let target = self.target()?;

        if action == PluginAction::Install && !target.runtime_present() {
            return Err(InstallError::RuntimePrerequisiteMissing);
        }

        let mut reports = Vec::new();
        for entry in self.selected_entries() {
            let result = check_cancelled(ctx).and_then(|_| {
                ctx.set_status(format!("Trying to {} {}...", action.verb(), entry.display_name));
                installers::apply(fetcher, &self.config, &target, &entry, action)
            });

            let report = ModReport {
                mod_name: entry.display_name.clone(),
                result,
            };
            match &report.result {
                Ok(_) => ctx.set_status(report.status_line()),
                Err(e) => {
                    log_error(&format!("Error {} {}: {}", action.verb(), entry.display_name, e));
                    ctx.set_status(report.status_line());
                }
            }
            reports.push(report);
        }
        Ok(reports)
    }

    pub fn status(&self) -> SessionStatus {
        match self.target() {
            Ok(target) => SessionStatus {
                target: Some(target.root_path.clone()),
                runtime_present: target.runtime_present(),
                plugins: installers::list_plugins(&target),
            },
            Err(_) => SessionStatus {
                target: None,
                runtime_present: false,
                plugins: Vec::new(),
            },
        }
    }
}
