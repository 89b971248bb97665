//! BepInEx and plugin installation logic

mod common;
mod plugin;
mod runtime;

pub use common::{
    check_cancelled, config_dir, download_bytes, plugins_dir, runtime_dir,
    runtime_layout_present, write_file, InstallError, DISABLED_SUFFIX, RUNTIME_CONFIG_FILE,
    RUNTIME_DIR,
};
pub use plugin::{
    apply, list_plugins, plugin_state, Outcome, PluginAction, PluginFile, PluginState,
};
pub use runtime::{extract_archive, install_runtime, uninstall_runtime};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// Shared Types
// ============================================================================

/// Context for long-running operations: status reporting and cancellation
#[derive(Clone)]
pub struct TaskContext {
    pub status_callback: Arc<dyn Fn(String) + Send + Sync>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl TaskContext {
    pub fn new(status: impl Fn(String) + Send + Sync + 'static, cancel: Arc<AtomicBool>) -> Self {
        Self {
            status_callback: Arc::new(status),
            cancel_flag: cancel,
        }
    }

    /// Context that drops status messages and is never cancelled
    pub fn silent() -> Self {
        Self::new(|_| {}, Arc::new(AtomicBool::new(false)))
    }

    pub fn set_status(&self, msg: String) {
        (self.status_callback)(msg);
    }

    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}
