use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Fixed Endpoints
// ============================================================================

/// Pinned BepInEx release archive
pub const RUNTIME_URL: &str =
    "https://github.com/BepInEx/BepInEx/releases/download/v5.4.23.3/BepInEx_win_x64_5.4.23.3.zip";

/// Default `BepInEx.cfg` seeded after extraction
pub const DEFAULT_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/iiDk-the-actual/ModInfo/refs/heads/main/BepInEx.cfg";

pub const GITHUB_API_BASE: &str = "https://api.github.com";
pub const GITHUB_RAW_BASE: &str = "https://raw.githubusercontent.com";
pub const USER_AGENT: &str = concat!("TagMod-Rust/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Main App Config
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Last validated game directory
    pub game_path: Option<PathBuf>,
    pub api_base: String,
    pub raw_base: String,
    pub runtime_url: String,
    pub config_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Optional TOML file replacing the built-in mod catalog
    pub catalog_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game_path: None,
            api_base: GITHUB_API_BASE.to_string(),
            raw_base: GITHUB_RAW_BASE.to_string(),
            runtime_url: RUNTIME_URL.to_string(),
            config_url: DEFAULT_CONFIG_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: 60,
            catalog_path: None,
        }
    }
}

impl AppConfig {
    fn get_path() -> PathBuf {
        app_path!("config.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::get_path())
    }

    /// Load from an explicit file, falling back to defaults on any error
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(content) = fs::read_to_string(path) {
                if let Ok(config) = serde_json::from_str(&content) {
                    return config;
                }
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        self.save_to(&Self::get_path());
    }

    pub fn save_to(&self, path: &std::path::Path) {
        // Ensure parent dir exists
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, json);
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn latest_release_url(&self, repository_id: &str) -> String {
        format!("{}/repos/{}/releases/latest", self.api_base, repository_id)
    }

    pub fn repository_url(&self, repository_id: &str) -> String {
        format!("{}/repos/{}", self.api_base, repository_id)
    }

    pub fn readme_url(&self, repository_id: &str, branch: &str) -> String {
        format!("{}/{}/{}/README.md", self.raw_base, repository_id, branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load_keeps_game_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig {
            game_path: Some(PathBuf::from("/games/Gorilla Tag")),
            ..Default::default()
        };
        config.save_to(&path);

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.game_path, Some(PathBuf::from("/games/Gorilla Tag")));
    }

    #[test]
    fn partial_file_fills_remaining_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "api_base": "http://localhost:9000" }"#).unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.api_base, "http://localhost:9000");
        assert_eq!(config.runtime_url, RUNTIME_URL);
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }

    #[test]
    fn endpoint_urls() {
        let config = AppConfig::default();
        assert_eq!(
            config.latest_release_url("org/x"),
            "https://api.github.com/repos/org/x/releases/latest"
        );
        assert_eq!(
            config.readme_url("org/x", "master"),
            "https://raw.githubusercontent.com/org/x/master/README.md"
        );
    }
}
