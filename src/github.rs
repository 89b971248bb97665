//! GitHub API types and latest-release asset lookup

use serde::Deserialize;

use crate::config::AppConfig;
use crate::logging::{log_info, log_warning};
use crate::utils::Fetcher;

/// Extension a release asset must have to count as a plugin binary
pub const BINARY_EXTENSION: &str = ".dll";

/// GitHub release metadata
#[derive(Deserialize, Debug, Clone)]
pub struct GithubRelease {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

/// GitHub release asset
#[derive(Deserialize, Debug, Clone)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// GitHub repository metadata (only the fields we show)
#[derive(Deserialize, Debug, Clone)]
pub struct GithubRepo {
    pub description: Option<String>,
}

/// A resolved downloadable plugin binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub name: String,
    pub url: String,
}

impl AssetRef {
    /// File name used on disk: the last segment of the download URL.
    ///
    /// Both `/` and `\` count as separators. `None` when what is left can't
    /// be a plain file name inside the plugins directory.
    pub fn file_name(&self) -> Option<&str> {
        let is_separator = |c: char| c == '/' || c == '\\';
        let segment = self
            .url
            .rsplit(is_separator)
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(self.name.as_str());
        match segment.rsplit(is_separator).next()? {
            "" | "." | ".." => None,
            name if name.contains(':') => None,
            name => Some(name),
        }
    }
}

/// Pick the first asset whose name ends with the binary extension
pub fn select_binary_asset(release: &GithubRelease) -> Option<AssetRef> {
    release
        .assets
        .iter()
        .find(|a| a.name.ends_with(BINARY_EXTENSION))
        .map(|a| AssetRef {
            name: a.name.clone(),
            url: a.browser_download_url.clone(),
        })
}

/// Resolve the latest release's plugin binary for `repository_id`.
///
/// Network, status and parse failures all degrade to `None`; nothing is retried.
pub fn latest_binary_asset(
    fetcher: &dyn Fetcher,
    config: &AppConfig,
    repository_id: &str,
) -> Option<AssetRef> {
    let url = config.latest_release_url(repository_id);

    let response = match fetcher.get(&url) {
        Ok(r) => r,
        Err(e) => {
            log_warning(&format!("Release lookup for {} failed: {}", repository_id, e));
            return None;
        }
    };
    if !response.is_success() {
        log_warning(&format!(
            "Release lookup for {} returned HTTP {}",
            repository_id, response.status
        ));
        return None;
    }

    let release: GithubRelease = match serde_json::from_slice(&response.body) {
        Ok(r) => r,
        Err(e) => {
            log_warning(&format!("Unreadable release metadata for {}: {}", repository_id, e));
            return None;
        }
    };

    let asset = select_binary_asset(&release);
    match &asset {
        Some(a) => log_info(&format!(
            "{} {}: using asset {}",
            repository_id, release.tag_name, a.name
        )),
        None => log_warning(&format!(
            "{} {}: no {} asset in release",
            repository_id, release.tag_name, BINARY_EXTENSION
        )),
    }
    asset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MemoryFetcher;

    const RELEASE_URL: &str = "https://api.github.com/repos/org/x/releases/latest";

    #[test]
    fn picks_first_dll_asset() {
        let body = r#"{
            "tag_name": "v1.0.0",
            "assets": [
                { "name": "README.txt", "browser_download_url": "https://dl/README.txt" },
                { "name": "X.dll", "browser_download_url": "https://dl/v1/X.dll" },
                { "name": "Other.dll", "browser_download_url": "https://dl/v1/Other.dll" }
            ]
        }"#;
        let fetcher = MemoryFetcher::new().with(RELEASE_URL, body);

        let asset = latest_binary_asset(&fetcher, &AppConfig::default(), "org/x").unwrap();
        assert_eq!(asset.name, "X.dll");
        assert_eq!(asset.url, "https://dl/v1/X.dll");
        assert_eq!(asset.file_name(), Some("X.dll"));
    }

    #[test]
    fn empty_or_missing_assets_is_not_found() {
        let config = AppConfig::default();

        let fetcher = MemoryFetcher::new().with(RELEASE_URL, r#"{"tag_name":"v1","assets":[]}"#);
        assert_eq!(latest_binary_asset(&fetcher, &config, "org/x"), None);

        let fetcher = MemoryFetcher::new().with(RELEASE_URL, r#"{"message":"Not Found"}"#);
        assert_eq!(latest_binary_asset(&fetcher, &config, "org/x"), None);
    }

    #[test]
    fn failures_degrade_to_none() {
        let config = AppConfig::default();

        assert_eq!(latest_binary_asset(&MemoryFetcher::new(), &config, "org/x"), None);

        let fetcher = MemoryFetcher::new().with_status(RELEASE_URL, 403, "rate limited");
        assert_eq!(latest_binary_asset(&fetcher, &config, "org/x"), None);

        let fetcher = MemoryFetcher::new().with(RELEASE_URL, "<html>");
        assert_eq!(latest_binary_asset(&fetcher, &config, "org/x"), None);
    }

    #[test]
    fn file_name_comes_from_url() {
        let asset = AssetRef {
            name: "Display Name.dll".to_string(),
            url: "https://github.com/o/r/releases/download/v2/Real.Name.dll".to_string(),
        };
        assert_eq!(asset.file_name(), Some("Real.Name.dll"));
    }

    #[test]
    fn file_name_never_leaves_plugins_dir() {
        let asset = |url: &str| AssetRef {
            name: "X.dll".to_string(),
            url: url.to_string(),
        };
        assert_eq!(asset(r"https://dl/v1/..\..\Evil.dll").file_name(), Some("Evil.dll"));
        assert_eq!(asset("https://dl/v1/..").file_name(), None);
        assert_eq!(asset(r"https://dl/v1/.\").file_name(), Some("X.dll"));
        assert_eq!(asset("https://dl/v1/C:Evil.dll").file_name(), None);
    }
}
