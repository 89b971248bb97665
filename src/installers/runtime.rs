//! BepInEx runtime bootstrap and removal

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::Path;

use super::common::{
    check_cancelled, config_dir, download_bytes, write_file, InstallError, RUNTIME_CONFIG_FILE,
};
use super::TaskContext;
use crate::config::AppConfig;
use crate::game_finder::InstallationTarget;
use crate::logging::{log_error, log_install};
use crate::utils::Fetcher;

/// Download BepInEx, unpack it into the game root and seed its config.
///
/// Extraction merges into existing content and overwrites collisions. The
/// config file is written last; if anything fails before that, files already
/// written stay on disk and `runtime_present()` keeps reporting `false`.
pub fn install_runtime(
    fetcher: &dyn Fetcher,
    config: &AppConfig,
    target: &InstallationTarget,
    ctx: &TaskContext,
) -> Result<(), InstallError> {
    let root = &target.root_path;
    log_install(&format!("Installing BepInEx into {}", root.display()));

    check_cancelled(ctx)?;

    // 1. Runtime archive
    ctx.set_status("Downloading BepInEx...".to_string());
    let archive = download_bytes(fetcher, &config.runtime_url)?;

    check_cancelled(ctx)?;

    ctx.set_status("Extracting BepInEx...".to_string());
    let written = extract_archive(&archive, root)?;
    log_install(&format!("Extracted {} files into {}", written, root.display()));

    // 2. Layout the archive doesn't ship
    for dir in [config_dir(root), target.plugins_dir()] {
        fs::create_dir_all(&dir).map_err(|e| InstallError::filesystem(&dir, e))?;
    }

    check_cancelled(ctx)?;

    // 3. Default configuration, replacing any existing one
    ctx.set_status("Downloading default config...".to_string());
    let cfg = download_bytes(fetcher, &config.config_url)?;
    let cfg_path = config_dir(root).join(RUNTIME_CONFIG_FILE);
    write_file(&cfg_path, &cfg)?;

    ctx.set_status("BepInEx installed successfully!".to_string());
    log_install("BepInEx installation complete");
    Ok(())
}

/// Remove the whole BepInEx directory, plugins included
pub fn uninstall_runtime(target: &InstallationTarget) -> Result<(), InstallError> {
    let runtime = target.runtime_dir();
    log_install(&format!("Removing {}", runtime.display()));

    fs::remove_dir_all(&runtime).map_err(|e| {
        log_error(&format!("Failed to remove {}: {}", runtime.display(), e));
        InstallError::filesystem(&runtime, e)
    })?;

    log_install("BepInEx and plugins removed");
    Ok(())
}

/// Extract a ZIP held in memory into `destination`, returning the number of files written.
///
/// Entries whose path would land outside `destination` are skipped.
pub fn extract_archive(bytes: &[u8], destination: &Path) -> Result<usize, InstallError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| InstallError::filesystem(destination, format!("invalid archive: {}", e)))?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| InstallError::filesystem(destination, e))?;

        let Some(relative) = entry.enclosed_name() else {
            log_error(&format!("Skipping unsafe archive entry: {}", entry.name()));
            continue;
        };
        let output_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)
                .map_err(|e| InstallError::filesystem(&output_path, e))?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallError::filesystem(parent, e))?;
        }
        let mut outfile =
            File::create(&output_path).map_err(|e| InstallError::filesystem(&output_path, e))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| InstallError::filesystem(&output_path, e))?;
        written += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = fs::set_permissions(&output_path, fs::Permissions::from_mode(mode));
            }
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installers::list_plugins;
    use crate::utils::MemoryFetcher;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn runtime_zip() -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.add_directory("BepInEx/", options).unwrap();
        writer.add_directory("BepInEx/core/", options).unwrap();
        writer.start_file("BepInEx/core/BepInEx.dll", options).unwrap();
        writer.write_all(b"core assembly").unwrap();
        writer.start_file("winhttp.dll", options).unwrap();
        writer.write_all(b"doorstop").unwrap();
        writer.start_file("doorstop_config.ini", options).unwrap();
        writer.write_all(b"[General]\nenabled=true\n").unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn runtime_fetcher(config: &AppConfig) -> MemoryFetcher {
        MemoryFetcher::new()
            .with(&config.runtime_url, runtime_zip())
            .with(&config.config_url, "[Logging.Console]\nEnabled = true\n")
    }

    #[test]
    fn bootstrap_creates_runtime_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let target = InstallationTarget::new(tmp.path());
        let fetcher = runtime_fetcher(&config);

        install_runtime(&fetcher, &config, &target, &TaskContext::silent()).unwrap();

        assert!(target.runtime_present());
        assert_eq!(
            fs::read(tmp.path().join("BepInEx/core/BepInEx.dll")).unwrap(),
            b"core assembly"
        );
        assert!(tmp.path().join("winhttp.dll").is_file());
        assert!(target.plugins_dir().is_dir());
        assert_eq!(
            fs::read_to_string(tmp.path().join("BepInEx/config/BepInEx.cfg")).unwrap(),
            "[Logging.Console]\nEnabled = true\n"
        );
        assert_eq!(fetcher.requests(), vec![config.runtime_url.clone(), config.config_url.clone()]);
    }

    #[test]
    fn bootstrap_merges_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let target = InstallationTarget::new(tmp.path());
        fs::write(tmp.path().join("Gorilla Tag.exe"), b"MZ").unwrap();
        fs::write(tmp.path().join("winhttp.dll"), b"old loader").unwrap();
        fs::create_dir_all(tmp.path().join("BepInEx/config")).unwrap();
        fs::write(tmp.path().join("BepInEx/config/BepInEx.cfg"), "user edits").unwrap();

        install_runtime(&runtime_fetcher(&config), &config, &target, &TaskContext::silent())
            .unwrap();

        assert_eq!(fs::read(tmp.path().join("Gorilla Tag.exe")).unwrap(), b"MZ");
        assert_eq!(fs::read(tmp.path().join("winhttp.dll")).unwrap(), b"doorstop");
        let cfg = fs::read_to_string(tmp.path().join("BepInEx/config/BepInEx.cfg")).unwrap();
        assert!(!cfg.contains("user edits"));
    }

    #[test]
    fn entries_outside_destination_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("game");
        fs::create_dir_all(&dest).unwrap();

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        writer.start_file("../escape.txt", options).unwrap();
        writer.write_all(b"outside").unwrap();
        writer.start_file("BepInEx/core/BepInEx.dll", options).unwrap();
        writer.write_all(b"core assembly").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let written = extract_archive(&bytes, &dest).unwrap();

        assert_eq!(written, 1);
        assert!(!tmp.path().join("escape.txt").exists());
        assert!(!dest.join("escape.txt").exists());
        assert_eq!(
            fs::read(dest.join("BepInEx/core/BepInEx.dll")).unwrap(),
            b"core assembly"
        );
    }

    #[test]
    fn config_failure_leaves_runtime_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let target = InstallationTarget::new(tmp.path());
        let fetcher = MemoryFetcher::new()
            .with(&config.runtime_url, runtime_zip())
            .with_status(&config.config_url, 500, "oops");

        let err = install_runtime(&fetcher, &config, &target, &TaskContext::silent()).unwrap_err();

        assert!(matches!(err, InstallError::NetworkFailure { .. }));
        assert!(tmp.path().join("BepInEx/core/BepInEx.dll").is_file());
        assert!(!target.runtime_present());
    }

    #[test]
    fn invalid_archive_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let target = InstallationTarget::new(tmp.path());
        let fetcher = MemoryFetcher::new()
            .with(&config.runtime_url, "<html>not a zip</html>")
            .with(&config.config_url, "cfg");

        let err = install_runtime(&fetcher, &config, &target, &TaskContext::silent()).unwrap_err();

        assert!(matches!(err, InstallError::FilesystemFailure { .. }));
        assert!(!target.runtime_dir().exists());
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn cancelled_bootstrap_does_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let target = InstallationTarget::new(tmp.path());
        let fetcher = runtime_fetcher(&config);
        let ctx = TaskContext::silent();
        ctx.cancel();

        let err = install_runtime(&fetcher, &config, &target, &ctx).unwrap_err();

        assert!(matches!(err, InstallError::Cancelled));
        assert!(fetcher.requests().is_empty());
    }

    #[test]
    fn bootstrap_reports_status() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let target = InstallationTarget::new(tmp.path());
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        let ctx = TaskContext::new(
            move |msg| sink.lock().unwrap().push(msg),
            Arc::new(std::sync::atomic::AtomicBool::new(false)),
        );

        install_runtime(&runtime_fetcher(&config), &config, &target, &ctx).unwrap();

        let messages = messages.lock().unwrap();
        assert_eq!(messages.first().unwrap(), "Downloading BepInEx...");
        assert_eq!(messages.last().unwrap(), "BepInEx installed successfully!");
    }

    #[test]
    fn unmod_removes_runtime_and_plugins() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let target = InstallationTarget::new(tmp.path());
        install_runtime(&runtime_fetcher(&config), &config, &target, &TaskContext::silent())
            .unwrap();
        for name in ["A.dll", "B.dll", "C.dll.disabled"] {
            fs::write(target.plugins_dir().join(name), b"plugin").unwrap();
        }
        assert_eq!(list_plugins(&target).len(), 3);

        uninstall_runtime(&target).unwrap();

        assert!(!target.runtime_dir().exists());
        assert!(!target.runtime_present());
        assert!(list_plugins(&target).is_empty());
        // files outside BepInEx are left for the user
        assert!(tmp.path().join("winhttp.dll").exists());
    }

    #[test]
    fn unmod_without_runtime_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::new(tmp.path());
        let err = uninstall_runtime(&target).unwrap_err();
        assert!(matches!(err, InstallError::FilesystemFailure { .. }));
    }
}
