//! Steam library discovery (Linux/Proton installs)
//!
//! Supports native, Debian, Flatpak, and Snap Steam installations.

use std::fs;
use std::path::{Path, PathBuf};

use super::vdf::parse_library_folders;
use super::GAME_DIR_NAME;
use crate::logging::log_info;

/// All possible Steam installation paths to check, relative to home
const STEAM_PATHS: &[&str] = &[
    ".local/share/Steam",
    ".steam/debian-installation",
    ".steam/steam",
    ".var/app/com.valvesoftware.Steam/data/Steam",
    ".var/app/com.valvesoftware.Steam/.local/share/Steam",
    "snap/steam/common/.local/share/Steam",
];

/// Find all Steam installations under `home`, deduplicated through symlinks
pub fn find_steam_installations(home: &Path) -> Vec<PathBuf> {
    let mut installations: Vec<PathBuf> = Vec::new();

    for relative_path in STEAM_PATHS {
        let full_path = home.join(relative_path);

        if !full_path.join("steamapps").exists() {
            continue;
        }

        let canonical = full_path.canonicalize().unwrap_or(full_path.clone());
        if !installations
            .iter()
            .any(|i| i.canonicalize().unwrap_or(i.clone()) == canonical)
        {
            log_info(&format!("Found Steam installation: {}", full_path.display()));
            installations.push(full_path);
        }
    }

    installations
}

/// Get all library folders for a Steam installation (itself first)
pub fn get_library_folders(steam_path: &Path) -> Vec<PathBuf> {
    let mut folders = vec![steam_path.to_path_buf()];

    for vdf_path in [
        steam_path.join("steamapps/libraryfolders.vdf"),
        steam_path.join("config/libraryfolders.vdf"),
    ] {
        let Ok(content) = fs::read_to_string(&vdf_path) else {
            continue;
        };
        for path_str in parse_library_folders(&content) {
            let path = PathBuf::from(&path_str);
            if path.exists() && !folders.contains(&path) {
                folders.push(path);
            }
        }
    }

    folders
}

/// Candidate game directories across every Steam library under `home`
pub fn steam_game_candidates(home: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for steam in find_steam_installations(home) {
        for library in get_library_folders(&steam) {
            let candidate = library.join("steamapps/common").join(GAME_DIR_NAME);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_candidates_from_library_folders() {
        let home = tempfile::tempdir().unwrap();
        let steam = home.path().join(".local/share/Steam");
        let extra = home.path().join("mnt/SteamLibrary");
        fs::create_dir_all(steam.join("steamapps")).unwrap();
        fs::create_dir_all(&extra).unwrap();
        fs::write(
            steam.join("steamapps/libraryfolders.vdf"),
            format!(
                "\"libraryfolders\"\n{{\n\"0\"\n{{\n\"path\" \"{}\"\n}}\n\"1\"\n{{\n\"path\" \"{}\"\n}}\n}}\n",
                steam.display(),
                extra.display()
            ),
        )
        .unwrap();

        let candidates = steam_game_candidates(home.path());
        assert_eq!(
            candidates,
            vec![
                steam.join("steamapps/common").join(GAME_DIR_NAME),
                extra.join("steamapps/common").join(GAME_DIR_NAME),
            ]
        );
    }

    #[test]
    fn no_steam_no_candidates() {
        let home = tempfile::tempdir().unwrap();
        assert!(steam_game_candidates(home.path()).is_empty());
    }
}
