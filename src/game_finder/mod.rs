//! Game installation detection
//!
//! Locates a Gorilla Tag installation by looking for the game executable:
//! - under a user-supplied base directory (recursive walk)
//! - under a short, fixed list of well-known install roots
//!
//! Detection never searches the whole filesystem. A miss is not an error;
//! callers fall back to asking the user for a folder.

mod steam;
mod vdf;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::installers::{plugins_dir, runtime_dir, runtime_layout_present};
use crate::logging::{log_info, log_warning};

pub use steam::{find_steam_installations, get_library_folders, steam_game_candidates};
pub use vdf::parse_library_folders;

/// The game's main executable; its directory is the installation root
pub const MARKER_EXE: &str = "Gorilla Tag.exe";
/// Folder name of the game under `steamapps/common`
pub const GAME_DIR_NAME: &str = "Gorilla Tag";

// ============================================================================
// Core Types
// ============================================================================

/// A game directory mods are installed into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationTarget {
    pub root_path: PathBuf,
}

impl InstallationTarget {
    /// Wrap a directory without validating it (developer override)
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    /// Resolve `base` to the directory holding the marker executable
    pub fn resolve(base: &Path) -> Option<Self> {
        find_installation(base).map(Self::new)
    }

    /// Whether BepInEx is bootstrapped here. Always read from disk.
    pub fn runtime_present(&self) -> bool {
        runtime_layout_present(&self.root_path)
    }

    pub fn runtime_dir(&self) -> PathBuf {
        runtime_dir(&self.root_path)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        plugins_dir(&self.root_path)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Walk `base` top-down and return the first directory containing the marker executable.
///
/// Directories are visited in pre-order with entries sorted by name, so a
/// marker directly in `base` wins over one in a subdirectory. Symlinks are not
/// followed. A missing or non-directory `base` yields `None`.
pub fn find_installation(base: &Path) -> Option<PathBuf> {
    if !base.is_dir() {
        return None;
    }

    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .find(|dir| dir.join(MARKER_EXE).is_file())
}

/// Well-known install roots in priority order
pub fn candidate_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if cfg!(windows) {
        if let Ok(pf86) = std::env::var("ProgramFiles(x86)") {
            roots.push(
                PathBuf::from(pf86)
                    .join("Steam")
                    .join("steamapps")
                    .join("common")
                    .join(GAME_DIR_NAME),
            );
        }
        roots.push(PathBuf::from(r"D:\SteamLibrary\steamapps\common").join(GAME_DIR_NAME));
        if let Ok(pf) = std::env::var("ProgramFiles") {
            roots.push(
                PathBuf::from(pf)
                    .join("Oculus")
                    .join("Software")
                    .join("Software")
                    .join("another-axiom-gorilla-tag"),
            );
        }
    } else if let Some(home) = dirs::home_dir() {
        roots.extend(steam_game_candidates(&home));
    }

    roots
}

/// Return the first candidate that resolves to an installation
pub fn detect_in(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| find_installation(candidate))
}

/// Detect the game installation from the well-known roots
pub fn detect() -> Option<PathBuf> {
    match detect_in(&candidate_roots()) {
        Some(path) => {
            log_info(&format!("Gorilla Tag detected at: {}", path.display()));
            Some(path)
        }
        None => {
            log_warning("Gorilla Tag installation not detected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn place_marker(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(MARKER_EXE), b"MZ").unwrap();
    }

    #[test]
    fn finds_marker_at_depth_zero_one_and_three() {
        for depth in [0usize, 1, 3] {
            let tmp = tempfile::tempdir().unwrap();
            let mut game_dir = tmp.path().to_path_buf();
            for level in 0..depth {
                game_dir.push(format!("level{}", level));
            }
            place_marker(&game_dir);
            fs::create_dir_all(tmp.path().join("aaa-unrelated")).unwrap();

            assert_eq!(find_installation(tmp.path()), Some(game_dir), "depth {}", depth);
        }
    }

    #[test]
    fn missing_marker_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("a/b/c")).unwrap();
        fs::write(tmp.path().join("a/b/c/Other.exe"), b"MZ").unwrap();
        assert_eq!(find_installation(tmp.path()), None);
    }

    #[test]
    fn missing_or_file_base_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(find_installation(&tmp.path().join("nope")), None);

        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert_eq!(find_installation(&file), None);
    }

    #[test]
    fn marker_directory_is_not_a_match() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(MARKER_EXE)).unwrap();
        assert_eq!(find_installation(tmp.path()), None);
    }

    #[test]
    fn shallow_marker_wins() {
        let tmp = tempfile::tempdir().unwrap();
        place_marker(&tmp.path().join("A").join("deep"));
        place_marker(tmp.path());
        assert_eq!(find_installation(tmp.path()), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn detect_uses_first_resolving_candidate() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        let third = tmp.path().join("third");
        fs::create_dir_all(&first).unwrap();
        place_marker(&second.join("Gorilla Tag"));
        place_marker(&third);

        assert_eq!(
            detect_in(&[first, second.clone(), third]),
            Some(second.join("Gorilla Tag"))
        );
        assert_eq!(detect_in(&[]), None);
    }

    #[test]
    fn runtime_presence_is_read_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let target = InstallationTarget::new(tmp.path());
        assert!(!target.runtime_present());

        fs::create_dir_all(target.runtime_dir().join("core")).unwrap();
        fs::create_dir_all(target.plugins_dir()).unwrap();
        fs::create_dir_all(target.runtime_dir().join("config")).unwrap();
        fs::write(target.runtime_dir().join("config/BepInEx.cfg"), "").unwrap();
        assert!(target.runtime_present());

        fs::remove_dir_all(target.runtime_dir()).unwrap();
        assert!(!target.runtime_present());
    }
}
