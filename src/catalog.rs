//! Mod catalog: the fixed set of installable mods, grouped by author

use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::config::AppConfig;
use crate::logging::{log_info, log_warning};

// ============================================================================
// Catalog Types
// ============================================================================

/// One installable mod
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModEntry {
    #[serde(rename = "name")]
    pub display_name: String,
    /// GitHub `owner/name`
    #[serde(rename = "repo")]
    pub repository_id: String,
}

/// A named group of mods, shown together
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModGroup {
    #[serde(rename = "name")]
    pub group_name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub mods: Vec<ModEntry>,
}

/// The full catalog (catalog.toml)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    pub groups: Vec<ModGroup>,
}

const BUILTIN_GROUP: &str = "iiDk's Mods";
const BUILTIN_SUBTITLE: &str = "ii's silly stash";

const BUILTIN_MODS: &[(&str, &str)] = &[
    ("ii's Stupid Menu", "iiDk-the-actual/iis.Stupid.Menu"),
    ("Forever Cosmetx", "iiDk-the-actual/ForeverCosmetx"),
    ("Wear It Anyway", "iiDk-the-actual/WearItAnyway"),
    ("Modded Utilla", "iiDk-the-actual/Utilla-Public"),
    ("Gorilla Outfit Catalog", "iiDk-the-actual/GorillaOutfitCatalog"),
    ("Cosmetic Lookup", "iiDk-the-actual/CosmeticLookup"),
    ("Player Trakkar", "iiDk-the-actual/PlayerTrakkar"),
    ("Too Much Info", "iiDk-the-actual/TooMuchInfo"),
    ("Gorilla Source", "iiDk-the-actual/GorillaSource"),
    ("Bee Pro", "iiDk-the-actual/BeePro"),
    ("Just Fog", "iiDk-the-actual/JustFog"),
    ("GOOMPS", "iiDk-the-actual/GOOMPS"),
    ("Ragdoll Mod", "iiDk-the-actual/RagdollMod"),
    ("Who Did That?", "iiDk-the-actual/WhoDidThat"),
    ("Fortnite Emote Wheel", "iiDk-the-actual/FortniteEmoteWheel"),
    ("TTSGUI", "iiDk-the-actual/TTSGUI"),
    ("Dev Minecraft Mod", "iiDk-the-actual/DevMinecraftMod-2025"),
    ("Iron Monke", "iiDk-the-actual/IronMonke-2025"),
    ("Mono Sandbox", "iiDk-the-actual/MonoSandbox-2025"),
    ("ii Cam Mod", "iiDk-the-actual/iiCamMod"),
    ("Cone Holdable", "iiDk-the-actual/ConeHoldable"),
    ("NameTags", "iiDk-the-actual/NameTags"),
];

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The catalog compiled into the binary
    pub fn builtin() -> Self {
        Self {
            groups: vec![ModGroup {
                group_name: BUILTIN_GROUP.to_string(),
                subtitle: BUILTIN_SUBTITLE.to_string(),
                mods: BUILTIN_MODS
                    .iter()
                    .map(|(name, repo)| ModEntry {
                        display_name: name.to_string(),
                        repository_id: repo.to_string(),
                    })
                    .collect(),
            }],
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Box<dyn Error>> {
        let catalog: Catalog = toml::from_str(content)?;
        for entry in catalog.entries() {
            if entry.repository_id.split('/').filter(|s| !s.is_empty()).count() != 2 {
                return Err(format!(
                    "'{}' has invalid repository '{}' (expected owner/name)",
                    entry.display_name, entry.repository_id
                )
                .into());
            }
        }
        Ok(catalog)
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The configured override catalog, or the built-in one
    pub fn load(config: &AppConfig) -> Self {
        let Some(path) = &config.catalog_path else {
            return Self::builtin();
        };
        match Self::from_file(path) {
            Ok(catalog) => {
                log_info(&format!("Loaded mod catalog from {}", path.display()));
                catalog
            }
            Err(e) => {
                log_warning(&format!(
                    "Ignoring catalog {}: {} (using built-in catalog)",
                    path.display(),
                    e
                ));
                Self::builtin()
            }
        }
    }

    /// All mods in catalog order
    pub fn entries(&self) -> impl Iterator<Item = &ModEntry> {
        self.groups.iter().flat_map(|g| g.mods.iter())
    }

    /// Find a mod by display name (case-insensitive) or repository id
    pub fn find(&self, name: &str) -> Option<&ModEntry> {
        let name_lower = name.to_lowercase();
        self.entries()
            .find(|m| m.display_name.to_lowercase() == name_lower)
            .or_else(|| self.entries().find(|m| m.repository_id == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keeps_order() {
        let catalog = Catalog::builtin();
        let names: Vec<_> = catalog.entries().map(|m| m.display_name.as_str()).collect();
        assert_eq!(names.len(), BUILTIN_MODS.len());
        assert_eq!(names[0], "ii's Stupid Menu");
        assert_eq!(names[names.len() - 1], "NameTags");
    }

    #[test]
    fn find_by_name_or_repo() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.find("just fog").unwrap().repository_id,
            "iiDk-the-actual/JustFog"
        );
        assert_eq!(
            catalog.find("iiDk-the-actual/GOOMPS").unwrap().display_name,
            "GOOMPS"
        );
        assert!(catalog.find("Not A Mod").is_none());
    }

    #[test]
    fn parses_toml_catalog() {
        let content = r#"
[[groups]]
name = "Test Mods"
subtitle = "for testing"

[[groups.mods]]
name = "X"
repo = "org/x"

[[groups.mods]]
name = "Y"
repo = "org/y"

[[groups]]
name = "Empty"
"#;
        let catalog = Catalog::from_toml_str(content).unwrap();
        assert_eq!(catalog.groups.len(), 2);
        assert_eq!(catalog.groups[0].subtitle, "for testing");
        assert_eq!(catalog.find("X").unwrap().repository_id, "org/x");
        assert_eq!(catalog.entries().count(), 2);
    }

    #[test]
    fn rejects_bad_repository_id() {
        let content = r#"
[[groups]]
name = "Bad"

[[groups.mods]]
name = "X"
repo = "not-a-repo"
"#;
        assert!(Catalog::from_toml_str(content).is_err());
    }

    #[test]
    fn unreadable_override_falls_back_to_builtin() {
        let config = AppConfig {
            catalog_path: Some("/nonexistent/catalog.toml".into()),
            ..Default::default()
        };
        assert_eq!(Catalog::load(&config), Catalog::builtin());
    }
}
