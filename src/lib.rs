//! TagMod - Gorilla Tag Mod Installer
//!
//! Library crate for path detection, BepInEx bootstrap and plugin management,
//! shared by the CLI and any other front end.

#[macro_use]
pub mod paths;

pub mod catalog;
pub mod config;
pub mod docs;
pub mod game_finder;
pub mod github;
pub mod installers;
pub mod logging;
pub mod session;
pub mod utils;
