// src/config/mod.rs

//! Optional settings file for tm2bd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load the settings file from disk, falling back to defaults (`loader.rs`).

pub mod loader;
pub mod model;

pub use loader::{DEFAULT_SETTINGS_FILE, load_settings};
pub use model::{Settings, SyncSection, TrackerSection};
