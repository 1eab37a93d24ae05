//! Keybinder - merges mod keybindings into the game's input profile
//!
//! Reads the vanilla action-map and superaction documents from the baseline
//! archive, collects keybinds declared by installed mods, and writes merged
//! copies of both documents into a generated override mod.

pub mod archive;
pub mod cli;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod export;
pub mod merge;
pub mod model;
pub mod scanner;
pub mod service;
pub mod tracing;
pub mod vanilla;
pub mod xml;

// Re-export commonly used types
pub use config::KeybinderConfig;
pub use error::{KeybinderError, Result};
pub use model::{Action, ActionMap, Keybind};
pub use service::{KeybindService, RunPaths, RunSummary};
pub use vanilla::VanillaConfig;
