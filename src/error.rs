//! Error types shared by the loader, scanner and exporter

use std::path::PathBuf;

use crate::xml::XmlError;

/// Errors that abort a keybinder run
///
/// Missing resources (no manifest, no archive, no baseline entry) are not
/// errors; they are skipped where they are found. Everything here is fatal.
#[derive(Debug, Clone)]
pub enum KeybinderError {
    /// Reading or writing a file or directory failed
    Io { path: PathBuf, message: String },
    /// An archive could not be opened or an entry could not be read
    Archive { path: PathBuf, message: String },
    /// A markup document could not be parsed
    Xml { origin: String, error: XmlError },
    /// Configuration could not be read or resolved
    Config(String),
}

impl KeybinderError {
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        KeybinderError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn archive(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        KeybinderError::Archive {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn xml(origin: impl Into<String>, error: XmlError) -> Self {
        KeybinderError::Xml {
            origin: origin.into(),
            error,
        }
    }
}

impl std::fmt::Display for KeybinderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeybinderError::Io { path, message } => {
                write!(f, "IO error at {}: {}", path.display(), message)
            }
            KeybinderError::Archive { path, message } => {
                write!(f, "Archive error in {}: {}", path.display(), message)
            }
            KeybinderError::Xml { origin, error } => {
                write!(f, "Malformed document {}: {}", origin, error)
            }
            KeybinderError::Config(e) => write!(f, "Config error: {}", e),
        }
    }
}

impl std::error::Error for KeybinderError {}

pub type Result<T> = std::result::Result<T, KeybinderError>;
