//! Read-only access to game data archives
//!
//! `.pak` files are zip containers. Entry lookup ignores case and accepts
//! either path separator, matching how the game resolves paths.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{KeybinderError, Result};

/// Named text entries inside an archive
pub trait ArchiveReader {
    /// Text of the entry at `path`, or `None` if there is no such entry
    fn read_entry(&mut self, path: &str) -> Result<Option<String>>;

    /// Every entry path
    fn list_entries(&self) -> Vec<String>;
}

/// Lookup key for an entry path: lowercase, forward slashes, no leading slash
fn normalize_entry_path(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches('/')
        .to_lowercase()
}

fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&*text).to_string()
}

/// A zip-backed `.pak` archive opened from disk
pub struct PakArchive {
    path: PathBuf,
    zip: zip::ZipArchive<File>,
    /// normalized path → stored entry name
    index: BTreeMap<String, String>,
    names: Vec<String>,
}

impl PakArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| KeybinderError::io(path, e))?;
        let zip = zip::ZipArchive::new(file).map_err(|e| KeybinderError::archive(path, e))?;

        let mut names = Vec::with_capacity(zip.len());
        let mut index = BTreeMap::new();
        for name in zip.file_names() {
            if name.ends_with('/') {
                continue;
            }
            names.push(name.to_string());
            index
                .entry(normalize_entry_path(name))
                .or_insert_with(|| name.to_string());
        }
        // zip's name iterator is unordered; keep listing deterministic
        names.sort();

        tracing::debug!("Opened archive {} ({} entries)", path.display(), names.len());
        Ok(Self {
            path: path.to_path_buf(),
            zip,
            index,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveReader for PakArchive {
    fn read_entry(&mut self, path: &str) -> Result<Option<String>> {
        // Exact names win, so entries differing only in case stay distinct
        let stored = match self.names.binary_search_by(|name| name.as_str().cmp(path)) {
            Ok(i) => &self.names[i],
            Err(_) => match self.index.get(&normalize_entry_path(path)) {
                Some(stored) => stored,
                None => return Ok(None),
            },
        };

        let mut entry = self
            .zip
            .by_name(stored)
            .map_err(|e| KeybinderError::archive(&self.path, format!("{}: {}", stored, e)))?;
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| KeybinderError::archive(&self.path, format!("{}: {}", stored, e)))?;

        Ok(Some(decode_text(&bytes)))
    }

    fn list_entries(&self) -> Vec<String> {
        self.names.clone()
    }
}

/// An archive held in memory, keyed by entry path
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, String)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder pattern)
    pub fn with_entry(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.entries.push((path.into(), text.into()));
    }
}

impl ArchiveReader for MemoryArchive {
    fn read_entry(&mut self, path: &str) -> Result<Option<String>> {
        let wanted = normalize_entry_path(path);
        Ok(self
            .entries
            .iter()
            .find(|(p, _)| p == path)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(p, _)| normalize_entry_path(p) == wanted)
            })
            .map(|(_, text)| decode_text(text.as_bytes())))
    }

    fn list_entries(&self) -> Vec<String> {
        self.entries.iter().map(|(p, _)| p.clone()).collect()
    }
}
