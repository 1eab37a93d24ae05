//! Mod scanning
//!
//! Walks the mods root and collects candidate keybinds from each installed
//! mod's data archive:
//! - every `<superaction>` in the mod's superaction document
//! - every `--- @binding <name>` annotation in the mod's scripts
//!
//! Mod layout:
//!
//! ```text
//! <mods root>/<mod dir>/mod.manifest        <info><modid>...</modid></info>
//! <mods root>/<mod dir>/Data/*.pak          first archive by name is used
//! ```
//!
//! Directories carrying the reserved prefix hold output generated by this
//! tool and are never scanned.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::archive::{ArchiveReader, PakArchive};
use crate::config::ScanConfig;
use crate::error::{KeybinderError, Result};
use crate::model::Keybind;
use crate::vanilla::SUPERACTIONS_ENTRY;
use crate::xml::Document;

fn binding_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"---\s*@binding\s+(\w+)").expect("valid binding pattern"))
}

/// Synthesized UI name for a keybind that does not declare one
pub fn default_ui_name(name: &str) -> String {
    format!("ui_keybind_{}", name)
}

/// Keybinds declared by `--- @binding <name>` annotations, in text order
pub fn script_bindings<'a>(text: &'a str, mod_id: &'a str) -> impl Iterator<Item = Keybind> + 'a {
    binding_pattern().captures_iter(text).map(move |caps| {
        let name = &caps[1];
        Keybind {
            name: name.to_string(),
            ui_group: Some(mod_id.to_string()),
            ui_name: Some(default_ui_name(name)),
            description: String::new(),
            map: Some(String::new()),
        }
    })
}

/// One keybind per `<superaction>` in a mod's superaction document
pub fn superaction_keybinds(text: &str, mod_id: &str) -> Result<Vec<Keybind>> {
    let doc = Document::parse(text)
        .map_err(|e| KeybinderError::xml(format!("{} in mod {}", SUPERACTIONS_ENTRY, mod_id), e))?;

    let mut keybinds = Vec::new();
    for el in doc.root.elements("superaction") {
        let Some(name) = el.attr("name").filter(|n| !n.trim().is_empty()) else {
            tracing::debug!("Mod {}: skipping superaction without a name", mod_id);
            continue;
        };
        keybinds.push(Keybind {
            name: name.to_string(),
            ui_group: Some(mod_id.to_string()),
            ui_name: el.attr("ui_name").map(str::to_string),
            description: el.attr("ui_tooltip").unwrap_or_default().to_string(),
            map: el
                .child("action")
                .and_then(|action| action.attr("map"))
                .map(str::to_string),
        });
    }
    Ok(keybinds)
}

/// Read `<info><modid>` from a manifest; `None` when absent or blank
pub fn read_mod_id(manifest: &Path) -> Result<Option<String>> {
    let text = std::fs::read_to_string(manifest).map_err(|e| KeybinderError::io(manifest, e))?;
    let doc = Document::parse(&text)
        .map_err(|e| KeybinderError::xml(manifest.display().to_string(), e))?;

    let mod_id = doc
        .root
        .child("info")
        .and_then(|info| info.child("modid"))
        .map(|modid| modid.text().trim().to_string())
        .filter(|id| !id.is_empty());
    Ok(mod_id)
}

/// Subdirectories of the mods root, sorted by name
///
/// A missing mods root means no mods are installed.
pub fn mod_directories(mods_root: &Path) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(mods_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Mods directory {} does not exist", mods_root.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(KeybinderError::io(mods_root, e)),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| KeybinderError::io(mods_root, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Directory names of every installed mod, generated output included
pub fn installed_mod_ids(mods_root: &Path) -> Result<BTreeSet<String>> {
    Ok(mod_directories(mods_root)?
        .iter()
        .filter_map(|dir| dir_name(dir))
        .collect())
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Collects candidate keybinds from installed mods
#[derive(Debug, Clone, Default)]
pub struct ModScanner {
    config: ScanConfig,
}

impl ModScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// True for directory names holding generated output
    pub fn is_reserved(&self, dir_name: &str) -> bool {
        dir_name
            .to_lowercase()
            .starts_with(&self.config.reserved_prefix.to_lowercase())
    }

    /// Scan every mod under `mods_root`, preserving discovery order
    pub fn scan(&self, mods_root: &Path) -> Result<Vec<Keybind>> {
        let mut keybinds = Vec::new();
        for mod_dir in mod_directories(mods_root)? {
            keybinds.extend(self.scan_mod(&mod_dir)?);
        }
        tracing::info!(
            "Found {} keybinds in mods under {}",
            keybinds.len(),
            mods_root.display()
        );
        Ok(keybinds)
    }

    /// Keybinds from one mod directory; empty when the mod is skipped
    pub fn scan_mod(&self, mod_dir: &Path) -> Result<Vec<Keybind>> {
        let name = dir_name(mod_dir).unwrap_or_default();
        if self.is_reserved(&name) {
            tracing::debug!("Skipping generated output directory {}", name);
            return Ok(Vec::new());
        }

        let manifest = mod_dir.join(&self.config.manifest_file);
        if !manifest.is_file() {
            tracing::debug!("Skipping {}: no {}", name, self.config.manifest_file);
            return Ok(Vec::new());
        }
        let Some(mod_id) = read_mod_id(&manifest)? else {
            tracing::warn!("Skipping {}: manifest has no modid", name);
            return Ok(Vec::new());
        };

        let Some(pak) = self.find_archive(mod_dir)? else {
            tracing::debug!("Skipping {}: no .{} archive", mod_id, self.config.archive_extension);
            return Ok(Vec::new());
        };

        // Archive handle is released when `archive` drops at the end of this scope
        let mut archive = PakArchive::open(&pak)?;
        let keybinds = self.scan_archive(&mut archive, &mod_id)?;
        tracing::debug!("Mod {}: {} keybinds from {}", mod_id, keybinds.len(), pak.display());
        Ok(keybinds)
    }

    /// Keybinds from an opened mod archive
    pub fn scan_archive(&self, archive: &mut dyn ArchiveReader, mod_id: &str) -> Result<Vec<Keybind>> {
        let mut keybinds = Vec::new();

        if let Some(text) = archive.read_entry(SUPERACTIONS_ENTRY)? {
            if !text.trim().is_empty() {
                keybinds.extend(superaction_keybinds(&text, mod_id)?);
            }
        }

        let script_suffix = format!(".{}", self.config.script_extension.to_lowercase());
        for entry in archive.list_entries() {
            if !entry.to_lowercase().ends_with(&script_suffix) {
                continue;
            }
            if let Some(text) = archive.read_entry(&entry)? {
                keybinds.extend(script_bindings(&text, mod_id));
            }
        }

        Ok(keybinds)
    }

    /// First archive (by file name) in the mod's data directory
    fn find_archive(&self, mod_dir: &Path) -> Result<Option<PathBuf>> {
        let data_dir = mod_dir.join(&self.config.data_dir);
        if !data_dir.is_dir() {
            return Ok(None);
        }

        let mut paks = Vec::new();
        for entry in std::fs::read_dir(&data_dir).map_err(|e| KeybinderError::io(&data_dir, e))? {
            let path = entry.map_err(|e| KeybinderError::io(&data_dir, e))?.path();
            if path.is_file() && has_extension(&path, &self.config.archive_extension) {
                paks.push(path);
            }
        }
        paks.sort();
        Ok(paks.into_iter().next())
    }
}
