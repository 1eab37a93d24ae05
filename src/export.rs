//! Writing merged keybinds into the profile documents
//!
//! Both phases only ever append, and only when the element is missing, so
//! exporting the same keybinds twice changes nothing the second time.

use std::path::{Path, PathBuf};

use crate::config::DefaultsConfig;
use crate::error::{KeybinderError, Result};
use crate::model::{Keybind, PURE_INCLUDE};
use crate::scanner::default_ui_name;
use crate::xml::{Document, Element};

/// Superaction document file name in the output directory
pub const SUPERACTIONS_FILE: &str = "keybindSuperactions.xml";
/// Action-map document file name in the output directory
pub const DEFAULT_PROFILE_FILE: &str = "defaultProfile.xml";

/// Keybind names ending in this get hold (press-and-hold) trigger attributes
pub const HOLD_SUFFIX: &str = "_ctrl";

/// Placed in every action map the exporter creates
const INCLUDE_COMMENT: &str = "only for include";

/// Paths of the two written documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    pub superactions: PathBuf,
    pub profile: PathBuf,
}

fn ui_group_label(group: &str) -> String {
    format!("ui_keybinds_group_{}", group)
}

/// Append missing `<ui_group>` and `<superaction>` elements
pub fn add_superactions(doc: &mut Document, keybinds: &[Keybind], defaults: &DefaultsConfig) {
    let mut groups: Vec<&str> = Vec::new();
    for kb in keybinds {
        let group = kb.ui_group_or(&defaults.ui_group);
        if !groups.contains(&group) {
            groups.push(group);
        }
    }

    for group in groups {
        if doc.root.has_named("ui_group", group) {
            continue;
        }
        doc.root.push(
            Element::new("ui_group")
                .with_attr("name", group)
                .with_attr("ui_label", ui_group_label(group)),
        );
    }

    for kb in keybinds {
        if doc.root.has_named("superaction", &kb.name) {
            continue;
        }
        let ui_name = kb
            .ui_name
            .clone()
            .unwrap_or_else(|| default_ui_name(&kb.name));

        doc.root.push(
            Element::new("superaction")
                .with_attr("name", kb.name.as_str())
                .with_attr("ui_group", kb.ui_group_or(&defaults.ui_group))
                .with_attr("ui_name", ui_name)
                .with_attr("keyboard", "writeable")
                .with_child(
                    Element::new("action")
                        .with_attr("name", kb.name.as_str())
                        .with_attr("map", kb.map_or(&defaults.export_map)),
                )
                .with_child(
                    Element::new("control")
                        .with_attr("input", "")
                        .with_attr("controller", "keyboard"),
                ),
        );
    }
}

/// Build the `<action>` element the action-map document gets for `name`
pub fn profile_action(name: &str) -> Element {
    let mut action = Element::new("action")
        .with_attr("name", name)
        .with_attr("consoleCmd", "1")
        .with_attr("onRelease", "1")
        .with_attr("keyboard", "_keybinds_ref_");

    if name.ends_with(HOLD_SUFFIX) {
        action.set_attr("holdTriggerDelay", "0.5");
        action.set_attr("onHold", "1");
        action.set_attr("holdRepeatDelay", "-1");
        action.set_attr("retriggerable", "0");
        action.set_attr("xboxpad", "");
        action.set_attr("pspad", "");
    }
    action
}

/// Append missing `<actionmap>` and `<action>` elements
pub fn add_profile_actions(doc: &mut Document, keybinds: &[Keybind], defaults: &DefaultsConfig) {
    for kb in keybinds {
        let map_name = kb.map_or(&defaults.export_map);
        let map_el = doc.root.named_or_insert_with("actionmap", map_name, || {
            Element::new("actionmap")
                .with_attr("name", map_name)
                .with_attr("priority", PURE_INCLUDE)
                .with_attr("exclusivity", "0")
                .with_comment(INCLUDE_COMMENT)
        });

        if map_el.has_named("action", &kb.name) {
            continue;
        }
        map_el.push(profile_action(&kb.name));
    }
}

/// Add `keybinds` to both documents and write them to `output_dir`
///
/// Both documents are serialized before either file is touched, and the
/// files are replaced together: on failure the previous outputs are left as
/// they were.
pub fn export_keybinds(
    output_dir: &Path,
    superactions_doc: &mut Document,
    profile_doc: &mut Document,
    keybinds: &[Keybind],
    defaults: &DefaultsConfig,
) -> Result<ExportedFiles> {
    add_superactions(superactions_doc, keybinds, defaults);
    add_profile_actions(profile_doc, keybinds, defaults);

    let superactions_xml = superactions_doc.to_xml_string();
    let profile_xml = profile_doc.to_xml_string();

    std::fs::create_dir_all(output_dir).map_err(|e| KeybinderError::io(output_dir, e))?;

    let files = ExportedFiles {
        superactions: output_dir.join(SUPERACTIONS_FILE),
        profile: output_dir.join(DEFAULT_PROFILE_FILE),
    };
    replace_files(&[
        (files.superactions.as_path(), superactions_xml.as_str()),
        (files.profile.as_path(), profile_xml.as_str()),
    ])?;

    tracing::info!(
        "Wrote {} and {} to {}",
        SUPERACTIONS_FILE,
        DEFAULT_PROFILE_FILE,
        output_dir.display()
    );
    Ok(files)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Could not remove {}: {}", path.display(), e);
    }
}

/// Replace every target with its contents, or none of them
///
/// Contents are staged in `<target>.tmp` files. Existing targets are moved to
/// `<target>.bak` before the staged files are renamed into place, and moved
/// back if any step fails.
pub fn replace_files(files: &[(&Path, &str)]) -> Result<()> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());
    for (target, contents) in files {
        if target.is_dir() {
            staged.iter().for_each(|tmp| remove_quietly(tmp));
            return Err(KeybinderError::io(
                *target,
                std::io::Error::other("a directory is in the way"),
            ));
        }
        let tmp = sibling(target, ".tmp");
        if let Err(e) = std::fs::write(&tmp, contents) {
            staged.iter().for_each(|tmp| remove_quietly(tmp));
            if tmp.exists() {
                remove_quietly(&tmp);
            }
            return Err(KeybinderError::io(&tmp, e));
        }
        staged.push(tmp);
    }

    let mut backups: Vec<(PathBuf, &Path)> = Vec::new();
    let mut installed: Vec<&Path> = Vec::new();
    let rollback = |backups: &[(PathBuf, &Path)], installed: &[&Path]| {
        installed.iter().for_each(|target| remove_quietly(target));
        for (backup, target) in backups {
            if let Err(e) = std::fs::rename(backup, target) {
                tracing::error!("Could not restore {}: {}", target.display(), e);
            }
        }
        staged
            .iter()
            .filter(|tmp| tmp.exists())
            .for_each(|tmp| remove_quietly(tmp));
    };

    for (target, _) in files {
        if !target.exists() {
            continue;
        }
        let backup = sibling(target, ".bak");
        if let Err(e) = std::fs::rename(target, &backup) {
            rollback(backups.as_slice(), installed.as_slice());
            return Err(KeybinderError::io(*target, e));
        }
        backups.push((backup, *target));
    }

    for (tmp, (target, _)) in staged.iter().zip(files) {
        if let Err(e) = std::fs::rename(tmp, target) {
            rollback(backups.as_slice(), installed.as_slice());
            return Err(KeybinderError::io(*target, e));
        }
        installed.push(*target);
    }

    for (backup, _) in &backups {
        remove_quietly(backup);
    }
    Ok(())
}
