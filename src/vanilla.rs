//! Vanilla profile loading
//!
//! Parses the game's shipped action-map and superaction documents into
//! structured lookups while keeping the document trees for the exporter.

use std::collections::BTreeMap;
use std::path::Path;

use crate::archive::{ArchiveReader, PakArchive};
use crate::error::{KeybinderError, Result};
use crate::model::{ActionMap, Superaction};
use crate::xml::Document;

/// Action-map document entry inside the baseline archive
pub const DEFAULT_PROFILE_ENTRY: &str = "Libs/Config/defaultProfile.xml";
/// Superaction document entry inside the baseline archive (and inside mod archives)
pub const SUPERACTIONS_ENTRY: &str = "Libs/Config/keybindSuperactions.xml";

/// Root element of a freshly created action-map document
pub const DEFAULT_PROFILE_ROOT: &str = "defaultProfile";
/// Root element of a freshly created superaction document
pub const SUPERACTIONS_ROOT: &str = "keybinds";

/// The baseline documents and their structured views
///
/// Maps are insert-or-replace by name: when the baseline declares the same
/// action map or superaction twice, the last one parsed wins.
#[derive(Debug, Clone)]
pub struct VanillaConfig {
    pub action_maps: BTreeMap<String, ActionMap>,
    pub superactions: BTreeMap<String, Superaction>,
    pub profile_doc: Document,
    pub superactions_doc: Document,
}

impl Default for VanillaConfig {
    fn default() -> Self {
        Self {
            action_maps: BTreeMap::new(),
            superactions: BTreeMap::new(),
            profile_doc: Document::new(DEFAULT_PROFILE_ROOT),
            superactions_doc: Document::new(SUPERACTIONS_ROOT),
        }
    }
}

impl VanillaConfig {
    /// Load both documents from the baseline `.pak`
    ///
    /// The archive itself must exist; missing entries inside it are tolerated.
    pub fn load_pak(path: &Path) -> Result<Self> {
        let mut archive = PakArchive::open(path)?;
        let config = Self::load_from_archive(&mut archive)?;
        tracing::info!(
            "Loaded vanilla profile from {} ({} action maps, {} superactions)",
            path.display(),
            config.action_maps.len(),
            config.superactions.len()
        );
        Ok(config)
    }

    pub fn load_from_archive(archive: &mut dyn ArchiveReader) -> Result<Self> {
        let profile = archive.read_entry(DEFAULT_PROFILE_ENTRY)?;
        let superactions = archive.read_entry(SUPERACTIONS_ENTRY)?;
        Self::from_texts(profile.as_deref(), superactions.as_deref())
    }

    /// Build from raw document text; `None` or blank text yields an empty document
    pub fn from_texts(profile: Option<&str>, superactions: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(doc) = parse_optional(profile, DEFAULT_PROFILE_ENTRY)? {
            for el in doc.root.elements("actionmap") {
                let map = ActionMap::from_element(el);
                config.action_maps.insert(map.name.clone(), map);
            }
            config.profile_doc = doc;
        } else {
            tracing::debug!("No baseline {}, starting empty", DEFAULT_PROFILE_ENTRY);
        }

        if let Some(doc) = parse_optional(superactions, SUPERACTIONS_ENTRY)? {
            for el in doc.root.elements("superaction") {
                let sa = Superaction::from_element(el);
                config.superactions.insert(sa.name.clone(), sa);
            }
            config.superactions_doc = doc;
        } else {
            tracing::debug!("No baseline {}, starting empty", SUPERACTIONS_ENTRY);
        }

        Ok(config)
    }
}

fn parse_optional(text: Option<&str>, origin: &str) -> Result<Option<Document>> {
    match text {
        Some(text) if !text.trim().is_empty() => Document::parse(text)
            .map(Some)
            .map_err(|e| KeybinderError::xml(origin, e)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::MemoryArchive;

    const PROFILE: &str = r#"<defaultProfile>
  <actionmap name="movement" priority="1" exclusivity="1">
    <action name="jump" onPress="1"/>
    <action name="crouch" onPress="1"/>
  </actionmap>
  <actionmap name="menu">
    <action name="back" onRelease="1"/>
  </actionmap>
</defaultProfile>"#;

    const SUPERACTIONS: &str = r#"<keybinds>
  <ui_group name="movement" ui_label="ui_movement"/>
  <superaction name="jump" ui_group="movement" ui_name="ui_jump">
    <action name="jump" map="movement"/>
    <control input="space" controller="keyboard"/>
  </superaction>
</keybinds>"#;

    #[test]
    fn test_from_texts_builds_lookups() {
        let config = VanillaConfig::from_texts(Some(PROFILE), Some(SUPERACTIONS)).unwrap();

        assert_eq!(config.action_maps.len(), 2);
        let movement = &config.action_maps["movement"];
        assert_eq!(movement.priority, "1");
        assert_eq!(movement.actions.len(), 2);
        assert_eq!(config.action_maps["menu"].priority, "default");

        let jump = &config.superactions["jump"];
        assert_eq!(jump.ui_name, "ui_jump");
        assert_eq!(jump.controls[0].input, "space");
    }

    #[test]
    fn test_documents_are_retained() {
        let config = VanillaConfig::from_texts(Some(PROFILE), Some(SUPERACTIONS)).unwrap();
        assert_eq!(config.profile_doc.root.name, "defaultProfile");
        assert_eq!(config.profile_doc.root.elements("actionmap").count(), 2);
        assert!(config.superactions_doc.root.has_named("ui_group", "movement"));
    }

    #[test]
    fn test_missing_entries_give_empty_trees() {
        let config = VanillaConfig::from_texts(None, Some("   ")).unwrap();

        assert!(config.action_maps.is_empty());
        assert!(config.superactions.is_empty());
        assert_eq!(config.profile_doc.root.name, DEFAULT_PROFILE_ROOT);
        assert!(config.profile_doc.root.children.is_empty());
        assert_eq!(config.superactions_doc.root.name, SUPERACTIONS_ROOT);
    }

    #[test]
    fn test_malformed_baseline_is_fatal() {
        let err = VanillaConfig::from_texts(Some("<defaultProfile><actionmap>"), None).unwrap_err();
        match err {
            KeybinderError::Xml { origin, .. } => assert_eq!(origin, DEFAULT_PROFILE_ENTRY),
            other => panic!("Expected Xml error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_map_names_last_wins() {
        let profile = r#"<defaultProfile>
  <actionmap name="movement" priority="1"/>
  <actionmap name="movement" priority="2"/>
</defaultProfile>"#;
        let config = VanillaConfig::from_texts(Some(profile), None).unwrap();
        assert_eq!(config.action_maps.len(), 1);
        assert_eq!(config.action_maps["movement"].priority, "2");
    }

    #[test]
    fn test_load_from_archive() {
        let mut archive = MemoryArchive::new()
            .with_entry(DEFAULT_PROFILE_ENTRY, PROFILE)
            .with_entry(SUPERACTIONS_ENTRY, SUPERACTIONS);
        let config = VanillaConfig::load_from_archive(&mut archive).unwrap();
        assert!(config.action_maps.contains_key("movement"));
        assert!(config.superactions.contains_key("jump"));
    }
}
