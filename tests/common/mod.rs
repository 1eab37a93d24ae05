//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use keybinder::vanilla::{DEFAULT_PROFILE_ENTRY, SUPERACTIONS_ENTRY};
use keybinder::{KeybindService, KeybinderConfig, RunPaths};
use zip::write::SimpleFileOptions;

/// Baseline action maps: one native action and one owned by each of two mods
pub const BASELINE_PROFILE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<defaultProfile>
  <actionmap name="movement" priority="1">
    <action name="jump" onPress="1" />
    <action name="sprint" map="mod_b" onPress="1" />
    <action name="dodge" map="mod_a" onPress="1" />
  </actionmap>
  <actionmap name="combat">
    <action name="attack" onPress="1" />
  </actionmap>
</defaultProfile>
"#;

pub const BASELINE_SUPERACTIONS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<keybinds>
  <ui_group name="movement" ui_label="ui_movement" />
  <superaction name="jump" ui_group="movement" ui_name="ui_jump">
    <action name="jump" map="movement" />
    <control input="space" controller="keyboard" />
  </superaction>
</keybinds>
"#;

/// Write a zip archive holding `entries` as `(path, text)` pairs
pub fn write_pak(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, text) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(text.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub fn manifest(mod_id: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<kcd_mod><info><name>Test</name><modid>{}</modid></info></kcd_mod>\n",
        mod_id
    )
}

/// Create `<mods_root>/<dir>/` with a manifest and `Data/<dir>.pak`
pub fn write_mod(mods_root: &Path, dir: &str, mod_id: &str, entries: &[(&str, &str)]) -> PathBuf {
    let mod_dir = mods_root.join(dir);
    fs::create_dir_all(&mod_dir).unwrap();
    fs::write(mod_dir.join("mod.manifest"), manifest(mod_id)).unwrap();
    write_pak(&mod_dir.join("Data").join(format!("{}.pak", dir)), entries);
    mod_dir
}

/// A mod superaction document declaring `names` in `map`
pub fn mod_superactions(names: &[&str], map: &str) -> String {
    let mut xml = String::from("<keybinds>\n");
    for name in names {
        xml.push_str(&format!(
            "  <superaction name=\"{0}\" ui_name=\"ui_{0}\" ui_tooltip=\"tip {0}\">\n    <action name=\"{0}\" map=\"{1}\" />\n  </superaction>\n",
            name, map
        ));
    }
    xml.push_str("</keybinds>\n");
    xml
}

/// Temporary game install with the baseline archive and an empty mods root
pub struct GameDir {
    pub root: tempfile::TempDir,
}

impl GameDir {
    pub fn new() -> Self {
        Self::with_baseline(BASELINE_PROFILE, BASELINE_SUPERACTIONS)
    }

    pub fn with_baseline(profile: &str, superactions: &str) -> Self {
        let root = tempfile::tempdir().unwrap();
        write_pak(
            &root.path().join("Data").join("IPL_GameData.pak"),
            &[
                (DEFAULT_PROFILE_ENTRY, profile),
                (SUPERACTIONS_ENTRY, superactions),
            ],
        );
        fs::create_dir_all(root.path().join("Mods")).unwrap();
        Self { root }
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.root.path().join("Mods")
    }

    pub fn paths(&self) -> RunPaths {
        RunPaths {
            baseline_archive: self.root.path().join("Data").join("IPL_GameData.pak"),
            mods_dir: self.mods_dir(),
            output_dir: self.mods_dir().join("zz_keybinder").join("Libs").join("Config"),
        }
    }

    pub fn service(&self) -> KeybindService {
        KeybindService::new(self.paths(), KeybinderConfig::default())
    }

    pub fn read_output(&self, file: &str) -> String {
        fs::read_to_string(self.paths().output_dir.join(file)).unwrap()
    }
}
