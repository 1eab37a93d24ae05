//! One keybinder run
//!
//! ```text
//! baseline .pak → VanillaConfig ─┐
//!                                ├→ merge → export → keybindSuperactions.xml
//! mods root → ModScanner ────────┘                   defaultProfile.xml
//! ```

use std::path::PathBuf;

use crate::config::KeybinderConfig;
use crate::error::Result;
use crate::export::{self, ExportedFiles};
use crate::merge::{self, MergeReport};
use crate::model::Keybind;
use crate::scanner::{self, ModScanner};
use crate::vanilla::VanillaConfig;

/// Resolved locations for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// The baseline archive holding the vanilla profile documents
    pub baseline_archive: PathBuf,
    /// Root directory containing one directory per installed mod
    pub mods_dir: PathBuf,
    /// Directory the two merged documents are written to
    pub output_dir: PathBuf,
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub keybinds: usize,
    pub merge: MergeReport,
    pub files: ExportedFiles,
}

/// Loads the vanilla profile, merges mod keybinds into it and writes the result
pub struct KeybindService {
    paths: RunPaths,
    config: KeybinderConfig,
    vanilla: VanillaConfig,
}

impl KeybindService {
    pub fn new(paths: RunPaths, config: KeybinderConfig) -> Self {
        Self {
            paths,
            config,
            vanilla: VanillaConfig::default(),
        }
    }

    /// Use an already loaded baseline instead of reading the baseline archive
    pub fn with_vanilla(mut self, vanilla: VanillaConfig) -> Self {
        self.vanilla = vanilla;
        self
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    pub fn vanilla(&self) -> &VanillaConfig {
        &self.vanilla
    }

    pub fn load_vanilla(&mut self) -> Result<()> {
        self.vanilla = VanillaConfig::load_pak(&self.paths.baseline_archive)?;
        Ok(())
    }

    pub fn scan_mods(&self) -> Result<Vec<Keybind>> {
        ModScanner::new(self.config.scan.clone()).scan(&self.paths.mods_dir)
    }

    /// Prune stale actions and merge `keybinds` into the vanilla action maps
    pub fn merge_mod_action_maps(&mut self, keybinds: &mut [Keybind]) -> Result<MergeReport> {
        let installed = scanner::installed_mod_ids(&self.paths.mods_dir)?;
        Ok(merge::merge_keybinds(
            &mut self.vanilla.action_maps,
            keybinds,
            &installed,
            &self.config.defaults.merge_map,
        ))
    }

    pub fn export_keybinds(&mut self, keybinds: &[Keybind]) -> Result<ExportedFiles> {
        export::export_keybinds(
            &self.paths.output_dir,
            &mut self.vanilla.superactions_doc,
            &mut self.vanilla.profile_doc,
            keybinds,
            &self.config.defaults,
        )
    }

    /// Run everything against the loaded baseline
    pub fn merge_and_export(&mut self) -> Result<RunSummary> {
        let mut keybinds = self.scan_mods()?;
        let merge = self.merge_mod_action_maps(&mut keybinds)?;
        tracing::info!(
            "Merged {} keybinds: {} inserted, {} stale pruned, {} maps created",
            keybinds.len(),
            merge.inserted,
            merge.pruned,
            merge.created_maps.len()
        );

        let files = self.export_keybinds(&keybinds)?;
        Ok(RunSummary {
            keybinds: keybinds.len(),
            merge,
            files,
        })
    }

    /// Load the baseline archive, then merge and export
    pub fn generate(&mut self) -> Result<RunSummary> {
        self.load_vanilla()?;
        self.merge_and_export()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::DEFAULT_PROFILE_FILE;

    #[test]
    fn test_merge_and_export_with_preloaded_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let paths = RunPaths {
            baseline_archive: dir.path().join("unused.pak"),
            mods_dir: dir.path().join("Mods"),
            output_dir: dir.path().join("out"),
        };
        let vanilla = VanillaConfig::from_texts(
            Some(r#"<defaultProfile><actionmap name="movement"><action name="jump"/></actionmap></defaultProfile>"#),
            None,
        )
        .unwrap();

        let mut service = KeybindService::new(paths, KeybinderConfig::default()).with_vanilla(vanilla);
        let summary = service.merge_and_export().unwrap();

        assert_eq!(summary.keybinds, 0);
        assert_eq!(summary.merge, MergeReport::default());
        assert_eq!(summary.files.profile, dir.path().join("out").join(DEFAULT_PROFILE_FILE));
        let written = std::fs::read_to_string(&summary.files.profile).unwrap();
        assert!(written.contains("<action name=\"jump\" />"));
        assert!(service.vanilla().action_maps["movement"].contains("jump"));
    }
}
