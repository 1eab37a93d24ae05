//! Command-line argument parsing
//!
//! With no arguments, paths are derived from the executable's location:
//! the tool lives in `<game>/Bin/<platform>/`, so the game root is two levels up.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::KeybinderConfig;
use crate::service::RunPaths;

/// Merge mod keybindings into the game's input profile
#[derive(Parser, Debug, Default)]
#[command(
    name = "keybinder",
    version,
    about = "Merge mod keybindings into the game's input profile"
)]
pub struct CliArgs {
    /// Game installation root (contains Data/ and Mods/)
    #[arg(long, value_name = "DIR")]
    pub game_root: Option<PathBuf>,

    /// Game data directory holding the baseline archive
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory containing installed mods
    #[arg(long, value_name = "DIR")]
    pub mods_dir: Option<PathBuf>,

    /// Where to write the merged documents
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Baseline archive (file name relative to the data directory, or a full path)
    #[arg(long, value_name = "FILE")]
    pub baseline_archive: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log per-mod decisions to the console
    #[arg(short, long)]
    pub verbose: bool,
}

/// Game root for an executable in `<game>/Bin/<platform>/`
pub fn game_root_from_exe_dir(exe_dir: &Path) -> Option<PathBuf> {
    exe_dir.parent().and_then(Path::parent).map(Path::to_path_buf)
}

impl CliArgs {
    /// Resolve all run locations, filling gaps from the game root
    pub fn into_paths(
        self,
        config: &KeybinderConfig,
        exe_dir: Option<&Path>,
    ) -> Result<RunPaths, String> {
        let game_root = self
            .game_root
            .or_else(|| exe_dir.and_then(game_root_from_exe_dir));

        let data_dir = self
            .data_dir
            .or_else(|| game_root.as_ref().map(|root| root.join("Data")))
            .ok_or_else(|| "Cannot determine data directory; pass --game-root or --data-dir".to_string())?;

        let mods_dir = self
            .mods_dir
            .or_else(|| game_root.as_ref().map(|root| root.join("Mods")))
            .ok_or_else(|| "Cannot determine mods directory; pass --game-root or --mods-dir".to_string())?;

        let output_dir = self.output_dir.unwrap_or_else(|| {
            mods_dir
                .join(&config.output.dir_name)
                .join("Libs")
                .join("Config")
        });

        // A relative archive path is relative to the data directory
        let baseline_archive = match self.baseline_archive {
            Some(path) if path.is_absolute() => path,
            Some(path) => data_dir.join(path),
            None => data_dir.join(&config.baseline.archive),
        };

        Ok(RunPaths {
            baseline_archive,
            mods_dir,
            output_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_from_game_root() {
        let args = CliArgs {
            game_root: Some(PathBuf::from("/games/kcd2")),
            ..Default::default()
        };
        let paths = args
            .into_paths(&KeybinderConfig::default(), None)
            .unwrap();

        assert_eq!(
            paths.baseline_archive,
            PathBuf::from("/games/kcd2/Data/IPL_GameData.pak")
        );
        assert_eq!(paths.mods_dir, PathBuf::from("/games/kcd2/Mods"));
        assert_eq!(
            paths.output_dir,
            PathBuf::from("/games/kcd2/Mods/zz_keybinder/Libs/Config")
        );
    }

    #[test]
    fn test_paths_from_exe_dir() {
        let args = CliArgs::default();
        let exe_dir = PathBuf::from("/games/kcd2/Bin/Win64");
        let paths = args
            .into_paths(&KeybinderConfig::default(), Some(&exe_dir))
            .unwrap();

        assert_eq!(paths.mods_dir, PathBuf::from("/games/kcd2/Mods"));
    }

    #[test]
    fn test_explicit_dirs_override_game_root() {
        let args = CliArgs {
            game_root: Some(PathBuf::from("/games/kcd2")),
            mods_dir: Some(PathBuf::from("/elsewhere/mods")),
            output_dir: Some(PathBuf::from("/tmp/out")),
            baseline_archive: Some(PathBuf::from("Custom.pak")),
            ..Default::default()
        };
        let paths = args
            .into_paths(&KeybinderConfig::default(), None)
            .unwrap();

        assert_eq!(paths.mods_dir, PathBuf::from("/elsewhere/mods"));
        assert_eq!(paths.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(
            paths.baseline_archive,
            PathBuf::from("/games/kcd2/Data/Custom.pak")
        );
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "keybinder",
            "-v",
            "--mods-dir",
            "/mods",
            "--config",
            "/etc/keybinder.yaml",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.mods_dir, Some(PathBuf::from("/mods")));
        assert_eq!(args.config, Some(PathBuf::from("/etc/keybinder.yaml")));
        assert!(!CliArgs::try_parse_from(["keybinder"]).unwrap().verbose);
    }

    #[test]
    fn test_missing_roots_is_error() {
        let args = CliArgs {
            mods_dir: Some(PathBuf::from("/mods")),
            ..Default::default()
        };
        let err = args
            .into_paths(&KeybinderConfig::default(), None)
            .unwrap_err();
        assert!(err.contains("data directory"));
    }

    #[test]
    fn test_output_dir_follows_config() {
        let mut config = KeybinderConfig::default();
        config.output.dir_name = "zz_custom".to_string();
        let args = CliArgs {
            game_root: Some(PathBuf::from("/g")),
            ..Default::default()
        };
        let paths = args.into_paths(&config, None).unwrap();
        assert!(paths.output_dir.starts_with("/g/Mods/zz_custom"));
    }
}
