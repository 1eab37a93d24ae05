//! Merging mod keybinds into the vanilla action maps
//!
//! Merge order:
//! 1. Prune actions owned by mods that are no longer installed
//! 2. Resolve a blank target map to the merge default
//! 3. Create the target action map if the baseline doesn't have it
//! 4. Append the action unless the map already has one with that name
//!
//! Existing actions are never edited.

use std::collections::{BTreeMap, HashSet};

use crate::model::{Action, ActionMap, Keybind};

/// What a merge changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Actions removed because their owning mod is gone
    pub pruned: usize,
    /// Actions appended for new keybinds
    pub inserted: usize,
    /// Action maps created for keybinds targeting unknown maps
    pub created_maps: Vec<String>,
}

/// Remove actions whose owning mod is not installed
///
/// Mod ids compare case-insensitively. Native actions (blank owner) stay.
pub fn prune_stale_actions<'a>(
    action_maps: &mut BTreeMap<String, ActionMap>,
    installed_mod_ids: impl IntoIterator<Item = &'a String>,
) -> usize {
    let installed: HashSet<String> = installed_mod_ids
        .into_iter()
        .map(|id| id.to_lowercase())
        .collect();

    let mut pruned = 0;
    for map in action_maps.values_mut() {
        let before = map.actions.len();
        map.actions
            .retain(|a| a.is_native() || installed.contains(&a.map.to_lowercase()));
        let removed = before - map.actions.len();
        if removed > 0 {
            tracing::debug!("Pruned {} stale actions from map {}", removed, map.name);
        }
        pruned += removed;
    }
    pruned
}

/// Merge `keybinds` into `action_maps`
///
/// Blank target maps on `keybinds` are filled with `default_map` in place, so
/// a later export sees the map the keybind was merged into.
pub fn merge_keybinds<'a>(
    action_maps: &mut BTreeMap<String, ActionMap>,
    keybinds: &mut [Keybind],
    installed_mod_ids: impl IntoIterator<Item = &'a String>,
    default_map: &str,
) -> MergeReport {
    let mut report = MergeReport {
        pruned: prune_stale_actions(action_maps, installed_mod_ids),
        ..Default::default()
    };

    for kb in keybinds.iter_mut() {
        if kb.target_map().is_none() {
            kb.map = Some(default_map.to_string());
        }
        let map_name = kb.map_or(default_map).to_string();

        let map = action_maps.entry(map_name.clone()).or_insert_with(|| {
            tracing::debug!("Creating action map {} for {}", map_name, kb.name);
            report.created_maps.push(map_name.clone());
            ActionMap::pure_include(map_name.clone())
        });

        if map.contains(&kb.name) {
            continue;
        }
        map.actions.push(Action {
            name: kb.name.clone(),
            map: map_name,
            on_press: "1".to_string(),
            on_release: "1".to_string(),
            ..Default::default()
        });
        report.inserted += 1;
    }

    report
}
