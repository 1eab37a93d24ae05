//! Benchmarks for merge and export over a synthetic baseline
//!
//! Run with: cargo bench merge_export

use keybinder::config::DefaultsConfig;
use keybinder::export::{add_profile_actions, add_superactions};
use keybinder::merge::merge_keybinds;
use keybinder::{Keybind, VanillaConfig};

fn main() {
    divan::main();
}

/// Baseline with `maps` action maps of 50 actions each, half of them mod-owned
fn make_baseline(maps: usize) -> VanillaConfig {
    let mut profile = String::from("<defaultProfile>\n");
    for m in 0..maps {
        profile.push_str(&format!("  <actionmap name=\"map_{}\" priority=\"1\">\n", m));
        for a in 0..50 {
            let owner = if a % 2 == 0 { String::new() } else { format!("mod_{}", a % 7) };
            profile.push_str(&format!(
                "    <action name=\"action_{}_{}\" map=\"{}\" onPress=\"1\" />\n",
                m, a, owner
            ));
        }
        profile.push_str("  </actionmap>\n");
    }
    profile.push_str("</defaultProfile>\n");

    VanillaConfig::from_texts(Some(&profile), None).unwrap()
}

fn make_keybinds(count: usize) -> Vec<Keybind> {
    (0..count)
        .map(|i| {
            let kb = Keybind::new(format!("mod_action_{}", i)).in_group(format!("mod_{}", i % 7));
            match i % 3 {
                0 => kb.on_map(""),
                1 => kb.on_map(format!("map_{}", i % 10)),
                _ => kb.on_map(format!("new_map_{}", i % 5)),
            }
        })
        .collect()
}

#[divan::bench(args = [10, 100])]
fn parse_baseline(bencher: divan::Bencher, maps: usize) {
    let baseline = make_baseline(maps);
    let text = baseline.profile_doc.to_xml_string();
    bencher.bench(|| VanillaConfig::from_texts(Some(divan::black_box(text.as_str())), None).unwrap());
}

#[divan::bench(args = [100, 1_000])]
fn merge(bencher: divan::Bencher, keybinds: usize) {
    let baseline = make_baseline(50);
    let candidates = make_keybinds(keybinds);
    let installed: Vec<String> = (0..4).map(|i| format!("mod_{}", i)).collect();

    bencher
        .with_inputs(|| (baseline.action_maps.clone(), candidates.clone()))
        .bench_values(|(mut maps, mut kbs)| {
            let report = merge_keybinds(&mut maps, &mut kbs, &installed, "movement");
            divan::black_box((maps, report))
        });
}

#[divan::bench(args = [100, 1_000])]
fn export_documents(bencher: divan::Bencher, keybinds: usize) {
    let baseline = make_baseline(50);
    let candidates = make_keybinds(keybinds);
    let defaults = DefaultsConfig::default();

    bencher
        .with_inputs(|| baseline.clone())
        .bench_values(|mut vanilla| {
            add_superactions(&mut vanilla.superactions_doc, &candidates, &defaults);
            add_profile_actions(&mut vanilla.profile_doc, &candidates, &defaults);
            divan::black_box((
                vanilla.superactions_doc.to_xml_string(),
                vanilla.profile_doc.to_xml_string(),
            ))
        });
}
