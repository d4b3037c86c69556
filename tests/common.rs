#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use ncltrack::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn plain_class() -> FeatureClass {
    FeatureClass::new("feature", ["start", "end", "name"])
}

pub fn plain_codec() -> FeatureCodec {
    FeatureCodec::new(vec![plain_class()])
}

pub fn random_sorted_spans(
    seed: u64,
    count: usize,
    max_start: PosType,
    max_len: PosType,
) -> Vec<(PosType, PosType)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut spans = (0..count)
        .map(|_| {
            let start = rng.gen_range(0..max_start);
            let len = rng.gen_range(1..=max_len);
            (start, start + len)
        })
        .collect::<Vec<_>>();
    spans.sort();
    spans
}

pub fn features_from_spans(spans: &[(PosType, PosType)]) -> Vec<Feature> {
    spans
        .iter()
        .enumerate()
        .map(|(idx, &(start, end))| {
            Feature::new(0, vec![
                ("start".into(), start.into()),
                ("end".into(), end.into()),
                ("name".into(), format!("f{}", idx).as_str().into()),
            ])
        })
        .collect()
}

/// Snapshot of every file under `root`, keyed by relative path.
pub fn dir_snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut snapshot = BTreeMap::new();
    collect_files(root, root, &mut snapshot);
    snapshot
}

fn collect_files(
    root: &Path,
    dir: &Path,
    snapshot: &mut BTreeMap<String, Vec<u8>>,
) {
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_files(root, &path, snapshot);
        }
        else {
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            snapshot.insert(relative, std::fs::read(&path).unwrap());
        }
    }
}
