mod common;

use std::io::Read;

use common::{
    dir_snapshot,
    features_from_spans,
    plain_codec,
    random_sorted_spans,
};
use ncltrack::prelude::*;

fn indexer_under(
    root: &std::path::Path,
    options: TrackOptions,
) -> TrackIndexer {
    let template = format!("{}/tracks/{{refseq}}", root.display());
    TrackIndexer::new(
        plain_codec(),
        TrackOptions::new(template)
            .with_chunk_byte_budget(*options.chunk_byte_budget())
            .with_hist_chunk_size(*options.hist_chunk_size())
            .with_compression(*options.compression()),
    )
}

fn point_features(count: usize) -> Vec<Feature> {
    // short features spaced so none straddles a histogram bin boundary
    features_from_spans(
        &(0..count)
            .map(|idx| (idx as PosType * 10, idx as PosType * 10 + 1))
            .collect::<Vec<_>>(),
    )
}

#[test]
fn track_metadata_lands_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = indexer_under(dir.path(), TrackOptions::default());

    let meta = indexer
        .index_refseq("chr1", 100_000, point_features(1_000))
        .unwrap();
    assert_eq!(meta.feature_count, 1_000);
    assert_eq!(meta.format_version, 1);

    let track_data = dir.path().join("tracks/chr1/trackData.json");
    let parsed: TrackMeta =
        serde_json::from_slice(&std::fs::read(&track_data).unwrap()).unwrap();
    assert_eq!(parsed, meta);

    // every referenced chunk exists
    for chunk in &meta.intervals.chunks {
        let name = substitute_template(
            &meta.intervals.url_template,
            CHUNK_PLACEHOLDER,
            &chunk.chunk.to_string(),
        );
        assert!(dir.path().join("tracks/chr1").join(name).exists());
    }
}

#[test]
fn histogram_counts_are_conserved() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = indexer_under(dir.path(), TrackOptions::default());

    let meta = indexer
        .index_refseq("chr1", 100_000, point_features(1_000))
        .unwrap();

    // threshold = 100_000 * 2.5 / 1000 = 250 -> base bin size 500
    assert_eq!(meta.histograms.meta[0].bases_per_bin, 500);
    for hist in &meta.histograms.meta {
        let mut bins: Vec<BinCountType> = Vec::new();
        let n_chunks = hist
            .array_params
            .length
            .div_ceil(hist.array_params.chunk_size);
        for chunk in 0..n_chunks {
            let name = substitute_template(
                &hist.array_params.url_template,
                CHUNK_PLACEHOLDER,
                &chunk.to_string(),
            );
            let payload =
                std::fs::read(dir.path().join("tracks/chr1").join(name))
                    .unwrap();
            bins.extend(
                serde_json::from_slice::<Vec<BinCountType>>(&payload).unwrap(),
            );
        }
        assert_eq!(bins.len(), hist.array_params.length);
        // single-bin features: total increments equal the feature count
        assert_eq!(bins.iter().map(|&b| b as u64).sum::<u64>(), 1_000);
    }

    let stats = &meta.histograms.stats;
    assert_eq!(stats.len(), meta.histograms.meta.len());
    assert!(stats[0].max >= 1);
}

#[test]
fn rerunning_a_load_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = indexer_under(
        dir.path(),
        TrackOptions::default().with_chunk_byte_budget(512),
    );
    let spans = random_sorted_spans(99, 800, 200_000, 2_000);

    let first = indexer
        .index_refseq("chr2", 250_000, features_from_spans(&spans))
        .unwrap();
    let first_snapshot = dir_snapshot(dir.path());

    let second = indexer
        .index_refseq("chr2", 250_000, features_from_spans(&spans))
        .unwrap();
    let second_snapshot = dir_snapshot(dir.path());

    assert_eq!(first, second);
    assert_eq!(first_snapshot, second_snapshot);
    assert!(first_snapshot.len() > 2);
}

#[test]
fn zero_features_produce_empty_track() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = indexer_under(dir.path(), TrackOptions::default());

    let meta = indexer.index_refseq("chrM", 16_000, Vec::new()).unwrap();
    assert_eq!(meta.feature_count, 0);
    assert!(meta.intervals.chunks.is_empty());
    assert!(meta.histograms.meta.is_empty());
    assert!(meta.histograms.stats.is_empty());

    let parsed: TrackMeta = serde_json::from_slice(
        &std::fs::read(dir.path().join("tracks/chrM/trackData.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(parsed.feature_count, 0);
}

#[test]
fn gzip_store_extension_reaches_templates() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = indexer_under(
        dir.path(),
        TrackOptions::default().with_compression(StoreCompression::Gzip),
    );

    let meta = indexer
        .index_refseq("chr1", 100_000, point_features(1_000))
        .unwrap();
    assert!(meta.intervals.url_template.ends_with(".jsonz"));
    assert!(meta.histograms.meta[0]
        .array_params
        .url_template
        .ends_with(".jsonz"));

    let track_data = dir.path().join("tracks/chr1/trackData.jsonz");
    let mut decoder = flate2::read::GzDecoder::new(
        std::fs::File::open(&track_data).unwrap(),
    );
    let mut payload = Vec::new();
    decoder.read_to_end(&mut payload).unwrap();
    let parsed: TrackMeta = serde_json::from_slice(&payload).unwrap();
    assert_eq!(parsed, meta);
}

#[test]
fn stale_output_is_discarded_before_reload() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = indexer_under(
        dir.path(),
        TrackOptions::default().with_chunk_byte_budget(64),
    );

    let spans = random_sorted_spans(3, 500, 100_000, 1_000);
    indexer
        .index_refseq("chr3", 120_000, features_from_spans(&spans))
        .unwrap();
    let chunks_before = dir_snapshot(dir.path()).len();

    // a much smaller reload must not leave stale chunks behind
    indexer
        .index_refseq("chr3", 120_000, features_from_spans(&spans[..5]))
        .unwrap();
    let after = dir_snapshot(dir.path());
    assert!(after.len() < chunks_before);
    for name in after.keys() {
        assert!(name.starts_with("tracks/chr3/"));
    }
}

#[test]
fn refseqs_index_independently_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let indexer = indexer_under(dir.path(), TrackOptions::default());

    let jobs = vec![
        RefSeqJob::new("chr1", 100_000, point_features(1_000)),
        RefSeqJob::new(
            "chr2",
            50_000,
            features_from_spans(&random_sorted_spans(17, 300, 40_000, 2_000)),
        ),
        RefSeqJob::new("chrM", 16_000, Vec::new()),
    ];
    let metas = indexer.index_refseqs(jobs).unwrap();

    assert_eq!(metas.len(), 3);
    assert_eq!(metas[0].feature_count, 1_000);
    assert_eq!(metas[1].feature_count, 300);
    assert_eq!(metas[2].feature_count, 0);
    for refseq in ["chr1", "chr2", "chrM"] {
        assert_eq!(
            indexer.refseq_dir(refseq),
            dir.path().join("tracks").join(refseq)
        );
        assert!(indexer.refseq_dir(refseq).join("trackData.json").exists());
    }
}
