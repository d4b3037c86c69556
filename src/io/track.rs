use std::fs;
use std::path::PathBuf;

use anyhow::{
    Context,
    Result,
};
use log::info;
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::PosType;
use crate::data_structs::{
    estimated_json_size,
    Feature,
    FeatureCodec,
};
use crate::index::{
    HistogramBuilder,
    HistogramData,
    IntervalDescriptor,
    IntervalIndex,
    DEFAULT_HIST_CHUNK_SIZE,
};
use crate::io::store::{
    ChunkedObjectStore,
    StoreCompression,
};
use crate::utils::{
    substitute_template,
    REFSEQ_PLACEHOLDER,
};
use crate::{
    getter_fn,
    with_field_fn,
};

/// Version tag written into every per-track metadata object.
pub const FORMAT_VERSION: u32 = 1;
/// Object name of the per-track metadata.
pub const TRACK_DATA_NAME: &str = "trackData";
/// Default per-chunk byte budget for encoded feature data.
pub const DEFAULT_CHUNK_BYTE_BUDGET: usize = 50_000;

/// The per-track metadata object, persisted once per reference sequence
/// after a successful load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMeta {
    pub feature_count:  usize,
    pub intervals:      IntervalDescriptor,
    pub histograms:     HistogramData,
    pub format_version: u32,
}

/// Configuration of one track build.
#[derive(Debug, Clone)]
pub struct TrackOptions {
    dir_template:      String,
    chunk_byte_budget: usize,
    hist_chunk_size:   usize,
    compression:       StoreCompression,
}

impl TrackOptions {
    /// `dir_template` contains a `{refseq}` placeholder resolved per
    /// reference sequence.
    pub fn new<S: Into<String>>(dir_template: S) -> Self {
        Self {
            dir_template:      dir_template.into(),
            chunk_byte_budget: DEFAULT_CHUNK_BYTE_BUDGET,
            hist_chunk_size:   DEFAULT_HIST_CHUNK_SIZE,
            compression:       StoreCompression::None,
        }
    }

    with_field_fn!(chunk_byte_budget, usize);

    with_field_fn!(hist_chunk_size, usize);

    with_field_fn!(compression, StoreCompression);

    getter_fn!(dir_template, String);

    getter_fn!(chunk_byte_budget, usize);

    getter_fn!(hist_chunk_size, usize);

    getter_fn!(compression, StoreCompression);
}

impl Default for TrackOptions {
    fn default() -> Self {
        Self::new(REFSEQ_PLACEHOLDER)
    }
}

/// One reference sequence's worth of work for [`TrackIndexer::index_refseqs`].
#[derive(Debug, Clone)]
pub struct RefSeqJob {
    pub refseq:   String,
    pub ref_end:  PosType,
    pub features: Vec<Feature>,
}

impl RefSeqJob {
    pub fn new<S: Into<String>>(
        refseq: S,
        ref_end: PosType,
        features: Vec<Feature>,
    ) -> Self {
        Self {
            refseq: refseq.into(),
            ref_end,
            features,
        }
    }
}

/// Drives the full per-refseq pipeline: directory preparation, the
/// sequential index load, histogram derivation and the final metadata
/// object.
///
/// Reference sequences are independent: each owns its output directory and
/// index instance, so [`Self::index_refseqs`] fans them out over a thread
/// pool while each individual load stays strictly sequential.
pub struct TrackIndexer {
    codec:   FeatureCodec,
    options: TrackOptions,
}

impl TrackIndexer {
    pub fn new(
        codec: FeatureCodec,
        options: TrackOptions,
    ) -> Self {
        Self { codec, options }
    }

    getter_fn!(codec, FeatureCodec);

    getter_fn!(options, TrackOptions);

    /// Resolved output directory for one reference sequence. External
    /// collaborators (e.g. a name index) derive their own object paths
    /// from this.
    pub fn refseq_dir(
        &self,
        refseq: &str,
    ) -> PathBuf {
        substitute_template(
            &self.options.dir_template,
            REFSEQ_PLACEHOLDER,
            refseq,
        )
        .into()
    }

    /// Indexes one reference sequence's sorted feature stream.
    ///
    /// Any prior output directory for the refseq is discarded first. The
    /// metadata object is only written after the whole pipeline has
    /// succeeded, so readers never observe a descriptor referencing
    /// partial output.
    pub fn index_refseq<I>(
        &self,
        refseq: &str,
        ref_end: PosType,
        features: I,
    ) -> Result<TrackMeta>
    where
        I: IntoIterator<Item = Feature>, {
        let dir = self.refseq_dir(refseq);
        if dir.exists() {
            fs::remove_dir_all(&dir).with_context(|| {
                format!("failed to discard prior output at {:?}", dir)
            })?;
        }
        let store = ChunkedObjectStore::create(&dir, self.options.compression)
            .with_context(|| {
                format!("failed to create object store under {:?}", dir)
            })?;

        let mut index = IntervalIndex::new(&self.codec, &store)?;
        index.start_load(
            Box::new(estimated_json_size),
            self.options.chunk_byte_budget,
        )?;
        for feature in features {
            index.add_sorted(&feature)?;
        }
        let intervals = index.finish_load().with_context(|| {
            format!("failed to finalize interval index for {}", refseq)
        })?;

        let histograms = HistogramBuilder::new(&index, &store)
            .with_chunk_size(self.options.hist_chunk_size)
            .build(ref_end)
            .with_context(|| {
                format!("failed to build histograms for {}", refseq)
            })?;

        let meta = TrackMeta {
            feature_count: intervals.count,
            intervals,
            histograms,
            format_version: FORMAT_VERSION,
        };
        store.put(TRACK_DATA_NAME, &serde_json::to_vec(&meta)?)?;

        info!(
            "indexed {}: {} features, {} chunks, {} histogram resolutions",
            refseq,
            meta.feature_count,
            meta.intervals.chunks.len(),
            meta.histograms.meta.len()
        );
        Ok(meta)
    }

    /// Indexes independent reference sequences in parallel, one pipeline
    /// per refseq.
    pub fn index_refseqs(
        &self,
        jobs: Vec<RefSeqJob>,
    ) -> Result<Vec<TrackMeta>> {
        jobs.into_par_iter()
            .map(|job| self.index_refseq(&job.refseq, job.ref_end, job.features))
            .collect()
    }
}
