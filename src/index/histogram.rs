use itertools::{
    Itertools,
    MinMaxResult,
};
use log::{
    info,
    warn,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::{
    BinCountType,
    PosType,
};
use crate::error::TrackResult;
use crate::index::IntervalIndex;
use crate::io::ChunkedObjectStore;
use crate::utils::{
    CHUNK_PLACEHOLDER,
    HIST_MULTIPLES,
};
use crate::with_field_fn;

/// Default number of bins per persisted histogram chunk.
pub const DEFAULT_HIST_CHUNK_SIZE: usize = 10_000;

/// Object-name prefix of persisted histogram chunks.
pub const HIST_CHUNK_PREFIX: &str = "hist";

/// Addressing parameters of one persisted bin array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayParams {
    pub length:       usize,
    pub chunk_size:   usize,
    pub url_template: String,
}

/// Per-resolution histogram metadata handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramMeta {
    pub bases_per_bin: u64,
    pub array_params:  ArrayParams,
}

/// Lightweight per-resolution statistics for client heuristics such as
/// picking a default zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramStat {
    pub bases_per_bin: u64,
    pub min:           BinCountType,
    pub max:           BinCountType,
    pub mean:          f64,
}

/// Histogram section of the per-track metadata object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistogramData {
    pub meta:  Vec<HistogramMeta>,
    pub stats: Vec<HistogramStat>,
}

struct Resolution {
    bin_bases: u64,
    bins:      Vec<BinCountType>,
}

/// Derives multi-resolution feature-density histograms from a finalized
/// [`IntervalIndex`], persisting the bin arrays in fixed-size chunks.
///
/// Histograms are derived rather than accumulated during the load because
/// the total coordinate range is only known once the stream ends; a single
/// overlap scan over the finished index feeds every resolution at once.
pub struct HistogramBuilder<'a> {
    index:      &'a IntervalIndex<'a>,
    store:      &'a ChunkedObjectStore,
    chunk_size: usize,
}

impl<'a> HistogramBuilder<'a> {
    pub fn new(
        index: &'a IntervalIndex<'a>,
        store: &'a ChunkedObjectStore,
    ) -> Self {
        Self {
            index,
            store,
            chunk_size: DEFAULT_HIST_CHUNK_SIZE,
        }
    }

    with_field_fn!(chunk_size, usize);

    /// Builds, persists and describes the histograms for `[0, ref_end)`.
    ///
    /// The base bin size is the smallest series multiple exceeding
    /// `ref_end * 2.5 / feature_count`; coarser resolutions follow the
    /// series until a bin array would shrink below ~100 bins. An empty
    /// index produces empty metadata rather than a division by zero.
    pub fn build(
        &self,
        ref_end: PosType,
    ) -> TrackResult<HistogramData> {
        let count = self.index.count();
        if count == 0 || ref_end <= 0 {
            warn!(
                "skipping histograms: {} features over [0, {})",
                count, ref_end
            );
            return Ok(HistogramData::default());
        }

        let ref_end_u = ref_end as u64;
        let threshold = ref_end as f64 * 2.5 / count as f64;
        let mut base = HIST_MULTIPLES.last().copied().unwrap_or(1);
        for &multiple in HIST_MULTIPLES.iter() {
            if multiple as f64 > threshold {
                base = multiple;
                break;
            }
        }

        let mut resolutions = Vec::new();
        for &multiple in HIST_MULTIPLES.iter() {
            let bin_bases = match base.checked_mul(multiple) {
                Some(bin_bases) => bin_bases,
                None => break,
            };
            // cap the coarsest histogram at ~100 bins
            if bin_bases.saturating_mul(100) > ref_end_u {
                break;
            }
            let n_bins = num::integer::div_ceil(ref_end_u, bin_bases) as usize;
            resolutions.push(Resolution {
                bin_bases,
                bins: vec![0; n_bins],
            });
        }

        let start_acc = self.index.start_accessor();
        let end_acc = self.index.end_accessor();
        // the scan covers the whole index, not just [0, ref_end): features
        // past the reference end clamp into the terminal bin
        self.index.overlap_callback(
            self.index.min_start(),
            ref_end.max(self.index.max_end()),
            &mut |feature| {
                let (Some(start), Some(end)) =
                    (start_acc.get(feature), end_acc.get(feature))
                else {
                    return;
                };
                if end < 0 {
                    return;
                }
                let clamped_start = start.clamp(0, ref_end);
                let clamped_end = end.min(ref_end);
                for resolution in resolutions.iter_mut() {
                    let last_bin = resolution.bins.len() - 1;
                    let first = (clamped_start as u64 / resolution.bin_bases)
                        .min(last_bin as u64)
                        as usize;
                    let last = (clamped_end as u64 / resolution.bin_bases)
                        .min(last_bin as u64)
                        as usize;
                    for bin in first..=last {
                        resolution.bins[bin] += 1;
                    }
                }
            },
        )?;

        let mut data = HistogramData::default();
        for resolution in &resolutions {
            for (chunk, bins) in
                resolution.bins.chunks(self.chunk_size).enumerate()
            {
                let payload = serde_json::to_vec(&bins)?;
                self.store.put(
                    &format!(
                        "{}-{}-{}",
                        HIST_CHUNK_PREFIX, resolution.bin_bases, chunk
                    ),
                    &payload,
                )?;
            }

            data.meta.push(HistogramMeta {
                bases_per_bin: resolution.bin_bases,
                array_params:  ArrayParams {
                    length:       resolution.bins.len(),
                    chunk_size:   self.chunk_size,
                    url_template: format!(
                        "{}-{}-{}{}",
                        HIST_CHUNK_PREFIX,
                        resolution.bin_bases,
                        CHUNK_PLACEHOLDER,
                        self.store.extension()
                    ),
                },
            });

            let (min, max) = match resolution.bins.iter().minmax() {
                MinMaxResult::NoElements => (0, 0),
                MinMaxResult::OneElement(&only) => (only, only),
                MinMaxResult::MinMax(&min, &max) => (min, max),
            };
            let total: u64 =
                resolution.bins.iter().map(|&bin| bin as u64).sum();
            data.stats.push(HistogramStat {
                bases_per_bin: resolution.bin_bases,
                min,
                max,
                mean: total as f64 / resolution.bins.len() as f64,
            });
        }

        info!(
            "built {} histogram resolutions (base {} bases/bin) over [0, {})",
            data.meta.len(),
            base,
            ref_end
        );
        Ok(data)
    }
}
