//! The interval indexing engine: a nested-containment list built online
//! from a sorted feature stream, chunked against a byte budget, and the
//! histogram pass deriving multi-resolution density summaries from it.

mod histogram;
mod nclist;

pub use histogram::{
    ArrayParams,
    HistogramBuilder,
    HistogramData,
    HistogramMeta,
    HistogramStat,
    DEFAULT_HIST_CHUNK_SIZE,
    HIST_CHUNK_PREFIX,
};
pub use nclist::{
    ChunkMeta,
    IntervalDescriptor,
    IntervalIndex,
    SizeEstimator,
    FEATURE_CHUNK_PREFIX,
};
