pub use crate::data_structs::typedef::{
    BinCountType,
    PosType,
    TrackSmallStr,
};
pub use crate::data_structs::{
    estimated_json_size,
    EncodedFeature,
    Feature,
    FeatureClass,
    FeatureCodec,
    FieldAccessor,
    FieldValue,
    PositionAccessor,
};
pub use crate::error::{
    TrackError,
    TrackResult,
};
pub use crate::index::{
    ChunkMeta,
    HistogramBuilder,
    HistogramData,
    HistogramMeta,
    HistogramStat,
    IntervalDescriptor,
    IntervalIndex,
    SizeEstimator,
};
pub use crate::io::{
    ChunkedObjectStore,
    RefSeqJob,
    StoreCompression,
    TrackIndexer,
    TrackMeta,
    TrackOptions,
};
pub use crate::utils::{
    substitute_template,
    CHUNK_PLACEHOLDER,
    REFSEQ_PLACEHOLDER,
};
