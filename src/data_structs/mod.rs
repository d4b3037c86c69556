//! Core data structures for representing track features and their compact
//! encoded form.
//!
//! Key components of this module include:
//!
//! - [`Feature`]: a raw feature record, a half-open genomic interval plus
//!   named field values tagged with a class id.
//! - [`FeatureClass`]: the ordered field schema of one feature class;
//!   several classes (e.g. genes and their sub-features) may coexist in one
//!   track.
//! - [`EncodedFeature`] and [`FeatureCodec`]: the positional encoding of
//!   records and the accessor machinery that extracts single fields from
//!   encoded rows without decoding them.
//! - [`typedef`]: type aliases for positions, bin counts and short
//!   sequence/field names.

mod codec;
mod feature;
pub mod typedef;

pub use codec::{
    estimated_json_size,
    FeatureCodec,
    FieldAccessor,
    PositionAccessor,
    END_FIELD,
    START_FIELD,
};
pub use feature::{
    EncodedFeature,
    Feature,
    FeatureClass,
    FieldValue,
};
