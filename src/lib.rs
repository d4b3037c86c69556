//! # ncltrack
//!
//! `ncltrack` is a Rust library for offline indexing of genomic interval
//! features (gene models, alignments and the like) into a compact,
//! chunked, randomly-addressable on-disk representation, plus precomputed
//! multi-resolution density histograms. A remote browser client can then
//! fetch only the chunks covering its visible genomic range instead of a
//! whole chromosome's feature set.
//!
//! ## Key Features
//!
//! * **Nested containment indexing**: features arriving in sorted start
//!   order are threaded online into a nested-containment list
//!   ([`IntervalIndex`]), so overlap queries prune whole subtrees against
//!   per-node coordinate bounds.
//! * **Size-bounded chunking**: encoded features are grouped into persisted
//!   chunks against a caller-supplied byte budget and size estimator, with
//!   stable chunk identifiers and covered ranges recorded in a
//!   serializable [`IntervalDescriptor`].
//! * **Compact positional encoding**: [`FeatureCodec`] encodes records into
//!   flat positional rows per class schema and resolves fast single-field
//!   accessors that skip full decoding.
//! * **Derived histograms**: [`HistogramBuilder`] reuses the finished
//!   index's overlap queries to bin feature densities at a geometric series
//!   of resolutions, chunked and persisted alongside the features.
//! * **Per-refseq pipelines**: [`TrackIndexer`] drives the whole build for
//!   each reference sequence (directory layout, store, histograms, final
//!   `trackData.json` metadata) and fans independent refseqs out over a
//!   Rayon thread pool.
//! * **Flat-file ingestion**: adapters for GFF3 and BED input built on
//!   `bio-rs` readers.
//!
//! ## Usage
//!
//! ```no_run
//! use ncltrack::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let codec = FeatureCodec::new(vec![FeatureClass::new("gene", [
//!         "start", "end", "strand", "name",
//!     ])]);
//!     let options = TrackOptions::new("tracks/genes/{refseq}")
//!         .with_chunk_byte_budget(50_000)
//!         .with_compression(StoreCompression::Gzip);
//!     let indexer = TrackIndexer::new(codec, options);
//!
//!     let features = vec![
//!         Feature::span(0, 1_000, 9_000),
//!         Feature::span(0, 2_500, 4_000),
//!         Feature::span(0, 12_000, 18_000),
//!     ];
//!     let meta = indexer.index_refseq("chr1", 30_000_000, features)?;
//!     println!(
//!         "indexed {} features into {} chunks",
//!         meta.feature_count,
//!         meta.intervals.chunks.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! Construction is a single-writer batch: one [`IntervalIndex`] per
//! (track, reference sequence), populated once through
//! [`IntervalIndex::add_sorted`], finalized once, then read-only for
//! overlap queries. Different reference sequences are fully independent.

pub mod data_structs;
pub mod error;
pub mod index;
pub mod io;
pub mod prelude;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
