use itertools::Itertools;
use log::{
    debug,
    info,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::PosType;
use crate::data_structs::{
    EncodedFeature,
    Feature,
    FeatureCodec,
    PositionAccessor,
};
use crate::error::{
    TrackError,
    TrackResult,
};
use crate::io::ChunkedObjectStore;
use crate::utils::CHUNK_PLACEHOLDER;

/// Estimates the serialized size of one encoded feature in bytes,
/// including any separator overhead.
pub type SizeEstimator = Box<dyn Fn(&EncodedFeature) -> usize>;

/// Object-name prefix of persisted feature chunks.
pub const FEATURE_CHUNK_PREFIX: &str = "lf";

/// Identifier and covered range of one persisted feature chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMeta {
    pub chunk: usize,
    pub start: PosType,
    pub end:   PosType,
}

/// Finalized, serializable summary of an [`IntervalIndex`]: everything a
/// reader needs to address and query its chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalDescriptor {
    pub count:        usize,
    pub min_start:    PosType,
    pub max_end:      PosType,
    pub chunks:       Vec<ChunkMeta>,
    pub url_template: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Idle,
    Loading,
    Finished,
}

/// One arena slot: a feature interval, its fully-nested children (as arena
/// indices) and the maximum end coordinate of its subtree.
#[derive(Debug)]
struct Node {
    feature:  EncodedFeature,
    start:    PosType,
    end:      PosType,
    max_end:  PosType,
    children: Vec<usize>,
}

/// A nested-containment interval index over a sorted feature stream.
///
/// Features arrive in non-decreasing start order through
/// [`Self::add_sorted`]; fully-nested intervals become children of their
/// container, so overlap queries can prune whole subtrees against a
/// per-node `max_end` bound. While loading, encoded features are grouped
/// into size-bounded chunks and persisted through the store; after
/// [`Self::finish_load`] the structure is read-only and serves
/// [`Self::overlap_callback`] queries.
///
/// The containment hierarchy lives in an arena addressed by index, with
/// child lists stored as index sequences.
pub struct IntervalIndex<'a> {
    codec: &'a FeatureCodec,
    store: &'a ChunkedObjectStore,

    start_acc: PositionAccessor,
    end_acc:   PositionAccessor,

    state: LoadState,
    nodes: Vec<Node>,
    roots: Vec<usize>,
    // currently-open containment chain, innermost last
    open:  Vec<usize>,

    estimator: Option<SizeEstimator>,
    budget:    usize,

    chunk_buf:       Vec<usize>,
    chunk_buf_bytes: usize,
    chunks:          Vec<ChunkMeta>,

    prev_start: PosType,
    min_start:  PosType,
    max_end:    PosType,

    descriptor: Option<IntervalDescriptor>,
}

impl<'a> IntervalIndex<'a> {
    /// Creates an index over the codec's classes, persisting chunks through
    /// `store`. Fails when a class schema does not resolve `start` and
    /// `end`.
    pub fn new(
        codec: &'a FeatureCodec,
        store: &'a ChunkedObjectStore,
    ) -> TrackResult<Self> {
        Ok(Self {
            codec,
            store,
            start_acc: codec.start_accessor()?,
            end_acc: codec.end_accessor()?,
            state: LoadState::Idle,
            nodes: Vec::new(),
            roots: Vec::new(),
            open: Vec::new(),
            estimator: None,
            budget: 0,
            chunk_buf: Vec::new(),
            chunk_buf_bytes: 0,
            chunks: Vec::new(),
            prev_start: PosType::MIN,
            min_start: PosType::MAX,
            max_end: PosType::MIN,
            descriptor: None,
        })
    }

    /// Begins a load: installs the size estimator and the per-chunk byte
    /// budget. Must be called exactly once, before any
    /// [`Self::add_sorted`].
    pub fn start_load(
        &mut self,
        estimator: SizeEstimator,
        chunk_byte_budget: usize,
    ) -> TrackResult<()> {
        if self.state != LoadState::Idle {
            return Err(TrackError::Sequence(
                "start_load may only be called once, on a fresh index",
            ));
        }
        self.estimator = Some(estimator);
        self.budget = chunk_byte_budget;
        self.state = LoadState::Loading;
        Ok(())
    }

    /// Appends the next feature of the sorted stream.
    ///
    /// The feature is encoded, threaded into the containment hierarchy
    /// (updating `max_end` bounds incrementally) and accounted against the
    /// open chunk. When the running size estimate would exceed the budget
    /// the open chunk is flushed first; a feature whose own estimate
    /// exceeds the budget is flushed immediately as a singleton chunk.
    ///
    /// Features must arrive in non-decreasing start order; a start going
    /// backwards is rejected with [`TrackError::Sequence`].
    pub fn add_sorted(
        &mut self,
        feature: &Feature,
    ) -> TrackResult<()> {
        match self.state {
            LoadState::Idle => {
                return Err(TrackError::Sequence(
                    "add_sorted called before start_load",
                ))
            },
            LoadState::Finished => {
                return Err(TrackError::Sequence(
                    "add_sorted called after finish_load",
                ))
            },
            LoadState::Loading => {},
        }

        let encoded = self.codec.encode(feature)?;
        let start = self
            .start_acc
            .get(&encoded)
            .ok_or_else(|| TrackError::UnknownField("start".to_string()))?;
        let end = self
            .end_acc
            .get(&encoded)
            .ok_or_else(|| TrackError::UnknownField("end".to_string()))?;
        if start < self.prev_start {
            return Err(TrackError::Sequence(
                "features must be added in non-decreasing start order",
            ));
        }

        let estimate = match &self.estimator {
            Some(estimator) => estimator(&encoded),
            None => 0,
        };
        if !self.chunk_buf.is_empty()
            && self.chunk_buf_bytes + estimate > self.budget
        {
            self.flush_chunk()?;
        }

        let id = self.nodes.len();
        while let Some(&top) = self.open.last() {
            if self.nodes[top].end >= end {
                break;
            }
            self.open.pop();
        }
        for &ancestor in &self.open {
            if self.nodes[ancestor].max_end < end {
                self.nodes[ancestor].max_end = end;
            }
        }
        match self.open.last() {
            Some(&parent) => self.nodes[parent].children.push(id),
            None => self.roots.push(id),
        }
        self.nodes.push(Node {
            feature: encoded,
            start,
            end,
            max_end: end,
            children: Vec::new(),
        });
        self.open.push(id);

        self.chunk_buf.push(id);
        self.chunk_buf_bytes += estimate;
        if estimate > self.budget {
            self.flush_chunk()?;
        }

        self.prev_start = start;
        self.min_start = self.min_start.min(start);
        self.max_end = self.max_end.max(end);
        Ok(())
    }

    /// Flushes the remaining open chunk and finalizes the structure,
    /// returning the descriptor.
    ///
    /// Calling again with no intervening mutation returns the same
    /// descriptor.
    pub fn finish_load(&mut self) -> TrackResult<IntervalDescriptor> {
        match self.state {
            LoadState::Idle => {
                Err(TrackError::Sequence(
                    "finish_load called before start_load",
                ))
            },
            LoadState::Finished => {
                self.descriptor.clone().ok_or(TrackError::NotReady)
            },
            LoadState::Loading => {
                self.flush_chunk()?;
                self.open.clear();
                self.state = LoadState::Finished;

                let descriptor = IntervalDescriptor {
                    count:        self.nodes.len(),
                    min_start:    self.min_start(),
                    max_end:      self.max_end(),
                    chunks:       self.chunks.clone(),
                    url_template: format!(
                        "{}-{}{}",
                        FEATURE_CHUNK_PREFIX,
                        CHUNK_PLACEHOLDER,
                        self.store.extension()
                    ),
                };
                info!(
                    "finalized interval index: {} features in {} chunks",
                    descriptor.count,
                    descriptor.chunks.len()
                );
                self.descriptor = Some(descriptor.clone());
                Ok(descriptor)
            },
        }
    }

    /// Invokes `visitor` exactly once for every feature whose interval
    /// intersects `[query_start, query_end)`, in ascending start order.
    ///
    /// A subtree is skipped when its `max_end` bound cannot reach the
    /// query, and a sibling scan stops at the first node starting at or
    /// past the query end. Fails with [`TrackError::NotReady`] before
    /// [`Self::finish_load`].
    pub fn overlap_callback<F>(
        &self,
        query_start: PosType,
        query_end: PosType,
        visitor: &mut F,
    ) -> TrackResult<()>
    where
        F: FnMut(&EncodedFeature), {
        if self.state != LoadState::Finished {
            return Err(TrackError::NotReady);
        }
        self.visit_level(&self.roots, query_start, query_end, visitor);
        Ok(())
    }

    fn visit_level<F>(
        &self,
        level: &[usize],
        query_start: PosType,
        query_end: PosType,
        visitor: &mut F,
    ) where
        F: FnMut(&EncodedFeature), {
        for &id in level {
            let node = &self.nodes[id];
            // siblings are ordered by start, nothing further can overlap
            if node.start >= query_end {
                break;
            }
            if node.max_end <= query_start {
                continue;
            }
            if node.end > query_start {
                visitor(&node.feature);
            }
            self.visit_level(&node.children, query_start, query_end, visitor);
        }
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn min_start(&self) -> PosType {
        if self.nodes.is_empty() {
            0
        }
        else {
            self.min_start
        }
    }

    pub fn max_end(&self) -> PosType {
        if self.nodes.is_empty() {
            0
        }
        else {
            self.max_end
        }
    }

    pub fn descriptor(&self) -> Option<&IntervalDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn start_accessor(&self) -> &PositionAccessor {
        &self.start_acc
    }

    pub fn end_accessor(&self) -> &PositionAccessor {
        &self.end_acc
    }

    fn flush_chunk(&mut self) -> TrackResult<()> {
        if self.chunk_buf.is_empty() {
            return Ok(());
        }
        let chunk = self.chunks.len();
        let rows = self
            .chunk_buf
            .iter()
            .map(|&id| &self.nodes[id].feature)
            .collect_vec();
        let payload = serde_json::to_vec(&rows)?;
        self.store
            .put(&format!("{}-{}", FEATURE_CHUNK_PREFIX, chunk), &payload)?;

        let start = self.nodes[self.chunk_buf[0]].start;
        let end = self
            .chunk_buf
            .iter()
            .map(|&id| self.nodes[id].end)
            .max()
            .unwrap_or(start);
        debug!(
            "flushed chunk {} covering [{}, {}): {} features, ~{} bytes",
            chunk,
            start,
            end,
            self.chunk_buf.len(),
            self.chunk_buf_bytes
        );
        self.chunks.push(ChunkMeta { chunk, start, end });
        self.chunk_buf.clear();
        self.chunk_buf_bytes = 0;
        Ok(())
    }
}
