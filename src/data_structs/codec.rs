use hashbrown::HashMap;
use itertools::Itertools;

use crate::data_structs::feature::{
    EncodedFeature,
    Feature,
    FeatureClass,
    FieldValue,
};
use crate::data_structs::typedef::{
    PosType,
    TrackSmallStr,
};
use crate::error::{
    TrackError,
    TrackResult,
};

pub const START_FIELD: &str = "start";
pub const END_FIELD: &str = "end";

/// Encodes raw feature records into their compact positional form and
/// resolves fast per-field accessors over encoded features.
///
/// One codec serves every class of a track (top-level features and
/// sub-features alike); an encoded feature carries its class id so
/// accessors can pick the right slot without decoding the rest of the row.
#[derive(Debug, Clone)]
pub struct FeatureCodec {
    classes:     Vec<FeatureClass>,
    class_index: HashMap<TrackSmallStr, usize>,
}

impl FeatureCodec {
    pub fn new(classes: Vec<FeatureClass>) -> Self {
        let class_index = classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (TrackSmallStr::from(class.name()), idx))
            .collect();
        Self {
            classes,
            class_index,
        }
    }

    pub fn classes(&self) -> &[FeatureClass] {
        &self.classes
    }

    pub fn class(
        &self,
        class_id: usize,
    ) -> Option<&FeatureClass> {
        self.classes.get(class_id)
    }

    pub fn class_id_by_name(
        &self,
        name: &str,
    ) -> Option<usize> {
        self.class_index.get(name).copied()
    }

    /// Encodes a record into one positional row per its class schema.
    ///
    /// Fields absent from the record encode as `Null`; encoding is
    /// deterministic for identical input. Fails with
    /// [`TrackError::UnknownField`] when the record carries a field its
    /// class schema does not define, and [`TrackError::UnknownClass`] when
    /// the class id is not registered.
    pub fn encode(
        &self,
        feature: &Feature,
    ) -> TrackResult<EncodedFeature> {
        let class = self
            .class(feature.class_id())
            .ok_or(TrackError::UnknownClass(feature.class_id()))?;

        let mut row = vec![FieldValue::Null; class.len()];
        for (name, value) in feature.fields() {
            let slot = class
                .slot_of(name.as_str())
                .ok_or_else(|| TrackError::UnknownField(name.to_string()))?;
            row[slot] = value.clone();
        }
        Ok(EncodedFeature::from_parts(feature.class_id(), row))
    }

    /// Resolves an accessor extracting one named field from encoded
    /// features without decoding the rest of the row.
    ///
    /// The accessor yields `None` for features whose class does not define
    /// the field; resolution fails with [`TrackError::UnknownField`] only
    /// when no class defines it at all.
    pub fn field_accessor(
        &self,
        field: &str,
    ) -> TrackResult<FieldAccessor> {
        let slots = self
            .classes
            .iter()
            .map(|class| class.slot_of(field))
            .collect_vec();
        if slots.iter().all(Option::is_none) {
            return Err(TrackError::UnknownField(field.to_string()));
        }
        Ok(FieldAccessor { slots })
    }

    /// Like [`Self::field_accessor`], but yields integer positions and
    /// requires the field in every class schema.
    pub fn position_accessor(
        &self,
        field: &str,
    ) -> TrackResult<PositionAccessor> {
        let inner = self.field_accessor(field)?;
        if inner.slots.iter().any(Option::is_none) {
            return Err(TrackError::UnknownField(field.to_string()));
        }
        Ok(PositionAccessor { inner })
    }

    pub fn start_accessor(&self) -> TrackResult<PositionAccessor> {
        self.position_accessor(START_FIELD)
    }

    pub fn end_accessor(&self) -> TrackResult<PositionAccessor> {
        self.position_accessor(END_FIELD)
    }
}

/// Extracts a single field from encoded features, one precomputed slot per
/// class id.
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    slots: Vec<Option<usize>>,
}

impl FieldAccessor {
    pub fn get<'a>(
        &self,
        feature: &'a EncodedFeature,
    ) -> Option<&'a FieldValue> {
        self.slots
            .get(feature.class_id())
            .copied()
            .flatten()
            .and_then(|slot| feature.row().get(slot))
    }
}

/// A [`FieldAccessor`] specialized to genomic positions.
#[derive(Debug, Clone)]
pub struct PositionAccessor {
    inner: FieldAccessor,
}

impl PositionAccessor {
    pub fn get(
        &self,
        feature: &EncodedFeature,
    ) -> Option<PosType> {
        self.inner
            .get(feature)
            .and_then(FieldValue::as_position)
    }
}

/// Estimated serialized size of one encoded feature in a JSON chunk,
/// including the separator that follows it. Serializing a plain row of
/// scalars cannot fail, so the fallback branch is unreachable in practice.
pub fn estimated_json_size(feature: &EncodedFeature) -> usize {
    serde_json::to_vec(feature)
        .map(|buf| buf.len() + 1)
        .unwrap_or_default()
}
