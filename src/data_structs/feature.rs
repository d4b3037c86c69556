use std::fmt::Display;

use indexmap::IndexSet;
use serde::ser::SerializeSeq;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::{
    PosType,
    TrackSmallStr,
};

/// Dynamically typed payload of a single feature field.
///
/// Serialized untagged, so an encoded feature row is a plain JSON array of
/// scalars a browser client can consume directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(TrackSmallStr),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_position(&self) -> Option<PosType> {
        self.as_int()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.into())
    }
}

/// A raw feature record: a half-open interval `[start, end)` plus named
/// field values, tagged with the class id of the schema it follows.
/// Immutable once handed to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    class_id: usize,
    fields:   Vec<(TrackSmallStr, FieldValue)>,
}

impl Feature {
    pub fn new(
        class_id: usize,
        fields: Vec<(TrackSmallStr, FieldValue)>,
    ) -> Self {
        Self { class_id, fields }
    }

    /// Shorthand for a record carrying only `start` and `end`.
    pub fn span(
        class_id: usize,
        start: PosType,
        end: PosType,
    ) -> Self {
        Self::new(class_id, vec![
            ("start".into(), FieldValue::Int(start)),
            ("end".into(), FieldValue::Int(end)),
        ])
    }

    pub fn class_id(&self) -> usize {
        self.class_id
    }

    pub fn fields(&self) -> &[(TrackSmallStr, FieldValue)] {
        &self.fields
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_str() == name)
            .map(|(_, value)| value)
    }
}

/// Ordered field schema for one feature class.
///
/// The field order defines the positional layout of encoded features.
/// Every class used with an [`crate::index::IntervalIndex`] must resolve
/// `start` and `end` (matched case-insensitively).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureClass {
    name:   TrackSmallStr,
    fields: IndexSet<TrackSmallStr>,
}

impl FeatureClass {
    pub fn new<N, I, F>(
        name: N,
        fields: I,
    ) -> Self
    where
        N: Into<TrackSmallStr>,
        I: IntoIterator<Item = F>,
        F: Into<TrackSmallStr>, {
        Self {
            name:   name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positional slot of a field, matching exactly first and falling back
    /// to an ASCII case-insensitive scan (`Start` resolves to `start`).
    pub fn slot_of(
        &self,
        field: &str,
    ) -> Option<usize> {
        self.fields.get_index_of(field).or_else(|| {
            self.fields
                .iter()
                .position(|known| known.as_str().eq_ignore_ascii_case(field))
        })
    }
}

impl Display for FeatureClass {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}[{}]", self.name, self.fields.len())
    }
}

/// A feature in its compact positional form: the class id followed by one
/// value per schema field, in schema order.
///
/// The JSON form is a flat row, `[classId, v0, v1, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeature {
    class_id: usize,
    row:      Vec<FieldValue>,
}

impl EncodedFeature {
    pub(crate) fn from_parts(
        class_id: usize,
        row: Vec<FieldValue>,
    ) -> Self {
        Self { class_id, row }
    }

    pub fn class_id(&self) -> usize {
        self.class_id
    }

    pub fn row(&self) -> &[FieldValue] {
        &self.row
    }
}

impl Serialize for EncodedFeature {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        let mut seq = serializer.serialize_seq(Some(self.row.len() + 1))?;
        seq.serialize_element(&self.class_id)?;
        for value in &self.row {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for EncodedFeature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let mut row = Vec::<FieldValue>::deserialize(deserializer)?;
        if row.is_empty() {
            return Err(serde::de::Error::invalid_length(
                0,
                &"a class id followed by field values",
            ));
        }
        match row.remove(0) {
            FieldValue::Int(id) if id >= 0 => {
                Ok(Self {
                    class_id: id as usize,
                    row,
                })
            },
            other => {
                Err(serde::de::Error::custom(format!(
                    "expected a class id as the first row element, got {:?}",
                    other
                )))
            },
        }
    }
}
