//! Flat-file ingestion adapters converting GFF3 and BED records into raw
//! [`Feature`] records ready for the index.
//!
//! Coordinates are normalized to half-open zero-based intervals (GFF3 is
//! 1-based inclusive on disk). The index requires features in
//! non-decreasing start order, so the file readers sort what they read.

use std::path::Path;

use anyhow::{
    Context,
    Result,
};
use bio::bio_types::strand::Strand;
use bio::io::{
    bed,
    gff,
};
use itertools::Itertools;

use crate::data_structs::{
    Feature,
    FeatureClass,
    FieldValue,
};

/// Schema for features read from GFF3 files.
pub fn gff_class() -> FeatureClass {
    FeatureClass::new("gff3", [
        "start", "end", "strand", "source", "type", "score", "id", "name",
    ])
}

/// Schema for features read from BED files.
pub fn bed_class() -> FeatureClass {
    FeatureClass::new("bed", ["start", "end", "name", "score", "strand"])
}

fn strand_value(strand: Option<Strand>) -> FieldValue {
    match strand {
        Some(Strand::Forward) => FieldValue::Int(1),
        Some(Strand::Reverse) => FieldValue::Int(-1),
        _ => FieldValue::Null,
    }
}

pub fn feature_from_gff(
    record: &gff::Record,
    class_id: usize,
) -> Feature {
    let mut fields = vec![
        (
            "start".into(),
            FieldValue::Int(*record.start() as i64 - 1),
        ),
        ("end".into(), FieldValue::Int(*record.end() as i64)),
        ("strand".into(), strand_value(record.strand())),
        ("source".into(), FieldValue::Str(record.source().into())),
        ("type".into(), FieldValue::Str(record.feature_type().into())),
        (
            "score".into(),
            record
                .score()
                .map(|score| FieldValue::Int(score as i64))
                .unwrap_or(FieldValue::Null),
        ),
    ];
    if let Some(id) = record.attributes().get("ID") {
        fields.push(("id".into(), FieldValue::Str(id.as_str().into())));
    }
    if let Some(name) = record.attributes().get("Name") {
        fields.push(("name".into(), FieldValue::Str(name.as_str().into())));
    }
    Feature::new(class_id, fields)
}

pub fn feature_from_bed(
    record: &bed::Record,
    class_id: usize,
) -> Feature {
    let mut fields = vec![
        ("start".into(), FieldValue::Int(record.start() as i64)),
        ("end".into(), FieldValue::Int(record.end() as i64)),
    ];
    if let Some(name) = record.name() {
        fields.push(("name".into(), FieldValue::Str(name.into())));
    }
    if let Some(score) = record
        .score()
        .and_then(|score| score.parse::<i64>().ok())
    {
        fields.push(("score".into(), FieldValue::Int(score)));
    }
    fields.push(("strand".into(), strand_value(record.strand())));
    Feature::new(class_id, fields)
}

fn sort_by_start(features: Vec<Feature>) -> Vec<Feature> {
    features
        .into_iter()
        .sorted_by_key(|feature| {
            feature
                .get("start")
                .and_then(FieldValue::as_int)
                .unwrap_or(0)
        })
        .collect()
}

/// Reads a whole GFF3 file into features sorted by ascending start.
pub fn read_sorted_gff<P: AsRef<Path>>(
    path: P,
    class_id: usize,
) -> Result<Vec<Feature>> {
    let mut reader = gff::Reader::from_file(path.as_ref(), gff::GffType::GFF3)
        .with_context(|| {
            format!("failed to open GFF3 file {:?}", path.as_ref())
        })?;
    let mut features = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| {
            format!("malformed GFF3 record in {:?}", path.as_ref())
        })?;
        features.push(feature_from_gff(&record, class_id));
    }
    Ok(sort_by_start(features))
}

/// Reads a whole BED file into features sorted by ascending start.
pub fn read_sorted_bed<P: AsRef<Path>>(
    path: P,
    class_id: usize,
) -> Result<Vec<Feature>> {
    let mut reader = bed::Reader::from_file(path.as_ref()).with_context(|| {
        format!("failed to open BED file {:?}", path.as_ref())
    })?;
    let mut features = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| {
            format!("malformed BED record in {:?}", path.as_ref())
        })?;
        features.push(feature_from_bed(&record, class_id));
    }
    Ok(sort_by_start(features))
}
