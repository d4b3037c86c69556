//! Utility helpers shared across the crate: placeholder substitution for
//! addressing templates, the histogram bin-size series, and small macros
//! for struct accessors and builder-style setters.

use once_cell::sync::Lazy;

/// Placeholder substituted with the reference-sequence name in directory
/// templates.
pub const REFSEQ_PLACEHOLDER: &str = "{refseq}";
/// Placeholder substituted with a chunk index in chunk addressing
/// templates.
pub const CHUNK_PLACEHOLDER: &str = "{chunk}";

/// Resolves an addressing template by replacing every occurrence of the
/// placeholder with the given value.
///
/// Templates are plain strings; no runtime code generation is involved.
pub fn substitute_template(
    template: &str,
    placeholder: &str,
    value: &str,
) -> String {
    template.replace(placeholder, value)
}

/// The geometric series of histogram bin-size multiples: 1, 2, 5 scaled by
/// powers of ten. Round multiples keep client zoom levels mapping onto
/// predictable resolutions.
pub static HIST_MULTIPLES: Lazy<Vec<u64>> = Lazy::new(|| {
    let mut multiples = Vec::with_capacity(27);
    let mut scale: u64 = 1;
    for _ in 0..9 {
        for base in [1u64, 2, 5] {
            multiples.push(base * scale);
        }
        scale *= 10;
    }
    multiples
});

#[macro_export]
macro_rules! getter_fn {
    ($field_name: ident, $field_type: ty) => {
        pub fn $field_name(&self) -> &$field_type {
            &self.$field_name
        }
    };
}
pub use getter_fn;

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
                self.$field_name = value;
                self
            }
        }
    };
}
