//! Source normalizers: map one raw, schema-less listing document into a
//! [`CanonicalPropertyProfile`].
//!
//! Normalizers never fail. Every field is probed through an ordered list of
//! candidate paths and the first defined, correctly-typed value wins; a miss
//! leaves the field absent. Only JSON parsing can fail, and that happens in the
//! caller before a normalizer sees the document.

mod keywords;
mod paths;
mod primary;
mod secondary_a;
mod secondary_b;

use phub_core::{CanonicalPropertyProfile, ImageItem, SourceTag};
use serde_json::Value as JsonValue;

use keywords::FacilityFacts;

pub use primary::PrimaryNormalizer;
pub use secondary_a::SecondaryANormalizer;
pub use secondary_b::SecondaryBNormalizer;

pub const CRATE_NAME: &str = "phub-normalizers";

pub trait SourceNormalizer: Send + Sync {
    fn source_tag(&self) -> SourceTag;

    /// `fallback_images` replaces this source's images verbatim when its own
    /// extraction finds none.
    fn normalize(
        &self,
        raw: &JsonValue,
        fallback_images: Option<&[ImageItem]>,
    ) -> CanonicalPropertyProfile;
}

pub fn normalizer_for_source(tag: SourceTag) -> Box<dyn SourceNormalizer> {
    match tag {
        SourceTag::Primary => Box::new(PrimaryNormalizer),
        SourceTag::SecondaryA => Box::new(SecondaryANormalizer),
        SourceTag::SecondaryB => Box::new(SecondaryBNormalizer),
    }
}

/// Identity block shared by all variants: `id`/`primaryId` are the source's
/// own id until the assembler anchors them to the caller's property id.
fn base_profile(tag: SourceTag, native_id: Option<String>) -> CanonicalPropertyProfile {
    let id = native_id.clone().unwrap_or_default();
    CanonicalPropertyProfile {
        id: id.clone(),
        primary_id: id,
        source_ids: phub_core::SourceIds::only(tag, native_id),
        ..Default::default()
    }
}

fn with_fallback_images(images: Vec<ImageItem>, fallback: Option<&[ImageItem]>) -> Vec<ImageItem> {
    match fallback {
        Some(fallback) if images.is_empty() => fallback.to_vec(),
        _ => images,
    }
}

/// Booleans and category lists are always recomputed from facility tokens.
fn apply_facility_facts(profile: &mut CanonicalPropertyProfile) {
    let facts = FacilityFacts::from_facilities(&profile.facilities);
    profile.parking_available = Some(facts.parking);
    profile.breakfast_available = Some(facts.breakfast || !profile.breakfast_details.is_empty());
    profile.languages = facts.languages;
    profile.on_site_dining = facts.on_site_dining;
}

/// Images from the first candidate array that yields at least one usable entry.
fn first_image_list(
    root: &JsonValue,
    candidates: &[&[&str]],
    to_image: impl Fn(&JsonValue) -> Option<ImageItem>,
) -> Vec<ImageItem> {
    candidates
        .iter()
        .map(|path| {
            paths::json_array(root, path)
                .iter()
                .filter_map(&to_image)
                .collect::<Vec<_>>()
        })
        .find(|images| !images.is_empty())
        .unwrap_or_default()
}
