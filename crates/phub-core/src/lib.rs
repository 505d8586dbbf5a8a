//! Core domain model for Property Hub: canonical profiles and match scores.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "phub-core";

/// Listing provider a raw document was scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    Primary,
    SecondaryA,
    SecondaryB,
}

impl SourceTag {
    pub const ALL: [SourceTag; 3] = [SourceTag::Primary, SourceTag::SecondaryA, SourceTag::SecondaryB];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Primary => "Primary",
            SourceTag::SecondaryA => "SecondaryA",
            SourceTag::SecondaryB => "SecondaryB",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per source slot. Used for anything that comes in a
/// primary/secondary-A/secondary-B triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSource<T> {
    #[serde(rename = "Primary")]
    pub primary: T,
    #[serde(rename = "SecondaryA")]
    pub secondary_a: T,
    #[serde(rename = "SecondaryB")]
    pub secondary_b: T,
}

impl<T: Default> Default for PerSource<T> {
    fn default() -> Self {
        Self {
            primary: T::default(),
            secondary_a: T::default(),
            secondary_b: T::default(),
        }
    }
}

impl<T> PerSource<T> {
    pub fn get(&self, tag: SourceTag) -> &T {
        match tag {
            SourceTag::Primary => &self.primary,
            SourceTag::SecondaryA => &self.secondary_a,
            SourceTag::SecondaryB => &self.secondary_b,
        }
    }

    pub fn get_mut(&mut self, tag: SourceTag) -> &mut T {
        match tag {
            SourceTag::Primary => &mut self.primary,
            SourceTag::SecondaryA => &mut self.secondary_a,
            SourceTag::SecondaryB => &mut self.secondary_b,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(SourceTag, T) -> U) -> PerSource<U> {
        PerSource {
            primary: f(SourceTag::Primary, self.primary),
            secondary_a: f(SourceTag::SecondaryA, self.secondary_a),
            secondary_b: f(SourceTag::SecondaryB, self.secondary_b),
        }
    }

    pub fn each_ref(&self) -> PerSource<&T> {
        PerSource {
            primary: &self.primary,
            secondary_a: &self.secondary_a,
            secondary_b: &self.secondary_b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoCoordinate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl GeoCoordinate {
    /// `None` when neither axis was found.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        if latitude.is_none() && longitude.is_none() {
            None
        } else {
            Some(Self { latitude, longitude })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ImageItem {
    pub fn new(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            url: url.into(),
            title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RoomTypeSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageItem>,
}

/// Native identifiers, one optional per source. Traceability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SourceIds {
    #[serde(rename = "Primary", default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(rename = "SecondaryA", default, skip_serializing_if = "Option::is_none")]
    pub secondary_a: Option<String>,
    #[serde(rename = "SecondaryB", default, skip_serializing_if = "Option::is_none")]
    pub secondary_b: Option<String>,
}

impl SourceIds {
    pub fn only(tag: SourceTag, id: Option<String>) -> Self {
        let mut ids = Self::default();
        *ids.slot_mut(tag) = id;
        ids
    }

    pub fn get(&self, tag: SourceTag) -> Option<&str> {
        match tag {
            SourceTag::Primary => self.primary.as_deref(),
            SourceTag::SecondaryA => self.secondary_a.as_deref(),
            SourceTag::SecondaryB => self.secondary_b.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, tag: SourceTag) -> &mut Option<String> {
        match tag {
            SourceTag::Primary => &mut self.primary,
            SourceTag::SecondaryA => &mut self.secondary_a,
            SourceTag::SecondaryB => &mut self.secondary_b,
        }
    }
}

/// Unified per-property record produced by a source normalizer.
///
/// Scalar fields are `None` when no extraction path matched. Sequence fields
/// keep source order and duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPropertyProfile {
    pub id: String,
    pub primary_id: String,
    pub source_ids: SourceIds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<GeoCoordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakfast_available: Option<bool>,
    #[serde(default)]
    pub nearby_attractions: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageItem>,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub on_site_dining: Vec<String>,
    #[serde(default)]
    pub room_types: Vec<RoomTypeSummary>,
    #[serde(default)]
    pub breakfast_details: Vec<String>,
    #[serde(default)]
    pub pet_policy: Vec<String>,
    #[serde(default)]
    pub nearby_transport: Vec<String>,
    #[serde(default)]
    pub policies: BTreeMap<String, Vec<String>>,
}

impl CanonicalPropertyProfile {
    /// Replaces the normalizer-derived identity with the caller's property id.
    pub fn anchor_to(&mut self, property_id: &str) {
        self.id = property_id.to_string();
        self.primary_id = property_id.to_string();
        self.source_ids.primary = Some(property_id.to_string());
    }
}

/// Per-field agreement between a secondary profile and the primary, 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FieldMatchBreakdown {
    pub name: u8,
    pub address: u8,
    pub images: u8,
    pub facilities: u8,
    pub overall: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub base: SourceTag,
    pub target: SourceTag,
    pub scores: FieldMatchBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Comparisons {
    #[serde(rename = "vsSecondaryA", default, skip_serializing_if = "Option::is_none")]
    pub vs_secondary_a: Option<ComparisonResult>,
    #[serde(rename = "vsSecondaryB", default, skip_serializing_if = "Option::is_none")]
    pub vs_secondary_b: Option<ComparisonResult>,
}

impl Comparisons {
    pub fn insert(&mut self, result: ComparisonResult) {
        match result.target {
            SourceTag::SecondaryA => self.vs_secondary_a = Some(result),
            SourceTag::SecondaryB => self.vs_secondary_b = Some(result),
            SourceTag::Primary => {}
        }
    }
}

/// Externally exposed shape for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedResponse {
    pub id: String,
    pub canonical: CanonicalPropertyProfile,
    pub comparisons: Comparisons,
    pub sources_availability: PerSource<bool>,
    pub normalized: PerSource<Option<CanonicalPropertyProfile>>,
}
