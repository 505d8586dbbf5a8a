//! Similarity primitives and the cross-source scoring engine.
//!
//! Every text comparison runs both operands through [`normalize_text`] first:
//! NFKC, whitespace runs collapsed to one space, trimmed, lowercased. Scores
//! are integer percentages in `0..=100`.

use std::collections::HashSet;

use phub_core::{CanonicalPropertyProfile, ComparisonResult, FieldMatchBreakdown, ImageItem, SourceTag};
use serde::{Deserialize, Serialize};
use strsim::levenshtein;
use unicode_normalization::UnicodeNormalization;

pub const CRATE_NAME: &str = "phub-match";

pub fn normalize_text(input: &str) -> String {
    let folded = input.nfkc().collect::<String>();
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Edit distance between the normalized forms of `a` and `b`, counted in chars.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a = normalize_text(a);
    let b = normalize_text(b);
    // strsim keeps one row sized by its second argument.
    if a.chars().count() < b.chars().count() {
        levenshtein(&b, &a)
    } else {
        levenshtein(&a, &b)
    }
}

fn percent(numerator: usize, denominator: usize) -> u8 {
    let ratio = numerator as f64 / denominator as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn string_similarity(a: &str, b: &str) -> u8 {
    let a_norm = normalize_text(a);
    let b_norm = normalize_text(b);
    match (a_norm.is_empty(), b_norm.is_empty()) {
        (true, true) => return 100,
        (true, false) | (false, true) => return 0,
        (false, false) => {}
    }
    let max_len = a_norm.chars().count().max(b_norm.chars().count());
    let distance = edit_distance(&a_norm, &b_norm);
    percent(max_len.saturating_sub(distance), max_len)
}

/// Jaccard overlap of the normalized, deduplicated members.
pub fn set_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> u8 {
    let a_set = a.iter().map(|s| normalize_text(s.as_ref())).collect::<HashSet<_>>();
    let b_set = b.iter().map(|s| normalize_text(s.as_ref())).collect::<HashSet<_>>();
    let union = a_set.union(&b_set).count();
    if union == 0 {
        return 100;
    }
    let intersection = a_set.intersection(&b_set).count();
    percent(intersection, union)
}

/// Compares image sets by title only; untitled images are ignored.
pub fn image_title_similarity(a: &[ImageItem], b: &[ImageItem]) -> u8 {
    let titles = |images: &[ImageItem]| {
        images
            .iter()
            .filter_map(|img| img.title.as_deref())
            .filter(|t| !t.is_empty())
            .map(normalize_text)
            .collect::<Vec<_>>()
    };
    let a_titles = titles(a);
    let b_titles = titles(b);
    match (a_titles.is_empty(), b_titles.is_empty()) {
        (true, true) => 100,
        (true, false) | (false, true) => 0,
        (false, false) => set_similarity(&a_titles, &b_titles),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub name: f64,
    pub address: f64,
    pub facilities: f64,
    pub images: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            name: 0.35,
            address: 0.35,
            facilities: 0.20,
            images: 0.10,
        }
    }
}

impl ScoreWeights {
    /// Weighted sum rounded half away from zero.
    pub fn overall(&self, name: u8, address: u8, facilities: u8, images: u8) -> u8 {
        let total = f64::from(name) * self.name
            + f64::from(address) * self.address
            + f64::from(facilities) * self.facilities
            + f64::from(images) * self.images;
        total.round().clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn score(
        &self,
        primary: &CanonicalPropertyProfile,
        other: &CanonicalPropertyProfile,
    ) -> FieldMatchBreakdown {
        let name = string_similarity(
            primary.name.as_deref().unwrap_or_default(),
            other.name.as_deref().unwrap_or_default(),
        );
        let address = string_similarity(
            primary.address.as_deref().unwrap_or_default(),
            other.address.as_deref().unwrap_or_default(),
        );
        let images = image_title_similarity(&primary.images, &other.images);
        let facilities = set_similarity(&primary.facilities, &other.facilities);
        FieldMatchBreakdown {
            name,
            address,
            images,
            facilities,
            overall: self.weights.overall(name, address, facilities, images),
        }
    }

    pub fn compare(
        &self,
        primary: &CanonicalPropertyProfile,
        target: SourceTag,
        other: &CanonicalPropertyProfile,
    ) -> ComparisonResult {
        ComparisonResult {
            base: SourceTag::Primary,
            target,
            scores: self.score(primary, other),
        }
    }
}
