//! Secondary source A. Hotel payloads are large and loosely nested; the hotel
//! object is probed at several depths and falls back to the document root.

use phub_core::{CanonicalPropertyProfile, GeoCoordinate, ImageItem, SourceTag};
use scraper::Html;
use serde_json::Value as JsonValue;

use crate::keywords::{tokenize, FACILITY_LABEL};
use crate::paths::{first_object, json_array, json_id, json_numeric, json_str, json_string};
use crate::{apply_facility_facts, base_profile, first_image_list, with_fallback_images, SourceNormalizer};

const HOTEL_ROOTS: &[&[&str]] = &[&["hotel"], &["data", "hotel"], &["props", "pageProps", "hotel"]];

#[derive(Debug, Clone, Copy, Default)]
pub struct SecondaryANormalizer;

impl SourceNormalizer for SecondaryANormalizer {
    fn source_tag(&self) -> SourceTag {
        SourceTag::SecondaryA
    }

    fn normalize(
        &self,
        raw: &JsonValue,
        fallback_images: Option<&[ImageItem]>,
    ) -> CanonicalPropertyProfile {
        let hotel = first_object(raw, HOTEL_ROOTS).unwrap_or(raw);

        let native_id = json_id(hotel, &["id"]).or_else(|| json_id(hotel, &["hotelId"]));
        let mut profile = base_profile(SourceTag::SecondaryA, native_id);

        profile.name = json_string(hotel, &["displayName"])
            .or_else(|| json_string(hotel, &["name"]))
            .or_else(|| json_string(raw, &["hotelInfo", "name"]));
        profile.address = json_string(hotel, &["address", "full"])
            .or_else(|| json_string(hotel, &["address"]))
            .or_else(|| json_string(raw, &["propertyInfo", "address", "fullAddress"]))
            .or_else(|| json_string(raw, &["hotelInfo", "address", "full"]));
        profile.description = json_str(hotel, &["summary"])
            .or_else(|| json_str(hotel, &["description"]))
            .or_else(|| json_str(raw, &["hotelDescription"]))
            .or_else(|| json_str(raw, &["aboutHotel", "hotelDesc", "overview"]))
            .map(html_to_text);
        profile.phone = json_string(hotel, &["contact", "phone"]).or_else(|| json_string(hotel, &["phone"]));

        let latitude = json_numeric(hotel, &["location", "latitude"])
            .or_else(|| json_numeric(hotel, &["geo", "lat"]))
            .or_else(|| json_numeric(raw, &["map", "latitude"]));
        let longitude = json_numeric(hotel, &["location", "longitude"])
            .or_else(|| json_numeric(hotel, &["geo", "lng"]))
            .or_else(|| json_numeric(raw, &["map", "longitude"]));
        profile.coordinates = GeoCoordinate::from_parts(latitude, longitude);

        let own_images = first_image_list(hotel, &[&["images"]], |img| {
            let url = json_str(img, &["url"])?;
            let title = json_string(img, &["caption"]).or_else(|| json_string(img, &["title"]));
            Some(ImageItem::new(url, title))
        });
        let own_images = if own_images.is_empty() {
            first_image_list(hotel, &[&["gallery"]], |img| {
                let url = json_str(img, &["url"])?;
                Some(ImageItem::new(url, json_string(img, &["title"])))
            })
        } else {
            own_images
        };
        profile.images = with_fallback_images(own_images, fallback_images);

        profile.facilities = facilities(hotel, raw);
        apply_facility_facts(&mut profile);
        profile
    }
}

/// Descriptions sometimes arrive as HTML fragments.
fn html_to_text(text: &str) -> String {
    if !text.contains('<') {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(text);
    let joined = fragment.root_element().text().collect::<String>();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn amenity_name(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        _ => json_string(value, &["name"]).or_else(|| json_string(value, &["title"])),
    }
}

/// First non-empty amenity array, else facility-labelled detail blocks.
fn facilities(hotel: &JsonValue, raw: &JsonValue) -> Vec<String> {
    let amenity_candidates = [
        json_array(hotel, &["facilities"]),
        json_array(hotel, &["amenities"]),
        json_array(raw, &["amenities"]),
    ];
    for candidate in amenity_candidates {
        let names = candidate.iter().filter_map(amenity_name).collect::<Vec<_>>();
        if !names.is_empty() {
            return names;
        }
    }

    let details = if json_array(hotel, &["details"]).is_empty() {
        json_array(raw, &["details"])
    } else {
        json_array(hotel, &["details"])
    };
    details
        .iter()
        .filter(|block| json_str(block, &["title"]).is_some_and(|t| FACILITY_LABEL.is_match(t)))
        .flat_map(|block| json_array(block, &["contents"]))
        .filter_map(JsonValue::as_str)
        .flat_map(|text| tokenize(text).collect::<Vec<_>>())
        .collect()
}
