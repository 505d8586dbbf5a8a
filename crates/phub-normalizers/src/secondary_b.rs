//! Secondary source B. Listings are page-props dumps whose free-text detail
//! blocks carry facilities, policies, breakfast notes and check-in times.

use phub_core::{CanonicalPropertyProfile, GeoCoordinate, ImageItem, RoomTypeSummary, SourceTag};
use serde_json::Value as JsonValue;

use crate::keywords::{
    check_in_out, tokenize, BASIC_INFO_LABEL, BREAKFAST, FACILITY_LABEL, PET_LABEL, POLICY_LABEL,
};
use crate::paths::{
    first_numeric, first_object, first_string, json_array, json_at, json_id, json_numeric, json_str,
    json_string, json_strings, NULL,
};
use crate::{apply_facility_facts, base_profile, first_image_list, with_fallback_images, SourceNormalizer};

const PAGE_ROOTS: &[&[&str]] = &[&["props", "pageProps"], &["pageProps"]];

#[derive(Debug, Clone, Copy, Default)]
pub struct SecondaryBNormalizer;

impl SourceNormalizer for SecondaryBNormalizer {
    fn source_tag(&self) -> SourceTag {
        SourceTag::SecondaryB
    }

    fn normalize(
        &self,
        raw: &JsonValue,
        fallback_images: Option<&[ImageItem]>,
    ) -> CanonicalPropertyProfile {
        let page = first_object(raw, PAGE_ROOTS).unwrap_or(raw);
        let info = json_at(page, &["accommodationInfo"]).unwrap_or(&NULL);
        let meta = json_at(info, &["meta"]).unwrap_or(&NULL);

        let native_id = json_id(meta, &["id"]).or_else(|| json_id(info, &["id"]));
        let mut profile = base_profile(SourceTag::SecondaryB, native_id);

        profile.name = json_string(meta, &["name"]);
        profile.address = json_string(info, &["address"]).or_else(|| json_string(meta, &["address"]));
        profile.description = json_string(page, &["manager", "comment"])
            .or_else(|| json_string(info, &["manager", "comment"]));
        profile.phone = json_string(info, &["tel"]);
        profile.rating = json_numeric(meta, &["review", "rate"]);
        profile.review_count = json_numeric(meta, &["review", "count"]);
        profile.star_rating_text = json_string(meta, &["grade"]);
        profile.property_type = json_id(meta, &["category"]);

        let location = first_object(info, &[&["location"]])
            .or_else(|| first_object(meta, &[&["location"]]))
            .unwrap_or(&NULL);
        profile.coordinates = GeoCoordinate::from_parts(
            first_numeric(location, &[&["latitude"], &["lat"]]),
            first_numeric(location, &[&["longitude"], &["lng"]]),
        );

        let traffic = json_strings(page, &["traffic", "contents"]);
        profile.nearby_transport = traffic.clone();
        profile.nearby_attractions = traffic;

        let own_images = first_image_list(meta, &[&["images"]], listing_image);
        let own_images = if own_images.is_empty() {
            first_image_list(info, &[&["newImages"]], listing_image)
        } else {
            own_images
        };
        profile.images = with_fallback_images(own_images, fallback_images);

        profile.room_types = room_types(page);
        apply_detail_blocks(page, &mut profile);
        apply_facility_facts(&mut profile);
        if profile.name.is_none() {
            profile.name = first_string(info, &[&["name"], &["title"]]);
        }
        profile
    }
}

fn listing_image(img: &JsonValue) -> Option<ImageItem> {
    let url = json_str(img, &["image"])?;
    Some(ImageItem::new(url, json_string(img, &["title"])))
}

fn room_types(page: &JsonValue) -> Vec<RoomTypeSummary> {
    json_array(page, &["rooms"])
        .iter()
        .map(|room| RoomTypeSummary {
            id: json_id(room, &["id"]),
            name: json_string(room, &["name"]),
            images: json_array(room, &["images"])
                .iter()
                .chain(json_array(room, &["newImages"]))
                .filter_map(|img| {
                    let url = json_str(img, &["image"]).or_else(|| json_str(img, &["url"]))?;
                    Some(ImageItem::new(url, None))
                })
                .collect(),
        })
        .collect()
}

/// Routes each `{title, contents}` block by its label. Earlier rules win:
/// basic info, then policy topics, then breakfast, then facilities.
fn apply_detail_blocks(page: &JsonValue, profile: &mut CanonicalPropertyProfile) {
    for block in json_array(page, &["details"]) {
        let Some(title) = json_str(block, &["title"]) else {
            continue;
        };
        let Some(contents) = json_at(block, &["contents"]).and_then(JsonValue::as_array) else {
            continue;
        };
        let contents = contents
            .iter()
            .filter_map(JsonValue::as_str)
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        if BASIC_INFO_LABEL.is_match(title) {
            for line in &contents {
                if let Some((check_in, check_out)) = check_in_out(line) {
                    profile.check_in_time = Some(check_in);
                    profile.check_out_time = Some(check_out);
                }
                profile.facilities.extend(tokenize(line));
            }
        } else if POLICY_LABEL.is_match(title) {
            if PET_LABEL.is_match(title) {
                profile.pet_policy = contents.clone();
            }
            profile.policies.insert(title.to_string(), contents);
        } else if BREAKFAST.is_match(title) {
            profile.breakfast_details = contents;
        } else if FACILITY_LABEL.is_match(title) {
            for line in &contents {
                profile.facilities.extend(tokenize(line));
            }
        }
    }
}
