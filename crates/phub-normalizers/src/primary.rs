//! Primary (reference) source. Payloads are either wrapped as
//! `[ {result: {data}} ]` / `{result: {data}}` / `{data}` or are the data
//! object itself. Facilities come from a grid of labelled cells.

use phub_core::{CanonicalPropertyProfile, GeoCoordinate, ImageItem, RoomTypeSummary, SourceTag};
use serde_json::Value as JsonValue;

use crate::keywords::{BREAKFAST, PET_LABEL, TRANSPORT};
use crate::paths::{
    first_numeric, first_object, first_string, json_array, json_id, json_numeric, json_str,
    json_string, NULL,
};
use crate::{apply_facility_facts, base_profile, first_image_list, with_fallback_images, SourceNormalizer};

const DATA_ROOTS: &[&[&str]] = &[&["0", "result", "data"], &["result", "data"], &["data"], &[]];
const COVER_PHOTO_TITLE: &str = "대표 이미지";

#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryNormalizer;

impl SourceNormalizer for PrimaryNormalizer {
    fn source_tag(&self) -> SourceTag {
        SourceTag::Primary
    }

    fn normalize(
        &self,
        raw: &JsonValue,
        fallback_images: Option<&[ImageItem]>,
    ) -> CanonicalPropertyProfile {
        let data = first_object(raw, DATA_ROOTS).unwrap_or(&NULL);

        let mut profile = base_profile(SourceTag::Primary, json_id(data, &["atf", "propertyId"]));
        profile.name = json_string(data, &["atf", "name"]);
        profile.address = first_string(
            data,
            &[
                &["locationSection", "address"],
                &["atf", "address"],
                &["atf", "sharedAddress"],
                &["locationSection", "sharedAddress"],
            ],
        );
        profile.description = first_string(
            data,
            &[
                &["gptReviewSummary", "highReviewSummary", "content"],
                &["atf", "subtitle"],
                &["atf", "locationDescription"],
            ],
        );
        let coordinate =
            first_object(data, &[&["locationSection", "coordinate"], &["atf", "coordinate"]]).unwrap_or(&NULL);
        profile.coordinates = GeoCoordinate::from_parts(
            json_numeric(coordinate, &["latitude"]),
            json_numeric(coordinate, &["longitude"]),
        );
        profile.rating = json_numeric(data, &["review", "score"]);
        profile.review_count = first_numeric(data, &[&["review", "reviewCount"], &["review", "count"]]);
        profile.star_rating_text = json_string(data, &["atf", "hotelStar"]);
        profile.star_rating = profile.star_rating_text.as_deref().and_then(star_digits);

        profile.images = with_fallback_images(images(data), fallback_images);
        profile.facilities = facilities(data);
        profile.room_types = room_types(data);

        let location_texts = location_texts(data);
        profile.nearby_transport = location_texts
            .iter()
            .filter(|t| TRANSPORT.is_match(t))
            .cloned()
            .collect();
        profile.nearby_attractions = location_texts;

        apply_detail_blocks(data, &mut profile);
        apply_facility_facts(&mut profile);
        profile
    }
}

fn star_digits(text: &str) -> Option<f64> {
    let digits = text.chars().filter(char::is_ascii_digit).collect::<String>();
    digits.parse().ok()
}

fn images(data: &JsonValue) -> Vec<ImageItem> {
    let mut images = Vec::new();
    if let Some(photo) = json_str(data, &["atf", "photo"]) {
        images.push(ImageItem::new(photo, Some(COVER_PHOTO_TITLE.to_string())));
    }
    images.extend(first_image_list(
        data,
        &[&["gallerySection", "images"], &["atf", "photos"]],
        |img| {
            let url = json_str(img, &["url"])?;
            Some(ImageItem::new(url, json_string(img, &["title"])))
        },
    ));
    images
}

fn cell_text(value: &JsonValue) -> Option<String> {
    let text = match value {
        JsonValue::String(s) => s.trim().to_string(),
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn facilities(data: &JsonValue) -> Vec<String> {
    json_array(data, &["facilitySection", "body"])
        .iter()
        .flat_map(|body| json_array(body, &["gridComponents"]))
        .filter_map(|grid| grid.get("text").and_then(cell_text))
        .collect()
}

fn room_types(data: &JsonValue) -> Vec<RoomTypeSummary> {
    json_array(data, &["roomSection", "rooms"])
        .iter()
        .map(|room| RoomTypeSummary {
            id: json_id(room, &["id"]),
            name: json_string(room, &["name"]),
            images: json_array(room, &["images"])
                .iter()
                .filter_map(|img| {
                    let url = json_str(img, &["url"]).or_else(|| json_str(img, &["image"]))?;
                    Some(ImageItem::new(url, json_string(img, &["title"])))
                })
                .collect(),
        })
        .collect()
}

fn location_texts(data: &JsonValue) -> Vec<String> {
    let mut texts = Vec::new();
    for body in json_array(data, &["locationSection", "body"]) {
        for component in json_array(body, &["plainTextComponents"]) {
            if let Some(text) = json_str(component, &["text"]).filter(|t| !t.is_empty()) {
                texts.push(text.to_string());
            }
        }
        for group in json_array(body, &["iconComponents"]) {
            for text in json_array(group, &["texts"]) {
                if let Some(text) = text.as_str().filter(|t| !t.is_empty()) {
                    texts.push(text.to_string());
                }
            }
        }
    }
    texts
}

/// Every titled detail block is a policy; pet and breakfast blocks are also
/// copied into their dedicated fields.
fn apply_detail_blocks(data: &JsonValue, profile: &mut CanonicalPropertyProfile) {
    for section in json_array(data, &["detailSection", "body"]) {
        let Some(title) = json_str(section, &["title"]).filter(|t| !t.is_empty()) else {
            continue;
        };
        let contents = json_array(section, &["plainTextComponents"])
            .iter()
            .filter_map(|p| json_str(p, &["text"]))
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if contents.is_empty() {
            continue;
        }
        if PET_LABEL.is_match(title) && profile.pet_policy.is_empty() {
            profile.pet_policy = contents.clone();
        }
        if BREAKFAST.is_match(title) && profile.breakfast_details.is_empty() {
            profile.breakfast_details = contents.clone();
        }
        profile.policies.insert(title.to_string(), contents);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> JsonValue {
        json!([{
            "result": {
                "data": {
                    "atf": {
                        "propertyId": 10042,
                        "name": "롯데호텔 서울",
                        "hotelStar": "5성급",
                        "photo": "https://img/cover.jpg",
                        "subtitle": "명동 중심"
                    },
                    "gallerySection": {"images": [
                        {"url": "https://img/1.jpg", "title": "로비"},
                        {"title": "no url"}
                    ]},
                    "locationSection": {
                        "address": "서울 중구 을지로 30",
                        "coordinate": {"latitude": "37.565", "longitude": 126.981},
                        "body": [{
                            "plainTextComponents": [{"text": "을지로입구역 도보 1분"}, {"text": "명동성당"}],
                            "iconComponents": [{"texts": ["공항 셔틀", ""]}]
                        }]
                    },
                    "facilitySection": {"body": [
                        {"gridComponents": [{"text": "주차장"}, {"text": " 피트니스 "}, {"text": ""}, {"text": "레스토랑"}]},
                        {"gridComponents": [{"text": "한국어"}, {"icon": "x"}]}
                    ]},
                    "review": {"score": 4.7, "reviewCount": "1203"},
                    "detailSection": {"body": [
                        {"title": "취소 및 환불 규정", "plainTextComponents": [{"text": "체크인 3일 전 무료 취소"}]},
                        {"title": "조식 안내", "plainTextComponents": [{"text": "07:00-10:00"}]},
                        {"title": "빈 블록", "plainTextComponents": []}
                    ]},
                    "roomSection": {"rooms": [
                        {"id": 7, "name": "디럭스", "images": [{"image": "https://img/r.jpg"}]}
                    ]}
                }
            }
        }])
    }

    #[test]
    fn extracts_wrapped_primary_payload() {
        let profile = PrimaryNormalizer.normalize(&sample(), None);
        assert_eq!(profile.id, "10042");
        assert_eq!(profile.source_ids.primary.as_deref(), Some("10042"));
        assert_eq!(profile.name.as_deref(), Some("롯데호텔 서울"));
        assert_eq!(profile.address.as_deref(), Some("서울 중구 을지로 30"));
        assert_eq!(profile.description.as_deref(), Some("명동 중심"));
        assert_eq!(profile.star_rating_text.as_deref(), Some("5성급"));
        assert_eq!(profile.star_rating, Some(5.0));
        assert_eq!(profile.rating, Some(4.7));
        assert_eq!(profile.review_count, Some(1203.0));
        let coords = profile.coordinates.unwrap();
        assert_eq!(coords.latitude, Some(37.565));
        assert_eq!(coords.longitude, Some(126.981));
    }

    #[test]
    fn cover_photo_precedes_gallery() {
        let profile = PrimaryNormalizer.normalize(&sample(), None);
        assert_eq!(
            profile.images,
            vec![
                ImageItem::new("https://img/cover.jpg", Some(COVER_PHOTO_TITLE.to_string())),
                ImageItem::new("https://img/1.jpg", Some("로비".to_string())),
            ]
        );
    }

    #[test]
    fn grid_cells_become_facilities_and_drive_facts() {
        let profile = PrimaryNormalizer.normalize(&sample(), None);
        assert_eq!(profile.facilities, vec!["주차장", "피트니스", "레스토랑", "한국어"]);
        assert_eq!(profile.parking_available, Some(true));
        assert_eq!(profile.languages, vec!["한국어"]);
        assert_eq!(profile.on_site_dining, vec!["레스토랑"]);
        assert_eq!(profile.breakfast_available, Some(true));
    }

    #[test]
    fn detail_blocks_become_policies() {
        let profile = PrimaryNormalizer.normalize(&sample(), None);
        assert_eq!(profile.policies.len(), 2);
        assert_eq!(profile.policies["취소 및 환불 규정"], vec!["체크인 3일 전 무료 취소"]);
        assert_eq!(profile.breakfast_details, vec!["07:00-10:00"]);
        assert!(profile.pet_policy.is_empty());
    }

    #[test]
    fn location_texts_feed_attractions_and_transport() {
        let profile = PrimaryNormalizer.normalize(&sample(), None);
        assert_eq!(profile.nearby_attractions, vec!["을지로입구역 도보 1분", "명동성당", "공항 셔틀"]);
        assert_eq!(profile.nearby_transport, vec!["을지로입구역 도보 1분", "공항 셔틀"]);
        assert_eq!(profile.room_types.len(), 1);
        assert_eq!(profile.room_types[0].id.as_deref(), Some("7"));
        assert_eq!(profile.room_types[0].images[0].url, "https://img/r.jpg");
    }

    #[test]
    fn bare_data_object_is_accepted() {
        let doc = json!({"data": {"atf": {"name": "Bare", "hotelStar": "no stars"}}});
        let profile = PrimaryNormalizer.normalize(&doc, None);
        assert_eq!(profile.name.as_deref(), Some("Bare"));
        assert_eq!(profile.star_rating, None);
        assert_eq!(profile.id, "");
        assert!(profile.source_ids.primary.is_none());
        assert!(profile.coordinates.is_none());
    }
}
