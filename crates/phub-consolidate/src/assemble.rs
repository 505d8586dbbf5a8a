use phub_core::{ComparisonResult, Comparisons, ConsolidatedResponse, PerSource, SourceTag};
use phub_match::ScoringEngine;

use crate::{HubError, SourceProfiles};

const SECONDARIES: [SourceTag; 2] = [SourceTag::SecondaryA, SourceTag::SecondaryB];

/// Primary-vs-secondary comparison for each secondary profile present.
pub fn compare_secondaries(engine: &ScoringEngine, profiles: &SourceProfiles) -> Vec<ComparisonResult> {
    let Some(primary) = profiles.primary.as_ref() else {
        return Vec::new();
    };
    SECONDARIES
        .into_iter()
        .filter_map(|tag| {
            let other = profiles.get(tag).as_ref()?;
            Some(engine.compare(primary, tag, other))
        })
        .collect()
}

/// Builds the external response. The canonical profile is the primary
/// profile anchored to `property_id`, carrying each present secondary's id.
pub fn assemble(
    property_id: &str,
    profiles: &SourceProfiles,
    comparisons: impl IntoIterator<Item = ComparisonResult>,
    availability: PerSource<bool>,
) -> Result<ConsolidatedResponse, HubError> {
    let Some(primary) = profiles.primary.as_ref() else {
        return Err(HubError::MissingPrimarySource(property_id.to_string()));
    };

    let mut canonical = primary.clone();
    canonical.anchor_to(property_id);
    for tag in SECONDARIES {
        if let Some(profile) = profiles.get(tag) {
            *canonical.source_ids.slot_mut(tag) = profile.source_ids.get(tag).map(ToString::to_string);
        }
    }

    let mut grouped = Comparisons::default();
    for comparison in comparisons {
        grouped.insert(comparison);
    }

    Ok(ConsolidatedResponse {
        id: property_id.to_string(),
        canonical,
        comparisons: grouped,
        sources_availability: availability,
        normalized: profiles.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use phub_core::{CanonicalPropertyProfile, SourceIds};

    fn profile(tag: SourceTag, native: &str, name: &str) -> CanonicalPropertyProfile {
        CanonicalPropertyProfile {
            id: native.into(),
            primary_id: native.into(),
            source_ids: SourceIds::only(tag, Some(native.into())),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn anchors_identity_and_collects_secondary_ids() {
        let profiles = PerSource {
            primary: Some(profile(SourceTag::Primary, "yan-1", "Lotte Hotel")),
            secondary_a: Some(profile(SourceTag::SecondaryA, "a-9", "Lotte Hotel Seoul")),
            secondary_b: None,
        };
        let engine = ScoringEngine::default();
        let comparisons = compare_secondaries(&engine, &profiles);
        assert_eq!(comparisons.len(), 1);

        let availability = PerSource {
            primary: true,
            secondary_a: true,
            secondary_b: false,
        };
        let response = assemble("1001", &profiles, comparisons, availability).expect("response");
        assert_eq!(response.id, "1001");
        assert_eq!(response.canonical.id, "1001");
        assert_eq!(response.canonical.primary_id, "1001");
        assert_eq!(response.canonical.source_ids.primary.as_deref(), Some("1001"));
        assert_eq!(response.canonical.source_ids.secondary_a.as_deref(), Some("a-9"));
        assert!(response.canonical.source_ids.secondary_b.is_none());
        assert!(response.comparisons.vs_secondary_a.is_some());
        assert!(response.comparisons.vs_secondary_b.is_none());
        assert_eq!(response.normalized.primary.as_ref().map(|p| p.id.as_str()), Some("yan-1"));
    }

    #[test]
    fn response_json_shape() {
        let profiles = PerSource {
            primary: Some(profile(SourceTag::Primary, "yan-1", "Hotel")),
            secondary_a: None,
            secondary_b: Some(profile(SourceTag::SecondaryB, "y-2", "Hotel")),
        };
        let comparisons = compare_secondaries(&ScoringEngine::default(), &profiles);
        let response = assemble("7", &profiles, comparisons, PerSource::default()).expect("response");
        let value = serde_json::to_value(&response).expect("json");
        assert_eq!(value["canonical"]["sourceIds"]["SecondaryB"], "y-2");
        assert_eq!(value["comparisons"]["vsSecondaryB"]["base"], "Primary");
        assert_eq!(value["comparisons"]["vsSecondaryB"]["target"], "SecondaryB");
        assert_eq!(value["comparisons"]["vsSecondaryB"]["scores"]["name"], 100);
        assert!(value["comparisons"].get("vsSecondaryA").is_none());
        assert_eq!(value["sourcesAvailability"]["Primary"], false);
        assert!(value["normalized"]["SecondaryA"].is_null());
    }

    #[test]
    fn missing_primary_is_rejected() {
        let profiles = PerSource {
            primary: None,
            secondary_a: Some(profile(SourceTag::SecondaryA, "a-1", "Hotel")),
            secondary_b: None,
        };
        assert!(compare_secondaries(&ScoringEngine::default(), &profiles).is_empty());
        let err = assemble("3", &profiles, Vec::new(), PerSource::default()).unwrap_err();
        assert!(matches!(err, HubError::MissingPrimarySource(id) if id == "3"));
    }
}
