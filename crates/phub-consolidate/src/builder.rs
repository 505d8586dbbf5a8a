//! Per-property profile cache. The first successful build for an id is kept
//! for the lifetime of the builder. Concurrent requests share one build and
//! its outcome, failures included; a failed build is dropped once reported so
//! the next request starts afresh.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use phub_core::{CanonicalPropertyProfile, PerSource, SourceTag};
use phub_normalizers::normalizer_for_source;
use phub_storage::{DocumentStore, PropertyDocuments, RawDocument};
use serde_json::Value as JsonValue;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::HubError;

/// Normalized profile per source slot; `None` where the document is absent.
pub type SourceProfiles = PerSource<Option<CanonicalPropertyProfile>>;

type BuildOutcome = Result<Arc<SourceProfiles>, HubError>;
type BuildSlot = Arc<OnceCell<BuildOutcome>>;

pub struct ProfileBuilder {
    store: Arc<dyn DocumentStore>,
    cache: Mutex<HashMap<String, BuildSlot>>,
    builds: AtomicUsize,
}

impl ProfileBuilder {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    pub async fn build(&self, property_id: &str) -> BuildOutcome {
        let slot = {
            let mut cache = self.cache.lock().await;
            cache.entry(property_id.to_string()).or_default().clone()
        };
        if slot.initialized() {
            debug!(property_id, "profile cache hit");
        }

        let outcome = slot
            .get_or_init(|| self.build_uncached(property_id))
            .await
            .clone();
        if outcome.is_err() {
            let mut cache = self.cache.lock().await;
            if cache
                .get(property_id)
                .is_some_and(|current| Arc::ptr_eq(current, &slot))
            {
                cache.remove(property_id);
            }
        }
        outcome
    }

    /// Like [`ProfileBuilder::build`], but the primary profile must be present.
    pub async fn usable(&self, property_id: &str) -> Result<Arc<SourceProfiles>, HubError> {
        let profiles = self.build(property_id).await?;
        if profiles.primary.is_none() {
            return Err(HubError::MissingPrimarySource(property_id.to_string()));
        }
        Ok(profiles)
    }

    pub async fn clear(&self) {
        self.cache.lock().await.clear();
    }

    /// Completed normalization passes since construction.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    async fn build_uncached(&self, property_id: &str) -> BuildOutcome {
        let started = Instant::now();
        let documents = self
            .store
            .load(property_id)
            .await?
            .ok_or_else(|| HubError::NotFound(property_id.to_string()))?;
        let profiles = normalize_documents(&documents)?;
        self.builds.fetch_add(1, Ordering::SeqCst);
        info!(
            property_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            fingerprints = ?fingerprints(&documents),
            "built source profiles"
        );
        Ok(Arc::new(profiles))
    }
}

pub(crate) fn parse_document(property_id: &str, document: &RawDocument) -> Result<JsonValue, HubError> {
    serde_json::from_slice(&document.bytes).map_err(|error| HubError::MalformedInput {
        id: property_id.to_string(),
        tag: document.tag,
        origin: document.origin.clone(),
        error: Arc::new(error),
    })
}

/// Every present document is parsed before any is normalized, so one
/// malformed file fails the whole build.
pub fn normalize_documents(documents: &PropertyDocuments) -> Result<SourceProfiles, HubError> {
    let mut parsed: PerSource<Option<JsonValue>> = PerSource::default();
    for tag in SourceTag::ALL {
        if let Some(document) = documents.get(tag) {
            *parsed.get_mut(tag) = Some(parse_document(&documents.property_id, document)?);
        }
    }

    let primary = parsed
        .primary
        .as_ref()
        .map(|raw| normalizer_for_source(SourceTag::Primary).normalize(raw, None));
    let fallback = primary.as_ref().map(|profile| profile.images.as_slice());
    let secondary = |tag: SourceTag| {
        parsed
            .get(tag)
            .as_ref()
            .map(|raw| normalizer_for_source(tag).normalize(raw, fallback))
    };
    let secondary_a = secondary(SourceTag::SecondaryA);
    let secondary_b = secondary(SourceTag::SecondaryB);
    Ok(PerSource {
        primary,
        secondary_a,
        secondary_b,
    })
}

fn fingerprints(documents: &PropertyDocuments) -> Vec<String> {
    SourceTag::ALL
        .into_iter()
        .filter_map(|tag| documents.get(tag))
        .map(|doc| format!("{}:{}", doc.tag, &doc.sha256[..doc.sha256.len().min(12)]))
        .collect()
}
