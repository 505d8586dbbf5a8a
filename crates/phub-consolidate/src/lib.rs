//! Query surface over a listing dataset: build per-source profiles once per
//! property, score secondaries against the primary and assemble the response.

mod assemble;
mod builder;
mod error;

use std::sync::Arc;

use phub_core::{ConsolidatedResponse, PerSource, SourceTag};
use phub_match::ScoringEngine;
use phub_storage::DocumentStore;
use serde_json::Value as JsonValue;
use tracing::warn;

pub use assemble::{assemble, compare_secondaries};
pub use builder::{normalize_documents, ProfileBuilder, SourceProfiles};
pub use error::HubError;

pub const CRATE_NAME: &str = "phub-consolidate";

pub struct PropertyHub {
    store: Arc<dyn DocumentStore>,
    builder: ProfileBuilder,
    engine: ScoringEngine,
}

impl PropertyHub {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_engine(store, ScoringEngine::default())
    }

    pub fn with_engine(store: Arc<dyn DocumentStore>, engine: ScoringEngine) -> Self {
        Self {
            builder: ProfileBuilder::new(store.clone()),
            store,
            engine,
        }
    }

    pub fn builder(&self) -> &ProfileBuilder {
        &self.builder
    }

    pub async fn property_ids(&self) -> Result<Vec<String>, HubError> {
        Ok(self.store.list_property_ids().await?)
    }

    pub async fn consolidated(&self, property_id: &str) -> Result<ConsolidatedResponse, HubError> {
        let profiles = self.builder.usable(property_id).await?;
        let comparisons = compare_secondaries(&self.engine, &profiles);
        let availability = profiles.each_ref().map(|_, profile| profile.is_some());
        assemble(property_id, &profiles, comparisons, availability)
    }

    /// Parsed source documents, `None` for absent slots. Never cached.
    pub async fn raw(&self, property_id: &str) -> Result<PerSource<Option<JsonValue>>, HubError> {
        let documents = self
            .store
            .load(property_id)
            .await?
            .ok_or_else(|| HubError::NotFound(property_id.to_string()))?;
        let mut parsed = PerSource::default();
        for tag in SourceTag::ALL {
            if let Some(document) = documents.get(tag) {
                let value = builder::parse_document(property_id, document).inspect_err(|err| {
                    warn!(property_id, error = %err, "raw document did not parse");
                })?;
                *parsed.get_mut(tag) = Some(value);
            }
        }
        Ok(parsed)
    }
}
