use std::path::PathBuf;
use std::sync::Arc;

use phub_core::SourceTag;
use thiserror::Error;

/// Cloneable so one failed build can be reported to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum HubError {
    #[error("property {0} not found")]
    NotFound(String),
    #[error("Missing primary source")]
    MissingPrimarySource(String),
    #[error("malformed {tag} document for property {id}: {}", origin.display())]
    MalformedInput {
        id: String,
        tag: SourceTag,
        origin: PathBuf,
        #[source]
        error: Arc<serde_json::Error>,
    },
    #[error("{0:#}")]
    Storage(Arc<anyhow::Error>),
}

impl From<anyhow::Error> for HubError {
    fn from(err: anyhow::Error) -> Self {
        HubError::Storage(Arc::new(err))
    }
}

impl HubError {
    pub fn property_id(&self) -> Option<&str> {
        match self {
            HubError::NotFound(id) | HubError::MissingPrimarySource(id) => Some(id),
            HubError::MalformedInput { id, .. } => Some(id),
            HubError::Storage(_) => None,
        }
    }
}
