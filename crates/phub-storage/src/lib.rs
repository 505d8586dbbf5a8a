//! On-disk listing dataset: one directory per property, one sub-directory per
//! source, JSON snapshots inside.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use phub_core::{PerSource, SourceTag};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, warn};

pub use config::{
    resolve_data_root, HubConfig, SourceLayout, DATA_ROOT_CANDIDATES, DEFAULT_PORT,
    DEFAULT_SOURCES_FILE,
};

pub const CRATE_NAME: &str = "phub-storage";

/// Raw bytes of one source snapshot, as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub tag: SourceTag,
    pub origin: PathBuf,
    pub bytes: Vec<u8>,
    pub sha256: String,
}

impl RawDocument {
    pub fn new(tag: SourceTag, origin: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let sha256 = sha256_hex(&bytes);
        Self {
            tag,
            origin: origin.into(),
            bytes,
            sha256,
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDocuments {
    pub property_id: String,
    pub documents: PerSource<Option<RawDocument>>,
}

impl PropertyDocuments {
    pub fn empty(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            documents: PerSource::default(),
        }
    }

    pub fn with(mut self, document: RawDocument) -> Self {
        let tag = document.tag;
        *self.documents.get_mut(tag) = Some(document);
        self
    }

    pub fn get(&self, tag: SourceTag) -> Option<&RawDocument> {
        self.documents.get(tag).as_ref()
    }

    pub fn availability(&self) -> PerSource<bool> {
        self.documents.each_ref().map(|_, doc| doc.is_some())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_property_ids(&self) -> anyhow::Result<Vec<String>>;

    /// `Ok(None)` when no property carries `property_id`.
    async fn load(&self, property_id: &str) -> anyhow::Result<Option<PropertyDocuments>>;
}

/// Property id encoded in a directory name: the segment after the last `_`.
pub fn property_id_from_dir_name(name: &str) -> Option<&str> {
    name.rsplit('_').next().filter(|id| !id.is_empty())
}

#[derive(Debug, Clone)]
pub struct DatasetDirectory {
    root: PathBuf,
    layout: SourceLayout,
}

impl DatasetDirectory {
    pub fn new(root: impl Into<PathBuf>, layout: SourceLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub async fn from_config(config: &HubConfig) -> anyhow::Result<Self> {
        let layout = SourceLayout::load(&config.sources_file).await?;
        Ok(Self::new(config.data_root.clone(), layout))
    }

    /// `(property_id, directory)` pairs sorted by directory name.
    async fn property_dirs(&self) -> anyhow::Result<Vec<(String, PathBuf)>> {
        if !fs::try_exists(&self.root)
            .await
            .with_context(|| format!("checking dataset root {}", self.root.display()))?
        {
            warn!(root = %self.root.display(), "dataset root does not exist");
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.root)
            .await
            .with_context(|| format!("reading dataset root {}", self.root.display()))?;
        let mut dirs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("listing dataset root {}", self.root.display()))?
        {
            let file_type = entry
                .file_type()
                .await
                .with_context(|| format!("inspecting {}", entry.path().display()))?;
            if !file_type.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(id) = property_id_from_dir_name(&name) {
                dirs.push((name.clone(), id.to_string(), entry.path()));
            }
        }
        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(dirs.into_iter().map(|(_, id, path)| (id, path)).collect())
    }

    /// Lexicographically last `*.json` file in `dir`.
    async fn latest_json(dir: &Path) -> anyhow::Result<Option<PathBuf>> {
        if !fs::try_exists(dir)
            .await
            .with_context(|| format!("checking {}", dir.display()))?
        {
            return Ok(None);
        }
        let mut entries = fs::read_dir(dir)
            .await
            .with_context(|| format!("reading {}", dir.display()))?;
        let mut latest: Option<PathBuf> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("listing {}", dir.display()))?
        {
            let path = entry.path();
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if !is_json {
                continue;
            }
            let file_type = entry
                .file_type()
                .await
                .with_context(|| format!("inspecting {}", path.display()))?;
            if !file_type.is_file() {
                continue;
            }
            if latest.as_ref().map_or(true, |current| path.file_name() > current.file_name()) {
                latest = Some(path);
            }
        }
        Ok(latest)
    }
}

#[async_trait]
impl DocumentStore for DatasetDirectory {
    async fn list_property_ids(&self) -> anyhow::Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .property_dirs()
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids.dedup();
        info!(root = %self.root.display(), count = ids.len(), "discovered properties");
        Ok(ids)
    }

    async fn load(&self, property_id: &str) -> anyhow::Result<Option<PropertyDocuments>> {
        let Some((_, dir)) = self
            .property_dirs()
            .await?
            .into_iter()
            .find(|(id, _)| id == property_id)
        else {
            return Ok(None);
        };

        let mut documents = PropertyDocuments::empty(property_id);
        for tag in SourceTag::ALL {
            let source_dir = dir.join(self.layout.directory(tag));
            let Some(path) = Self::latest_json(&source_dir).await? else {
                continue;
            };
            let bytes = fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            documents = documents.with(RawDocument::new(tag, path, bytes));
        }
        debug!(
            property_id,
            dir = %dir.display(),
            sources = ?documents.availability(),
            "loaded property documents"
        );
        Ok(Some(documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn write(path: PathBuf, contents: &str) {
        fs::create_dir_all(path.parent().expect("parent"))
            .await
            .expect("mkdir");
        fs::write(path, contents).await.expect("write");
    }

    #[test]
    fn document_hashing_is_stable() {
        assert_eq!(
            sha256_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn id_is_segment_after_last_underscore() {
        assert_eq!(property_id_from_dir_name("롯데호텔_서울_1001"), Some("1001"));
        assert_eq!(property_id_from_dir_name("2002"), Some("2002"));
        assert_eq!(property_id_from_dir_name("broken_"), None);
    }

    #[tokio::test]
    async fn lists_sorted_unique_ids() {
        let dir = tempdir().expect("tempdir");
        for name in ["b_hotel_20", "a_hotel_10", "copy_10"] {
            fs::create_dir_all(dir.path().join(name)).await.expect("mkdir");
        }
        write(dir.path().join("notes.txt"), "ignored").await;

        let store = DatasetDirectory::new(dir.path(), SourceLayout::default());
        let ids = store.list_property_ids().await.expect("ids");
        assert_eq!(ids, vec!["10", "20"]);
    }

    #[tokio::test]
    async fn missing_root_lists_nothing() {
        let dir = tempdir().expect("tempdir");
        let store = DatasetDirectory::new(dir.path().join("absent"), SourceLayout::default());
        assert!(store.list_property_ids().await.expect("ids").is_empty());
        assert!(store.load("1").await.expect("load").is_none());
    }

    #[tokio::test]
    async fn loads_latest_snapshot_per_source() {
        let dir = tempdir().expect("tempdir");
        let property = dir.path().join("hotel_77");
        write(property.join("Yanolja/2024-01-01.json"), r#"{"old":true}"#).await;
        write(property.join("Yanolja/2024-02-01.JSON"), r#"{"new":true}"#).await;
        write(property.join("Yanolja/readme.md"), "skip").await;
        write(property.join("Y/snapshot.json"), "{}").await;
        fs::create_dir_all(property.join("A")).await.expect("mkdir");

        let store = DatasetDirectory::new(dir.path(), SourceLayout::default());
        let docs = store.load("77").await.expect("load").expect("known id");

        let primary = docs.get(SourceTag::Primary).expect("primary");
        assert_eq!(primary.bytes, br#"{"new":true}"#);
        assert!(primary.origin.ends_with("Yanolja/2024-02-01.JSON"));
        assert_eq!(primary.sha256, sha256_hex(br#"{"new":true}"#));
        assert!(docs.get(SourceTag::SecondaryA).is_none());
        assert!(docs.get(SourceTag::SecondaryB).is_some());
        assert_eq!(
            docs.availability(),
            PerSource {
                primary: true,
                secondary_a: false,
                secondary_b: true
            }
        );
    }

    #[tokio::test]
    async fn unknown_id_is_none_but_empty_property_is_some() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("empty_5")).await.expect("mkdir");
        let store = DatasetDirectory::new(dir.path(), SourceLayout::default());

        assert!(store.load("6").await.expect("load").is_none());
        let docs = store.load("5").await.expect("load").expect("known id");
        assert_eq!(docs.availability(), PerSource::default());
    }

    #[tokio::test]
    async fn from_config_applies_layout_file() {
        let dir = tempdir().expect("tempdir");
        let sources = dir.path().join("sources.yaml");
        write(
            sources.clone(),
            "directories:\n  Primary: main\n  SecondaryA: a\n  SecondaryB: b\n",
        )
        .await;
        write(dir.path().join("data/x_1/main/p.json"), "{}").await;

        let config = HubConfig {
            data_root: dir.path().join("data"),
            port: DEFAULT_PORT,
            sources_file: sources,
        };
        let store = DatasetDirectory::from_config(&config).await.expect("store");
        let docs = store.load("1").await.expect("load").expect("known id");
        assert!(docs.get(SourceTag::Primary).is_some());
    }
}
