use std::{fmt::Display, path::Path};

use anyhow::Result;
use clap::ValueEnum;

use super::{
    collection::CollectionStore, document::DocumentStore, envelope::StoredDocument, TrackerStorage,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// One JSON document per tracker.
    #[default]
    Document,
    /// One JSON Lines collection per tracker.
    Collection,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Document => write!(f, "document"),
            BackendKind::Collection => write!(f, "collection"),
        }
    }
}

/// Engine selected at startup. Both engines live in their own subdirectory of the application
/// directory so switching between them never mixes files.
#[derive(Debug, Clone)]
pub enum Backend {
    Document(DocumentStore),
    Collection(CollectionStore),
}

impl Backend {
    pub fn open(kind: BackendKind, app_dir: &Path) -> Result<Self> {
        Ok(match kind {
            BackendKind::Document => Backend::Document(DocumentStore::new(app_dir.join("documents"))?),
            BackendKind::Collection => {
                Backend::Collection(CollectionStore::new(app_dir.join("collections"))?)
            }
        })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Document(_) => BackendKind::Document,
            Backend::Collection(_) => BackendKind::Collection,
        }
    }
}

impl TrackerStorage for Backend {
    async fn load(&self, key: &str) -> Result<Option<StoredDocument>> {
        match self {
            Backend::Document(store) => store.load(key).await,
            Backend::Collection(store) => store.load(key).await,
        }
    }

    async fn save(&self, key: &str, document: &StoredDocument) -> Result<()> {
        match self {
            Backend::Document(store) => store.save(key, document).await,
            Backend::Collection(store) => store.save(key, document).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match self {
            Backend::Document(store) => store.remove(key).await,
            Backend::Collection(store) => store.remove(key).await,
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        match self {
            Backend::Document(store) => store.keys().await,
            Backend::Collection(store) => store.keys().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::storage::{envelope::StoredDocument, TrackerStorage};

    use super::{Backend, BackendKind};

    #[tokio::test]
    async fn test_backends_are_isolated() -> Result<()> {
        let dir = tempdir()?;
        let document = Backend::open(BackendKind::Document, dir.path())?;
        let collection = Backend::open(BackendKind::Collection, dir.path())?;
        assert_eq!(collection.kind(), BackendKind::Collection);

        document
            .save("todos", &StoredDocument::new(vec![json!({"id": 1})]))
            .await?;

        assert!(document.load("todos").await?.is_some());
        assert_eq!(collection.load("todos").await?, None);
        assert!(dir.path().join("documents").join("todos.json").exists());
        Ok(())
    }
}
