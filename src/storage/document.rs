use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

use crate::fs::operations::{read_locked, remove_locked, write_atomically};

use super::{check_key, envelope::StoredDocument, TrackerStorage};

const EXTENSION: &str = "json";

/// Key-value engine. Every key is a single pretty-printed JSON document inside `dir`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.{EXTENSION}")))
    }
}

impl TrackerStorage for DocumentStore {
    async fn load(&self, key: &str) -> Result<Option<StoredDocument>> {
        let path = self.path_for(key)?;
        debug!("Loading {path:?}");
        let Some(content) = read_locked(&path).await? else {
            return Ok(None);
        };
        let document = StoredDocument::parse(&content)
            .with_context(|| format!("Document {path:?} is corrupted"))?;
        Ok(Some(document))
    }

    async fn save(&self, key: &str, document: &StoredDocument) -> Result<()> {
        let path = self.path_for(key)?;
        let content = serde_json::to_vec_pretty(document)?;
        debug!("Saving {} items into {path:?}", document.items.len());
        write_atomically(&path, &content).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        remove_locked(&path).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = vec![];
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|v| v == EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|v| v.to_str()) {
                    keys.push(stem.to_owned());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
