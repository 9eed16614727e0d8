use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use crate::fs::operations::{read_locked, remove_locked, write_atomically};

use super::{
    check_key,
    envelope::{StoredDocument, LEGACY_VERSION},
    TrackerStorage,
};

const EXTENSION: &str = "jsonl";

/// First line of every collection file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionHeader {
    store: String,
    version: u32,
}

/// Structured engine. Every named store is a JSON Lines file: a header followed by one record per
/// line. A damaged line only loses that record.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    dir: PathBuf,
}

impl CollectionStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    fn path_for(&self, store: &str) -> Result<PathBuf> {
        check_key(store)?;
        Ok(self.dir.join(format!("{store}.{EXTENSION}")))
    }
}

/// Splits the content of a collection file into its version and records.
fn parse_collection(store: &str, content: &str) -> StoredDocument {
    let mut lines = content.lines().filter(|v| !v.trim().is_empty()).peekable();

    let version = match lines
        .peek()
        .and_then(|v| serde_json::from_str::<CollectionHeader>(v).ok())
    {
        Some(header) => {
            lines.next();
            if header.store != store {
                warn!("Collection {store} carries header of {}", header.store);
            }
            header.version
        }
        None => {
            warn!("Collection {store} has no header, treating it as legacy");
            LEGACY_VERSION
        }
    };

    let mut items = vec![];
    for line in lines {
        match serde_json::from_str::<Value>(line) {
            Ok(v) => items.push(v),
            Err(e) => {
                // ignore illegal values. Might happen after an interrupted manual edit
                warn!("During parsing of collection {store} found illegal json string {line}: {e}")
            }
        }
    }

    StoredDocument { version, items }
}

fn render_collection(store: &str, document: &StoredDocument) -> Result<Vec<u8>> {
    let mut buffer = Vec::<u8>::new();
    serde_json::to_writer(
        &mut buffer,
        &CollectionHeader {
            store: store.to_owned(),
            version: document.version,
        },
    )?;
    buffer.push(b'\n');
    for item in &document.items {
        serde_json::to_writer(&mut buffer, item)?;
        buffer.push(b'\n');
    }
    Ok(buffer)
}

impl TrackerStorage for CollectionStore {
    async fn load(&self, key: &str) -> Result<Option<StoredDocument>> {
        let path = self.path_for(key)?;
        debug!("Loading collection {path:?}");
        let content = read_locked(&path).await?;
        Ok(content.map(|v| parse_collection(key, &v)))
    }

    async fn save(&self, key: &str, document: &StoredDocument) -> Result<()> {
        let path = self.path_for(key)?;
        let buffer = render_collection(key, document)?;
        debug!("Saving {} records into {path:?}", document.items.len());
        write_atomically(&path, &buffer).await?;
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
