use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::{
    envelope::{StoredDocument, CURRENT_VERSION},
    TrackerStorage,
};

/// In-memory list that mirrors itself into a [TrackerStorage] after every mutation.
///
/// Loading never fails because of bad data: a corrupted document yields an empty list and single
/// records that can't be decoded are skipped. Storage failures on the other hand are returned to the
/// caller, who decides how to notify the user.
pub struct Synced<R, S> {
    storage: S,
    key: String,
    items: Vec<R>,
}

impl<R, S> Synced<R, S>
where
    R: Serialize + DeserializeOwned + Clone,
    S: TrackerStorage,
{
    #[instrument(skip(storage))]
    pub async fn load(storage: S, key: &str) -> Result<Self> {
        let mut synced = Self {
            storage,
            key: key.to_owned(),
            items: vec![],
        };
        synced.reload().await?;
        Ok(synced)
    }

    /// Reads the stored list again, discarding in-memory state.
    pub async fn reload(&mut self) -> Result<()> {
        let document = match self.storage.load(&self.key).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!("Nothing stored under {}, starting empty", self.key);
                self.items = vec![];
                return Ok(());
            }
            Err(e) if e.downcast_ref::<std::io::Error>().is_some() => return Err(e),
            Err(e) => {
                error!("Stored data for {} is unreadable, starting empty {e:?}", self.key);
                self.items = vec![];
                return Ok(());
            }
        };

        if document.version > CURRENT_VERSION {
            warn!(
                "{} was written by a newer version ({} > {CURRENT_VERSION}), reading anyway",
                self.key, document.version
            );
        }
        let upgrade = document.is_legacy();

        self.items = decode_items(&self.key, document.items);

        if upgrade {
            info!("Upgrading {} to version {CURRENT_VERSION}", self.key);
            self.persist().await?;
        }
        Ok(())
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn into_items(self) -> Vec<R> {
        self.items
    }

    /// Applies `mutation` to a copy of the list. When it succeeds the copy replaces the current list
    /// and gets persisted; when it fails nothing changes. If persisting fails the in-memory list
    /// keeps the mutation and the error is returned.
    pub async fn update<T>(&mut self, mutation: impl FnOnce(&mut Vec<R>) -> Result<T>) -> Result<T> {
        let mut next = self.items.clone();
        let output = mutation(&mut next)?;
        self.items = next;
        self.persist().await?;
        Ok(output)
    }

    /// Overwrites the whole list.
    pub async fn replace(&mut self, items: Vec<R>) -> Result<()> {
        self.items = items;
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        let items = self
            .items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.storage
            .save(&self.key, &StoredDocument::new(items))
            .await
            .with_context(|| format!("Failed to save {}", self.key))
    }
}

/// Decodes stored values, skipping the ones that don't fit the record type.
pub fn decode_items<R: DeserializeOwned>(key: &str, values: Vec<Value>) -> Vec<R> {
    let mut items = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<R>(value) {
            Ok(v) => items.push(v),
            Err(e) => warn!("Skipping record {index} of {key}: {e}"),
        }
    }
    items
}
