//! Storage is organized through the [TrackerStorage] trait.
//! The basic idea is:
//!  - Every tracker owns a single key and stores its whole list under it.
//!  - Lists are wrapped into a [envelope::StoredDocument] which carries a schema version.
//!  - There are two engines. [document::DocumentStore] keeps one JSON file per key, mirroring a
//!    key-value store. [collection::CollectionStore] keeps one JSON Lines file per named store with
//!    a header line, mirroring a small local database.
//!  - [synced::Synced] keeps an in-memory list consistent with whichever engine is selected.

pub mod backend;
pub mod collection;
pub mod document;
pub mod envelope;
pub mod synced;

use std::{future::Future, ops::Deref};

use anyhow::{bail, Result};

use envelope::StoredDocument;

/// Interface for abstracting persistence of tracker lists.
pub trait TrackerStorage {
    /// Reads the document stored under `key`. Returns `None` when nothing was ever saved.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<StoredDocument>>>;

    /// Overwrites the document stored under `key`.
    fn save(&self, key: &str, document: &StoredDocument) -> impl Future<Output = Result<()>>;

    fn remove(&self, key: &str) -> impl Future<Output = Result<()>>;

    /// Lists keys that currently hold a document, sorted.
    fn keys(&self) -> impl Future<Output = Result<Vec<String>>>;
}

impl<T: Deref> TrackerStorage for T
where
    T::Target: TrackerStorage,
{
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<StoredDocument>>> {
        self.deref().load(key)
    }

    fn save(&self, key: &str, document: &StoredDocument) -> impl Future<Output = Result<()>> {
        self.deref().save(key, document)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> {
        self.deref().remove(key)
    }

    fn keys(&self) -> impl Future<Output = Result<Vec<String>>> {
        self.deref().keys()
    }
}

/// Keys become file names, so only a conservative alphabet is accepted.
pub fn check_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        bail!("Illegal storage key {key:?}");
    }
    Ok(())
}
