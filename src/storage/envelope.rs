use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// Version assigned to bare arrays saved before documents carried a version.
pub const LEGACY_VERSION: u32 = 0;

/// The struct used for storing a tracker list on the disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub version: u32,
    pub items: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OnDisk {
    Versioned(StoredDocument),
    Legacy(Vec<Value>),
}

impl StoredDocument {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            version: CURRENT_VERSION,
            items,
        }
    }

    /// Accepts both the versioned envelope and a bare legacy array.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        Ok(match serde_json::from_str::<OnDisk>(text)? {
            OnDisk::Versioned(document) => document,
            OnDisk::Legacy(items) => Self {
                version: LEGACY_VERSION,
                items,
            },
        })
    }

    pub fn is_legacy(&self) -> bool {
        self.version < CURRENT_VERSION
    }
}
