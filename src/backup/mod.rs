//! Manual JSON backups. A backup is either a [TrackerSnapshot] of a single tracker or a [Bundle]
//! with every tracker. Restoring overwrites local state wholesale, there is no merging.

pub mod restore;

use std::{collections::BTreeMap, io::ErrorKind, path::Path};

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    storage::TrackerStorage,
    trackers::TrackerKind,
    utils::clock::Clock,
};

/// Largest backup accepted for import.
pub const MAX_BACKUP_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub tracker: TrackerKind,
    pub exported_at: DateTime<Utc>,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub app_version: String,
    pub created_at: DateTime<Utc>,
    /// Tracker key to its items.
    pub trackers: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Backup {
    Tracker(TrackerSnapshot),
    Bundle(Bundle),
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup is {size} bytes, the limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("backup file not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backup is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected backup shape: {0}")]
    Shape(String),
    #[error("{tracker} backup expected, got {found}")]
    WrongTracker {
        tracker: TrackerKind,
        found: TrackerKind,
    },
    #[error("item {index} of {tracker} is invalid: {reason}")]
    InvalidItem {
        tracker: TrackerKind,
        index: usize,
        reason: String,
    },
}

/// Reads the current items of one tracker.
pub async fn export_tracker(
    storage: &impl TrackerStorage,
    kind: TrackerKind,
    clock: &dyn Clock,
) -> Result<TrackerSnapshot> {
    let items = storage
        .load(kind.key())
        .await?
        .map(|v| v.items)
        .unwrap_or_default();
    Ok(TrackerSnapshot {
        tracker: kind,
        exported_at: clock.time(),
        items,
    })
}

/// Reads every tracker. Trackers are loaded concurrently, a failure in any of them fails the export.
pub async fn export_bundle(storage: &impl TrackerStorage, clock: &dyn Clock) -> Result<Bundle> {
    let trackers = stream::iter(TrackerKind::all())
        .map(|kind| async move {
            let items = storage
                .load(kind.key())
                .await?
                .map(|v| v.items)
                .unwrap_or_default();
            anyhow::Ok((kind.key().to_owned(), items))
        })
        .buffered(4)
        .try_collect::<BTreeMap<_, _>>()
        .await?;

    Ok(Bundle {
        app_version: env!("CARGO_PKG_VERSION").to_owned(),
        created_at: clock.time(),
        trackers,
    })
}

/// Writes a pretty printed backup, creating parent directories when needed.
pub async fn write_backup(path: &Path, backup: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent().filter(|v| !v.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_vec_pretty(backup)?;
    tokio::fs::write(path, content).await?;
    info!("Backup written to {path:?}");
    Ok(())
}

pub async fn read_backup(path: &Path) -> Result<Backup, BackupError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(v) => v,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(BackupError::NotFound(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    check_size(metadata.len())?;
    let content = tokio::fs::read(path).await?;
    parse_backup(&content)
}

fn check_size(size: u64) -> Result<(), BackupError> {
    if size > MAX_BACKUP_BYTES {
        return Err(BackupError::TooLarge {
            size,
            limit: MAX_BACKUP_BYTES,
        });
    }
    Ok(())
}

/// Recognizes the kind of backup after a shallow check that the expected fields exist and hold
/// arrays. Items themselves are checked later, against the record type of their tracker.
pub fn parse_backup(content: &[u8]) -> Result<Backup, BackupError> {
    check_size(content.len() as u64)?;
    let value = serde_json::from_slice::<Value>(content)?;
    let Some(object) = value.as_object() else {
        return Err(BackupError::Shape("top level must be an object".into()));
    };

    if let Some(trackers) = object.get("trackers") {
        let Some(trackers) = trackers.as_object() else {
            return Err(BackupError::Shape("\"trackers\" must be an object".into()));
        };
        let mut known = BTreeMap::new();
        for (key, items) in trackers {
            let Some(items) = items.as_array() else {
                return Err(BackupError::Shape(format!("\"{key}\" must be an array")));
            };
            if TrackerKind::from_key(key).is_none() {
                warn!("Ignoring unknown tracker {key} in bundle");
                continue;
            }
            known.insert(key.clone(), items.clone());
        }
        return Ok(Backup::Bundle(Bundle {
            app_version: object
                .get("app_version")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_owned(),
            created_at: object
                .get("created_at")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
            trackers: known,
        }));
    }

    match (object.get("tracker"), object.get("items")) {
        (Some(_), Some(items)) if !items.is_array() => {
            Err(BackupError::Shape("\"items\" must be an array".into()))
        }
        (Some(_), Some(_)) => serde_json::from_value(value)
            .map(Backup::Tracker)
            .map_err(|e| BackupError::Shape(format!("invalid tracker snapshot: {e}"))),
        _ => Err(BackupError::Shape(
            "expected either \"trackers\" or \"tracker\" with \"items\"".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::{
        storage::{document::DocumentStore, envelope::StoredDocument, TrackerStorage},
        trackers::{test_support::test_start, TrackerKind},
        utils::clock::FixedClock,
    };

    use super::{
        export_bundle, export_tracker, parse_backup, read_backup, write_backup, Backup,
        BackupError, MAX_BACKUP_BYTES,
    };

    #[tokio::test]
    async fn test_export_and_read_back() -> Result<()> {
        let dir = tempdir()?;
        let store = DocumentStore::new(dir.path().join("data"))?;
        let clock = FixedClock(test_start());
        store
            .save("todos", &StoredDocument::new(vec![json!({"id": 1, "text": "a"})]))
            .await?;

        let snapshot = export_tracker(&store, TrackerKind::Todos, &clock).await?;
        assert_eq!(snapshot.items.len(), 1);
        let path = dir.path().join("out").join("todos.json");
        write_backup(&path, &snapshot).await?;
        assert_eq!(read_backup(&path).await?, Backup::Tracker(snapshot));

        let bundle = export_bundle(&store, &clock).await?;
        assert_eq!(bundle.trackers.len(), TrackerKind::all().len());
        assert_eq!(bundle.trackers["todos"].len(), 1);
        assert!(bundle.trackers["goals"].is_empty());
        Ok(())
    }

    #[test]
    fn test_shape_checks() {
        assert!(matches!(
            parse_backup(b"[1, 2]"),
            Err(BackupError::Shape(_))
        ));
        assert!(matches!(
            parse_backup(br#"{"tracker": "todos", "items": {}}"#),
            Err(BackupError::Shape(_))
        ));
        assert!(matches!(
            parse_backup(br#"{"trackers": {"todos": 3}}"#),
            Err(BackupError::Shape(_))
        ));
        assert!(matches!(
            parse_backup(br#"{"something": []}"#),
            Err(BackupError::Shape(_))
        ));
        assert!(matches!(parse_backup(b"{oops"), Err(BackupError::Json(_))));
    }

    #[test]
    fn test_snapshot_of_unknown_tracker() {
        let result = parse_backup(
            br#"{"tracker": "calendar", "exported_at": "2018-07-04T00:00:00Z", "items": []}"#,
        );
        let Err(BackupError::Shape(reason)) = result else {
            panic!("expected a shape error, got {result:?}");
        };
        assert!(reason.contains("calendar"));
    }

    #[test]
    fn test_bundle_ignores_unknown_trackers() {
        let backup = parse_backup(
            br#"{"app_version": "0.1.0", "trackers": {"todos": [], "calendar": [1]}}"#,
        )
        .unwrap();
        let Backup::Bundle(bundle) = backup else {
            panic!("expected bundle");
        };
        assert_eq!(bundle.trackers.keys().collect::<Vec<_>>(), vec!["todos"]);
    }

    #[test]
    fn test_oversized_payload() {
        let payload = vec![b' '; MAX_BACKUP_BYTES as usize + 1];
        assert!(matches!(
            parse_backup(&payload),
            Err(BackupError::TooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            read_backup(&dir.path().join("nope.json")).await,
            Err(BackupError::NotFound(_))
        ));
    }
}
