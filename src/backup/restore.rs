use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, instrument};

use crate::{
    storage::{envelope::StoredDocument, TrackerStorage},
    trackers::{
        budget::BudgetLine, goals::Goal, mood::MoodEntry, projects::Project, todos::Todo,
        wishlist::WishlistItem, TrackerKind, TrackerRecord,
    },
};

use super::{Backup, BackupError};

/// Decodes every item as `R`, restores derived fields and encodes it back. One bad item rejects the
/// whole list.
fn normalize_as<R: TrackerRecord>(items: Vec<Value>) -> Result<Vec<Value>, BackupError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, value)| -> Result<Value, BackupError> {
            let mut record =
                serde_json::from_value::<R>(value).map_err(|e| BackupError::InvalidItem {
                    tracker: R::KIND,
                    index,
                    reason: e.to_string(),
                })?;
            record.normalize();
            Ok(serde_json::to_value(record)?)
        })
        .collect()
}

pub fn normalize_items(kind: TrackerKind, items: Vec<Value>) -> Result<Vec<Value>, BackupError> {
    match kind {
        TrackerKind::Projects => normalize_as::<Project>(items),
        TrackerKind::Goals => normalize_as::<Goal>(items),
        TrackerKind::Mood => normalize_as::<MoodEntry>(items),
        TrackerKind::Todos => normalize_as::<Todo>(items),
        TrackerKind::Wishlist => normalize_as::<WishlistItem>(items),
        TrackerKind::Budget => normalize_as::<BudgetLine>(items),
    }
}

/// Validates a backup completely before touching storage. For bundles every tracker must be valid,
/// otherwise nothing gets written. Returns the lists that would be written, per tracker.
pub fn prepare_restore(
    backup: Backup,
    only: Option<TrackerKind>,
) -> Result<BTreeMap<TrackerKind, Vec<Value>>, BackupError> {
    let mut prepared = BTreeMap::new();
    match backup {
        Backup::Tracker(snapshot) => {
            if let Some(expected) = only.filter(|v| *v != snapshot.tracker) {
                return Err(BackupError::WrongTracker {
                    tracker: expected,
                    found: snapshot.tracker,
                });
            }
            prepared.insert(
                snapshot.tracker,
                normalize_items(snapshot.tracker, snapshot.items)?,
            );
        }
        Backup::Bundle(bundle) => {
            for (key, items) in bundle.trackers {
                let Some(kind) = TrackerKind::from_key(&key) else {
                    continue;
                };
                if only.is_some_and(|v| v != kind) {
                    continue;
                }
                prepared.insert(kind, normalize_items(kind, items)?);
            }
        }
    }
    Ok(prepared)
}

/// Overwrites local state with the backup. Returns how many items each tracker received.
#[instrument(skip(storage, backup))]
pub async fn restore(
    storage: &impl TrackerStorage,
    backup: Backup,
    only: Option<TrackerKind>,
) -> Result<Vec<(TrackerKind, usize)>> {
    let prepared = prepare_restore(backup, only)?;
    let mut restored = vec![];
    for (kind, items) in prepared {
        let count = items.len();
        storage
            .save(kind.key(), &StoredDocument::new(items))
            .await
            .with_context(|| format!("Failed to restore {kind}"))?;
        info!("Restored {count} items into {kind}");
        restored.push((kind, count));
    }
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::{
        backup::{Backup, BackupError, Bundle, TrackerSnapshot},
        storage::{document::DocumentStore, envelope::StoredDocument, TrackerStorage},
        trackers::{test_support::test_start, TrackerKind},
    };

    use super::{prepare_restore, restore};

    fn snapshot(tracker: TrackerKind, items: Vec<serde_json::Value>) -> Backup {
        Backup::Tracker(TrackerSnapshot {
            tracker,
            exported_at: test_start(),
            items,
        })
    }

    #[tokio::test]
    async fn test_restore_overwrites() -> Result<()> {
        let dir = tempdir()?;
        let store = DocumentStore::new(dir.path().to_owned())?;
        store
            .save("todos", &StoredDocument::new(vec![json!({"id": 9, "text": "old"})]))
            .await?;

        let restored = restore(
            &store,
            snapshot(TrackerKind::Todos, vec![json!({"id": 1, "text": "new"})]),
            None,
        )
        .await?;
        assert_eq!(restored, vec![(TrackerKind::Todos, 1)]);

        let stored = store.load("todos").await?.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0]["text"], "new");
        assert_eq!(stored.items[0]["priority"], "medium");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_bundle_writes_nothing() -> Result<()> {
        let dir = tempdir()?;
        let store = DocumentStore::new(dir.path().to_owned())?;
        let bundle = Backup::Bundle(Bundle {
            app_version: "0.1.0".into(),
            created_at: test_start(),
            trackers: BTreeMap::from([
                ("todos".to_owned(), vec![json!({"id": 1, "text": "fine"})]),
                ("mood".to_owned(), vec![json!({"id": 1, "mood": "ecstatic"})]),
            ]),
        });

        let error = restore(&store, bundle, None).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<BackupError>(),
            Some(BackupError::InvalidItem {
                tracker: TrackerKind::Mood,
                index: 0,
                ..
            })
        ));
        assert_eq!(store.keys().await?, Vec::<String>::new());
        Ok(())
    }

    #[test]
    fn test_goal_status_is_recomputed() {
        let prepared = prepare_restore(
            snapshot(
                TrackerKind::Goals,
                vec![json!({
                    "id": 1,
                    "title": "Learn piano",
                    "milestones": [
                        {"id": 1, "title": "Scales", "completed": true},
                        {"id": 2, "title": "Song"}
                    ],
                    "status": "completed"
                })],
            ),
            None,
        )
        .unwrap();
        assert_eq!(prepared[&TrackerKind::Goals][0]["status"], "in_progress");
    }

    #[test]
    fn test_wrong_tracker_is_rejected() {
        assert!(matches!(
            prepare_restore(snapshot(TrackerKind::Mood, vec![]), Some(TrackerKind::Todos)),
            Err(BackupError::WrongTracker { .. })
        ));
    }
}
