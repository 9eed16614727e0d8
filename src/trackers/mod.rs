//! Trackers are independent lists of personal records. Every module here only contains pure
//! operations on a `Vec` of its record type: persistence is handled by
//! [crate::storage::synced::Synced] and presentation by [crate::cli].

pub mod budget;
pub mod goals;
pub mod mood;
pub mod projects;
pub mod todos;
pub mod wishlist;

use std::fmt::Display;

use clap::ValueEnum;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::utils::clock::Clock;

/// Every tracker of the dashboard, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TrackerKind {
    Projects,
    Goals,
    Mood,
    Todos,
    Wishlist,
    Budget,
}

impl TrackerKind {
    pub fn all() -> [TrackerKind; 6] {
        [
            TrackerKind::Projects,
            TrackerKind::Goals,
            TrackerKind::Mood,
            TrackerKind::Todos,
            TrackerKind::Wishlist,
            TrackerKind::Budget,
        ]
    }

    /// Key the tracker's list is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            TrackerKind::Projects => "projects",
            TrackerKind::Goals => "goals",
            TrackerKind::Mood => "mood",
            TrackerKind::Todos => "todos",
            TrackerKind::Wishlist => "wishlist",
            TrackerKind::Budget => "budget",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrackerKind::Projects => "Projects",
            TrackerKind::Goals => "Goals",
            TrackerKind::Mood => "Mood",
            TrackerKind::Todos => "To-dos",
            TrackerKind::Wishlist => "Wishlist",
            TrackerKind::Budget => "Household budget",
        }
    }

    pub fn from_key(key: &str) -> Option<TrackerKind> {
        TrackerKind::all().into_iter().find(|v| v.key() == key)
    }
}

impl Display for TrackerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Record stored in a tracker list.
pub trait TrackerRecord: Serialize + DeserializeOwned + Clone {
    const KIND: TrackerKind;

    fn id(&self) -> u64;

    /// Restores values that are derived from other fields. Called on records coming from outside,
    /// such as backups.
    fn normalize(&mut self) {}
}

#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("{0} can't be empty")]
    EmptyField(&'static str),
    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: u64 },
    #[error("{field} must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: String,
    },
}

/// Creates an id that is unique among `existing`. Ids come from the millisecond clock so that they
/// roughly follow creation order; when the clock lags behind the largest id, that id is bumped.
/// Once the largest id is `u64::MAX` the smallest free id is used instead.
pub fn next_id(existing: impl IntoIterator<Item = u64>, clock: &dyn Clock) -> u64 {
    let candidate = clock.time().timestamp_millis().max(0) as u64;
    let mut taken: Vec<u64> = existing.into_iter().collect();
    let max = match taken.iter().max() {
        Some(&max) if max >= candidate => max,
        _ => return candidate,
    };
    if let Some(next) = max.checked_add(1) {
        return next;
    }

    taken.sort_unstable();
    taken.dedup();
    taken
        .iter()
        .zip(0u64..)
        .find(|(id, expected)| **id != *expected)
        .map(|(_, expected)| expected)
        .unwrap_or(taken.len() as u64)
}

/// Trims `value`, rejecting it when nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<String, TrackerError> {
    let value = value.trim();
    if value.is_empty() {
        Err(TrackerError::EmptyField(field))
    } else {
        Ok(value.to_owned())
    }
}

pub fn find_mut<'a, R: TrackerRecord>(
    items: &'a mut [R],
    kind: &'static str,
    id: u64,
) -> Result<&'a mut R, TrackerError> {
    items
        .iter_mut()
        .find(|v| v.id() == id)
        .ok_or(TrackerError::NotFound { kind, id })
}

/// Removes the record with `id`, returning it.
pub fn remove_by_id<R: TrackerRecord>(
    items: &mut Vec<R>,
    kind: &'static str,
    id: u64,
) -> Result<R, TrackerError> {
    let position = items
        .iter()
        .position(|v| v.id() == id)
        .ok_or(TrackerError::NotFound { kind, id })?;
    Ok(items.remove(position))
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::utils::clock::MockClock;

    pub const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    pub fn test_start() -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE)
    }

    /// Clock that moves one second forward on every call.
    pub fn ticking_clock() -> MockClock {
        let mut clock = MockClock::new();
        let mut current = test_start();
        clock.expect_time().returning(move || {
            let now = current;
            current += Duration::seconds(1);
            now
        });
        clock
    }
}
