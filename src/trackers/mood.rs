use std::{cmp::Reverse, collections::BTreeMap};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::clock::Clock;

use super::{next_id, remove_by_id, TrackerError, TrackerKind, TrackerRecord};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Great,
    Good,
    Okay,
    Bad,
    Awful,
}

impl Mood {
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Great => "Great",
            Mood::Good => "Good",
            Mood::Okay => "Okay",
            Mood::Bad => "Bad",
            Mood::Awful => "Awful",
        }
    }

    /// From 5 for the best mood down to 1.
    pub fn score(&self) -> u8 {
        match self {
            Mood::Great => 5,
            Mood::Good => 4,
            Mood::Okay => 3,
            Mood::Bad => 2,
            Mood::Awful => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: u64,
    pub date: NaiveDate,
    pub mood: Mood,
    #[serde(default)]
    pub notes: String,
}

impl TrackerRecord for MoodEntry {
    const KIND: TrackerKind = TrackerKind::Mood;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoodSummary {
    pub total: usize,
    pub counts: BTreeMap<Mood, usize>,
    /// Average [Mood::score], absent when there are no entries.
    pub average: Option<f64>,
}

/// Several entries per day are allowed, the mood can change during a day.
pub fn log_mood(
    entries: &mut Vec<MoodEntry>,
    date: NaiveDate,
    mood: Mood,
    notes: &str,
    clock: &dyn Clock,
) -> Result<u64, TrackerError> {
    let id = next_id(entries.iter().map(|v| v.id), clock);
    entries.push(MoodEntry {
        id,
        date,
        mood,
        notes: notes.trim().to_owned(),
    });
    Ok(id)
}

pub fn remove_entry(entries: &mut Vec<MoodEntry>, id: u64) -> Result<MoodEntry, TrackerError> {
    remove_by_id(entries, "mood entry", id)
}

/// Entries with `start <= date <= end`, newest first.
pub fn entries_between(entries: &[MoodEntry], start: NaiveDate, end: NaiveDate) -> Vec<&MoodEntry> {
    let mut selected = entries
        .iter()
        .filter(|v| start <= v.date && v.date <= end)
        .collect::<Vec<_>>();
    selected.sort_by_key(|v| Reverse((v.date, v.id)));
    selected
}

pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a MoodEntry>) -> MoodSummary {
    let mut summary = MoodSummary::default();
    let mut score_sum = 0u64;
    for entry in entries {
        summary.total += 1;
        *summary.counts.entry(entry.mood).or_default() += 1;
        score_sum += entry.mood.score() as u64;
    }
    if summary.total > 0 {
        summary.average = Some(score_sum as f64 / summary.total as f64);
    }
    summary
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::trackers::test_support::ticking_clock;

    use super::{entries_between, log_mood, remove_entry, summarize, Mood};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_entries_between_newest_first() {
        let clock = ticking_clock();
        let mut entries = vec![];
        log_mood(&mut entries, day(1), Mood::Good, "", &clock).unwrap();
        let evening = log_mood(&mut entries, day(3), Mood::Bad, "long day", &clock).unwrap();
        let morning = log_mood(&mut entries, day(3), Mood::Great, "", &clock).unwrap();
        log_mood(&mut entries, day(9), Mood::Okay, "", &clock).unwrap();

        let selected = entries_between(&entries, day(2), day(8));
        let ids = selected.iter().map(|v| v.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![morning, evening]);

        remove_entry(&mut entries, evening).unwrap();
        assert_eq!(entries_between(&entries, day(2), day(8)).len(), 1);
    }

    #[test]
    fn test_summarize() {
        let clock = ticking_clock();
        let mut entries = vec![];
        log_mood(&mut entries, day(1), Mood::Great, "", &clock).unwrap();
        log_mood(&mut entries, day(2), Mood::Great, "", &clock).unwrap();
        log_mood(&mut entries, day(3), Mood::Awful, "", &clock).unwrap();
        log_mood(&mut entries, day(4), Mood::Okay, "", &clock).unwrap();

        let summary = summarize(&entries);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.counts.get(&Mood::Great), Some(&2));
        assert_eq!(summary.counts.get(&Mood::Good), None);
        assert_eq!(summary.average, Some(3.5));

        assert_eq!(summarize([]).average, None);
    }
}
