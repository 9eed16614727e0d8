use anyhow::Result;
use chrono::Duration;
use clap::{Subcommand, ValueEnum};

use crate::{
    trackers::mood::{entries_between, log_mood, remove_entry, summarize, Mood, MoodEntry},
    utils::time::{format_day, month_bounds, week_bounds},
};

use super::{output::Painter, Session};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MoodRange {
    #[default]
    Week,
    Month,
    All,
}

#[derive(Subcommand, Debug)]
pub enum MoodCommand {
    #[command(about = "Record how you feel")]
    Log {
        #[arg(value_enum)]
        mood: Mood,
        #[arg(short, long, default_value = "")]
        notes: String,
        #[arg(
            short,
            long,
            help = "Day of the entry, today by default. Examples are \"yesterday\", \"15/03/2025\""
        )]
        date: Option<String>,
    },
    #[command(about = "Show entries of the current week, month or everything")]
    List {
        #[arg(long, value_enum, default_value_t)]
        range: MoodRange,
    },
    #[command(about = "Count moods over the last days")]
    Summary {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    #[command(about = "Delete an entry")]
    Remove { id: u64 },
}

pub async fn process_mood_command(command: MoodCommand, session: &Session) -> Result<()> {
    let mut entries = session.open::<MoodEntry>().await?;
    let clock = session.clock.as_ref();
    match command {
        MoodCommand::Log { mood, notes, date } => {
            let date = session.day(date.as_deref())?;
            let id = entries
                .update(|v| Ok(log_mood(v, date, mood, &notes, clock)?))
                .await?;
            println!("Logged {} for {} ({id})", mood.label(), format_day(date));
        }
        MoodCommand::List { range } => {
            let today = session.day(None)?;
            let (start, end) = match range {
                MoodRange::Week => week_bounds(today),
                MoodRange::Month => month_bounds(today),
                MoodRange::All => (chrono::NaiveDate::MIN, chrono::NaiveDate::MAX),
            };
            print_entries(&entries_between(entries.items(), start, end), &session.painter);
        }
        MoodCommand::Summary { days } => {
            let end = session.day(None)?;
            let start = end
                .checked_sub_signed(Duration::days(days.saturating_sub(1).into()))
                .unwrap_or(chrono::NaiveDate::MIN);
            let selected = entries_between(entries.items(), start, end);
            let summary = summarize(selected.iter().copied());
            println!(
                "{}",
                session
                    .painter
                    .heading(format!("{} to {}", format_day(start), format_day(end)))
            );
            for (mood, count) in &summary.counts {
                println!("{}\t{count}", paint_mood(*mood, &session.painter));
            }
            match summary.average {
                Some(average) => println!("Average\t{average:.1} / 5"),
                None => println!("{}", session.painter.dim("No entries")),
            }
        }
        MoodCommand::Remove { id } => {
            entries.update(|v| Ok(remove_entry(v, id)?)).await?;
            println!("Removed entry {id}");
        }
    }
    Ok(())
}

fn paint_mood(mood: Mood, painter: &Painter) -> String {
    let label = format!("{:<5}", mood.label());
    match mood {
        Mood::Great | Mood::Good => painter.good(label),
        Mood::Okay => painter.warn(label),
        Mood::Bad | Mood::Awful => painter.bad(label),
    }
}

fn print_entries(entries: &[&MoodEntry], painter: &Painter) {
    if entries.is_empty() {
        println!("{}", painter.dim("No entries"));
        return;
    }
    for entry in entries {
        println!(
            "{}\t{}\t{}\t{}",
            entry.id,
            format_day(entry.date),
            paint_mood(entry.mood, painter),
            entry.notes
        );
    }
}

pub fn summary_line(entries: &[MoodEntry]) -> String {
    let latest = entries.iter().max_by_key(|v| (v.date, v.id));
    match latest {
        Some(entry) => format!(
            "{} entries, latest {} on {}",
            entries.len(),
            entry.mood.label(),
            format_day(entry.date)
        ),
        None => "no entries".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        cli::test_support::run,
        storage::{document::DocumentStore, synced::Synced},
        trackers::mood::{Mood, MoodEntry},
    };

    use super::summary_line;

    #[tokio::test]
    async fn test_mood_commands() -> Result<()> {
        let dir = tempdir()?;
        run(dir.path(), &["mood", "log", "good", "-d", "2018-07-01"]).await?;
        run(
            dir.path(),
            &["mood", "log", "awful", "-n", "flu", "-d", "2018-07-03"],
        )
        .await?;
        run(dir.path(), &["mood", "list", "--range", "all"]).await?;
        run(dir.path(), &["mood", "summary", "--days", "7"]).await?;

        let store = DocumentStore::new(dir.path().join("documents"))?;
        let entries = Synced::<MoodEntry, _>::load(&store, "mood").await?;
        assert_eq!(entries.items().len(), 2);
        assert_eq!(entries.items()[1].mood, Mood::Awful);
        assert_eq!(
            entries.items()[1].date,
            NaiveDate::from_ymd_opt(2018, 7, 3).unwrap()
        );
        assert_eq!(
            summary_line(entries.items()),
            "2 entries, latest Awful on 2018-07-03"
        );

        assert!(run(dir.path(), &["mood", "log", "sleepy"]).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_over_more_days_than_the_calendar_holds() -> Result<()> {
        let dir = tempdir()?;
        run(dir.path(), &["mood", "log", "great", "-d", "2018-07-01"]).await?;

        run(dir.path(), &["mood", "summary", "--days", "4000000000"]).await?;
        let most = u32::MAX.to_string();
        run(dir.path(), &["mood", "summary", "--days", most.as_str()]).await?;
        run(dir.path(), &["mood", "summary", "--days", "0"]).await?;
        Ok(())
    }
}
