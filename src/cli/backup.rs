use std::path::PathBuf;

use anyhow::Result;
use tracing::error;

use crate::{
    backup::{
        export_bundle, export_tracker, read_backup, restore::restore, write_backup, Backup,
    },
    trackers::TrackerKind,
    utils::time::format_day,
};

use super::Session;

#[derive(Debug, clap::Args)]
pub struct ExportCommand {
    #[arg(
        short,
        long,
        value_enum,
        help = "Export only this tracker. Everything is exported into a single bundle by default"
    )]
    tracker: Option<TrackerKind>,
    #[arg(
        short,
        long,
        help = "Destination file. Defaults to daybook-<tracker>-<date>.json in the current directory"
    )]
    output: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub struct ImportCommand {
    #[arg(help = "Backup produced by export")]
    file: PathBuf,
    #[arg(
        short,
        long,
        value_enum,
        help = "Restore only this tracker. Required to match when the file holds a single tracker"
    )]
    tracker: Option<TrackerKind>,
}

pub async fn process_export_command(command: ExportCommand, session: &Session) -> Result<()> {
    let clock = session.clock.as_ref();
    let name = command
        .tracker
        .map(|v| v.key())
        .unwrap_or("all");
    let output = command.output.unwrap_or_else(|| {
        PathBuf::from(format!("daybook-{name}-{}.json", format_day(session.clock.today())))
    });

    match command.tracker {
        Some(kind) => {
            let snapshot = export_tracker(&session.storage, kind, clock).await?;
            write_backup(&output, &snapshot).await?;
            println!("Exported {} {kind} items into {}", snapshot.items.len(), output.display());
        }
        None => {
            let bundle = export_bundle(&session.storage, clock).await?;
            write_backup(&output, &bundle).await?;
            println!("Exported every tracker into {}", output.display());
        }
    }
    Ok(())
}

pub async fn process_import_command(command: ImportCommand, session: &Session) -> Result<()> {
    let backup = read_backup(&command.file)
        .await
        .inspect_err(|e| error!("Rejected backup {:?}: {e}", command.file))?;
    if let Backup::Bundle(bundle) = &backup {
        println!(
            "Restoring bundle made by version {} on {}",
            bundle.app_version,
            format_day(bundle.created_at.date_naive())
        );
    }
    let restored = restore(&session.storage, backup, command.tracker).await?;
    if restored.is_empty() {
        println!("{}", session.painter.dim("Nothing to restore"));
    }
    for (kind, count) in restored {
        println!("{}: {count} items restored", kind.title());
    }
    Ok(())
}
