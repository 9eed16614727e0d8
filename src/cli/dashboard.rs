use anyhow::Result;
use tracing::error;

use crate::trackers::{
    budget::BudgetLine, goals::Goal, mood::MoodEntry, projects::Project, todos::Todo,
    wishlist::WishlistItem, TrackerKind,
};

use super::{budget, goals, mood, projects, todo, wishlist, Session};

/// One line per tracker. A tracker that can't be loaded is reported in place and doesn't hide the
/// others.
pub async fn process_dashboard_command(session: &Session) -> Result<()> {
    for kind in TrackerKind::all() {
        let line = match tracker_summary(kind, session).await {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to load {kind} {e:?}");
                session.painter.bad(format!("unavailable: {e}"))
            }
        };
        println!("{:<18}{line}", session.painter.heading(kind.title()));
    }
    Ok(())
}

pub async fn tracker_summary(kind: TrackerKind, session: &Session) -> Result<String> {
    Ok(match kind {
        TrackerKind::Projects => projects::summary_line(session.open::<Project>().await?.items()),
        TrackerKind::Goals => goals::summary_line(session.open::<Goal>().await?.items()),
        TrackerKind::Mood => mood::summary_line(session.open::<MoodEntry>().await?.items()),
        TrackerKind::Todos => todo::summary_line(session.open::<Todo>().await?.items()),
        TrackerKind::Wishlist => {
            wishlist::summary_line(session.open::<WishlistItem>().await?.items())
        }
        TrackerKind::Budget => budget::summary_line(session.open::<BudgetLine>().await?.items()),
    })
}
