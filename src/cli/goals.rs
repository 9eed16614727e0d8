use anyhow::Result;
use clap::Subcommand;

use crate::{
    trackers::goals::{
        add_goal, add_milestone, add_note, remove_goal, remove_milestone, remove_note, sort_goals,
        toggle_milestone, Goal, GoalDraft, GoalSort, GoalStatus,
    },
    utils::time::format_day,
};

use super::{
    output::{checkbox, Painter},
    Session,
};

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    #[command(about = "List goals with milestones and notes")]
    List {
        #[arg(long, value_enum, default_value_t)]
        sort: GoalSort,
        #[arg(long, help = "Hide milestones and notes")]
        brief: bool,
    },
    #[command(about = "Create a goal")]
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(
            long,
            help = "Deadline. Examples are \"next friday\", \"15/03/2025\", \"2025-03-15\""
        )]
        deadline: Option<String>,
    },
    #[command(about = "Add a milestone to a goal")]
    Milestone { goal: u64, title: String },
    #[command(about = "Mark a milestone as completed, or open if it already is")]
    Toggle { goal: u64, milestone: u64 },
    #[command(about = "Delete a milestone")]
    RemoveMilestone { goal: u64, milestone: u64 },
    #[command(about = "Attach a note to a goal")]
    Note { goal: u64, text: String },
    #[command(about = "Delete a note")]
    RemoveNote { goal: u64, note: u64 },
    #[command(about = "Delete a goal")]
    Remove { id: u64 },
}

pub async fn process_goal_command(command: GoalCommand, session: &Session) -> Result<()> {
    let mut goals = session.open::<Goal>().await?;
    let clock = session.clock.as_ref();
    match command {
        GoalCommand::List { sort, brief } => {
            let mut items = goals.items().to_vec();
            sort_goals(&mut items, sort);
            print_goals(&items, brief, &session.painter);
        }
        GoalCommand::Add {
            title,
            description,
            deadline,
        } => {
            let deadline = match deadline {
                Some(v) => Some(session.day(Some(v.as_str()))?),
                None => None,
            };
            let draft = GoalDraft {
                title,
                description,
                deadline,
            };
            let id = goals.update(|v| Ok(add_goal(v, draft, clock)?)).await?;
            println!("Added goal {id}");
        }
        GoalCommand::Milestone { goal, title } => {
            let id = goals
                .update(|v| Ok(add_milestone(v, goal, &title, clock)?))
                .await?;
            println!("Added milestone {id}");
        }
        GoalCommand::Toggle { goal, milestone } => {
            let status = goals
                .update(|v| Ok(toggle_milestone(v, goal, milestone)?))
                .await?;
            println!("Goal {goal} is {}", status.label().to_lowercase());
        }
        GoalCommand::RemoveMilestone { goal, milestone } => {
            let status = goals
                .update(|v| Ok(remove_milestone(v, goal, milestone)?))
                .await?;
            println!("Removed milestone, goal {goal} is {}", status.label().to_lowercase());
        }
        GoalCommand::Note { goal, text } => {
            let id = goals
                .update(|v| Ok(add_note(v, goal, &text, clock)?))
                .await?;
            println!("Added note {id}");
        }
        GoalCommand::RemoveNote { goal, note } => {
            goals.update(|v| Ok(remove_note(v, goal, note)?)).await?;
            println!("Removed note {note}");
        }
        GoalCommand::Remove { id } => {
            let removed = goals.update(|v| Ok(remove_goal(v, id)?)).await?;
            println!("Removed goal \"{}\"", removed.title);
        }
    }
    Ok(())
}

fn paint_status(status: GoalStatus, painter: &Painter) -> String {
    match status {
        GoalStatus::NotStarted => painter.dim(status.label()),
        GoalStatus::InProgress => painter.warn(status.label()),
        GoalStatus::Completed => painter.good(status.label()),
    }
}

fn print_goals(goals: &[Goal], brief: bool, painter: &Painter) {
    if goals.is_empty() {
        println!("{}", painter.dim("No goals"));
        return;
    }
    for goal in goals {
        let deadline = goal
            .deadline
            .map(|v| format!("due {}", format_day(v)))
            .unwrap_or_default();
        println!(
            "{}\t{}\t{}\t{}\t{}",
            goal.id,
            painter.heading(&goal.title),
            paint_status(goal.status, painter),
            goal.progress(),
            deadline
        );
        if brief {
            continue;
        }
        if !goal.description.is_empty() {
            println!("\t{}", painter.dim(&goal.description));
        }
        for milestone in &goal.milestones {
            println!(
                "\t{}\t{} {}",
                milestone.id,
                checkbox(milestone.completed),
                milestone.title
            );
        }
        for note in &goal.notes {
            println!(
                "\t{}\t{} {}",
                note.id,
                painter.dim(format_day(note.created_at.date_naive())),
                note.text
            );
        }
    }
}

pub fn summary_line(goals: &[Goal]) -> String {
    let count = |status: GoalStatus| goals.iter().filter(|v| v.status == status).count();
    format!(
        "{} goals, {} in progress, {} completed",
        goals.len(),
        count(GoalStatus::InProgress),
        count(GoalStatus::Completed)
    )
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        cli::test_support::run,
        storage::{document::DocumentStore, synced::Synced},
        trackers::goals::{Goal, GoalStatus},
    };

    use super::summary_line;

    async fn load(store: &DocumentStore) -> Result<Vec<Goal>> {
        Ok(Synced::<Goal, _>::load(store, "goals").await?.into_items())
    }

    #[tokio::test]
    async fn test_goal_commands() -> Result<()> {
        let dir = tempdir()?;
        let store = DocumentStore::new(dir.path().join("documents"))?;

        run(
            dir.path(),
            &["goals", "add", "Learn Spanish", "--deadline", "2025-12-31"],
        )
        .await?;
        let goal = load(&store).await?[0].clone();
        assert_eq!(goal.deadline, NaiveDate::from_ymd_opt(2025, 12, 31));
        let goal_id = goal.id.to_string();

        run(dir.path(), &["goals", "milestone", goal_id.as_str(), "A1"]).await?;
        run(dir.path(), &["goals", "note", goal_id.as_str(), "Duolingo streak"]).await?;
        let goal = load(&store).await?[0].clone();
        let milestone_id = goal.milestones[0].id.to_string();

        run(
            dir.path(),
            &["goals", "toggle", goal_id.as_str(), milestone_id.as_str()],
        )
        .await?;
        run(dir.path(), &["goals", "list"]).await?;

        let goals = load(&store).await?;
        assert_eq!(goals[0].status, GoalStatus::Completed);
        assert_eq!(goals[0].notes.len(), 1);
        assert_eq!(summary_line(&goals), "1 goals, 0 in progress, 1 completed");

        assert!(run(dir.path(), &["goals", "add", "Bad", "--deadline", "whenever"])
            .await
            .is_err());
        Ok(())
    }
}
