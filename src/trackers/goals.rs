use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::{
    clock::Clock,
    percentage::{count_percentage, Percentage},
};

use super::{find_mut, next_id, remove_by_id, required, TrackerError, TrackerKind, TrackerRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl GoalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::NotStarted => "Not started",
            GoalStatus::InProgress => "In progress",
            GoalStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalNote {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub notes: Vec<GoalNote>,
    /// Always equal to [derive_status] of `milestones`.
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl TrackerRecord for Goal {
    const KIND: TrackerKind = TrackerKind::Goals;

    fn id(&self) -> u64 {
        self.id
    }

    fn normalize(&mut self) {
        self.status = derive_status(&self.milestones);
    }
}

impl Goal {
    pub fn progress(&self) -> Percentage {
        progress(&self.milestones)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoalDraft {
    pub title: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GoalSort {
    #[default]
    Title,
    Deadline,
    Progress,
}

const GOAL: &str = "goal";

/// A goal without completed milestones hasn't started, one with every milestone completed is done.
pub fn derive_status(milestones: &[Milestone]) -> GoalStatus {
    let completed = milestones.iter().filter(|v| v.completed).count();
    if completed == 0 {
        GoalStatus::NotStarted
    } else if completed == milestones.len() {
        GoalStatus::Completed
    } else {
        GoalStatus::InProgress
    }
}

pub fn progress(milestones: &[Milestone]) -> Percentage {
    count_percentage(
        milestones.iter().filter(|v| v.completed).count(),
        milestones.len(),
    )
}

pub fn add_goal(goals: &mut Vec<Goal>, draft: GoalDraft, clock: &dyn Clock) -> Result<u64, TrackerError> {
    let title = required("title", &draft.title)?;
    let id = next_id(goals.iter().map(|v| v.id), clock);
    goals.push(Goal {
        id,
        title,
        description: draft.description.trim().to_owned(),
        deadline: draft.deadline,
        milestones: vec![],
        notes: vec![],
        status: GoalStatus::NotStarted,
        created_at: clock.time(),
    });
    Ok(id)
}

pub fn remove_goal(goals: &mut Vec<Goal>, goal_id: u64) -> Result<Goal, TrackerError> {
    remove_by_id(goals, GOAL, goal_id)
}

pub fn add_milestone(
    goals: &mut [Goal],
    goal_id: u64,
    title: &str,
    clock: &dyn Clock,
) -> Result<u64, TrackerError> {
    let title = required("milestone title", title)?;
    let goal = find_mut(goals, GOAL, goal_id)?;
    let id = next_id(goal.milestones.iter().map(|v| v.id), clock);
    goal.milestones.push(Milestone {
        id,
        title,
        completed: false,
    });
    goal.normalize();
    Ok(id)
}

/// Flips completion of a milestone and returns the new goal status.
pub fn toggle_milestone(
    goals: &mut [Goal],
    goal_id: u64,
    milestone_id: u64,
) -> Result<GoalStatus, TrackerError> {
    let goal = find_mut(goals, GOAL, goal_id)?;
    let milestone = goal
        .milestones
        .iter_mut()
        .find(|v| v.id == milestone_id)
        .ok_or(TrackerError::NotFound {
            kind: "milestone",
            id: milestone_id,
        })?;
    milestone.completed = !milestone.completed;
    goal.normalize();
    Ok(goal.status)
}

pub fn remove_milestone(
    goals: &mut [Goal],
    goal_id: u64,
    milestone_id: u64,
) -> Result<GoalStatus, TrackerError> {
    let goal = find_mut(goals, GOAL, goal_id)?;
    let before = goal.milestones.len();
    goal.milestones.retain(|v| v.id != milestone_id);
    if goal.milestones.len() == before {
        return Err(TrackerError::NotFound {
            kind: "milestone",
            id: milestone_id,
        });
    }
    goal.normalize();
    Ok(goal.status)
}

pub fn add_note(
    goals: &mut [Goal],
    goal_id: u64,
    text: &str,
    clock: &dyn Clock,
) -> Result<u64, TrackerError> {
    let text = required("note", text)?;
    let goal = find_mut(goals, GOAL, goal_id)?;
    let id = next_id(goal.notes.iter().map(|v| v.id), clock);
    goal.notes.push(GoalNote {
        id,
        text,
        created_at: clock.time(),
    });
    goal.normalize();
    Ok(id)
}

pub fn remove_note(goals: &mut [Goal], goal_id: u64, note_id: u64) -> Result<(), TrackerError> {
    let goal = find_mut(goals, GOAL, goal_id)?;
    let before = goal.notes.len();
    goal.notes.retain(|v| v.id != note_id);
    if goal.notes.len() == before {
        return Err(TrackerError::NotFound {
            kind: "note",
            id: note_id,
        });
    }
    goal.normalize();
    Ok(())
}

/// Goals without a deadline go after the ones that have it. Progress sorts the most advanced first.
pub fn sort_goals(goals: &mut [Goal], by: GoalSort) {
    match by {
        GoalSort::Title => goals.sort_by_key(|v| v.title.to_lowercase()),
        GoalSort::Deadline => goals.sort_by_key(|v| (v.deadline.is_none(), v.deadline)),
        GoalSort::Progress => goals.sort_by(|a, b| {
            b.progress()
                .partial_cmp(&a.progress())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::trackers::{test_support::ticking_clock, TrackerError, TrackerRecord};

    use super::{
        add_goal, add_milestone, add_note, derive_status, remove_goal, remove_milestone,
        remove_note, sort_goals, toggle_milestone, Goal, GoalDraft, GoalSort, GoalStatus,
    };

    fn draft(title: &str) -> GoalDraft {
        GoalDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_follows_milestones() {
        let clock = ticking_clock();
        let mut goals = vec![];
        let goal = add_goal(&mut goals, draft("Run a marathon"), &clock).unwrap();
        assert_eq!(goals[0].status, GoalStatus::NotStarted);

        let first = add_milestone(&mut goals, goal, "5k", &clock).unwrap();
        let second = add_milestone(&mut goals, goal, "half", &clock).unwrap();
        assert_ne!(first, second);

        assert_eq!(
            toggle_milestone(&mut goals, goal, first).unwrap(),
            GoalStatus::InProgress
        );
        assert_eq!(*goals[0].progress(), 50.);

        assert_eq!(
            toggle_milestone(&mut goals, goal, second).unwrap(),
            GoalStatus::Completed
        );

        // Adding a new milestone reopens the goal
        add_milestone(&mut goals, goal, "full", &clock).unwrap();
        assert_eq!(goals[0].status, GoalStatus::InProgress);

        assert_eq!(
            toggle_milestone(&mut goals, goal, first).unwrap(),
            GoalStatus::InProgress
        );
        assert_eq!(
            remove_milestone(&mut goals, goal, second).unwrap(),
            GoalStatus::NotStarted
        );
    }

    #[test]
    fn test_derive_status_without_milestones() {
        assert_eq!(derive_status(&[]), GoalStatus::NotStarted);
    }

    #[test]
    fn test_notes() {
        let clock = ticking_clock();
        let mut goals = vec![];
        let goal = add_goal(&mut goals, draft("Read"), &clock).unwrap();
        let note = add_note(&mut goals, goal, "Started with Dune", &clock).unwrap();
        assert_eq!(goals[0].notes.len(), 1);
        assert_eq!(
            add_note(&mut goals, goal, " ", &clock),
            Err(TrackerError::EmptyField("note"))
        );

        remove_note(&mut goals, goal, note).unwrap();
        assert!(goals[0].notes.is_empty());
        assert_eq!(
            remove_note(&mut goals, goal, note),
            Err(TrackerError::NotFound {
                kind: "note",
                id: note
            })
        );
    }

    #[test]
    fn test_unknown_goal() {
        let clock = ticking_clock();
        let mut goals: Vec<Goal> = vec![];
        assert_eq!(
            add_milestone(&mut goals, 3, "x", &clock),
            Err(TrackerError::NotFound { kind: "goal", id: 3 })
        );
        assert!(remove_goal(&mut goals, 3).is_err());
        assert_eq!(
            add_goal(&mut goals, draft(""), &clock),
            Err(TrackerError::EmptyField("title"))
        );
    }

    #[test]
    fn test_normalize_fixes_imported_status() {
        let mut goal: Goal = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Imported",
            "milestones": [{"id": 1, "title": "a", "completed": true}],
            "status": "not_started"
        }))
        .unwrap();
        goal.normalize();
        assert_eq!(goal.status, GoalStatus::Completed);
    }

    #[test]
    fn test_sorting() {
        let clock = ticking_clock();
        let mut goals = vec![];
        let b = add_goal(
            &mut goals,
            GoalDraft {
                title: "beta".into(),
                deadline: NaiveDate::from_ymd_opt(2025, 1, 1),
                ..Default::default()
            },
            &clock,
        )
        .unwrap();
        add_goal(&mut goals, draft("Alpha"), &clock).unwrap();
        let c = add_goal(
            &mut goals,
            GoalDraft {
                title: "gamma".into(),
                deadline: NaiveDate::from_ymd_opt(2024, 6, 1),
                ..Default::default()
            },
            &clock,
        )
        .unwrap();
        let m = add_milestone(&mut goals, b, "only", &clock).unwrap();
        toggle_milestone(&mut goals, b, m).unwrap();

        sort_goals(&mut goals, GoalSort::Title);
        let titles = goals.iter().map(|v| v.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["Alpha", "beta", "gamma"]);

        sort_goals(&mut goals, GoalSort::Deadline);
        let titles = goals.iter().map(|v| v.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["gamma", "beta", "Alpha"]);

        sort_goals(&mut goals, GoalSort::Progress);
        assert_eq!(goals[0].id, b);
        assert_ne!(goals[0].id, c);
    }
}
