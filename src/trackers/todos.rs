use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::clock::Clock;

use super::{find_mut, next_id, remove_by_id, required, TrackerError, TrackerKind, TrackerRecord};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Lower rank sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl TrackerRecord for Todo {
    const KIND: TrackerKind = TrackerKind::Todos;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TodoSort {
    #[default]
    Priority,
    Name,
    /// Newest first
    Created,
}

const TODO: &str = "to-do";

pub fn add_todo(
    todos: &mut Vec<Todo>,
    text: &str,
    priority: Priority,
    notes: &str,
    clock: &dyn Clock,
) -> Result<u64, TrackerError> {
    let text = required("text", text)?;
    let id = next_id(todos.iter().map(|v| v.id), clock);
    todos.push(Todo {
        id,
        text,
        priority,
        completed: false,
        notes: notes.trim().to_owned(),
        created_at: clock.time(),
    });
    Ok(id)
}

/// Returns whether the to-do is completed after toggling.
pub fn toggle_todo(todos: &mut [Todo], id: u64) -> Result<bool, TrackerError> {
    let todo = find_mut(todos, TODO, id)?;
    todo.completed = !todo.completed;
    Ok(todo.completed)
}

pub fn set_notes(todos: &mut [Todo], id: u64, notes: &str) -> Result<(), TrackerError> {
    find_mut(todos, TODO, id)?.notes = notes.trim().to_owned();
    Ok(())
}

pub fn set_priority(todos: &mut [Todo], id: u64, priority: Priority) -> Result<(), TrackerError> {
    find_mut(todos, TODO, id)?.priority = priority;
    Ok(())
}

pub fn remove_todo(todos: &mut Vec<Todo>, id: u64) -> Result<Todo, TrackerError> {
    remove_by_id(todos, TODO, id)
}

/// Drops every completed to-do and returns how many were removed.
pub fn clear_completed(todos: &mut Vec<Todo>) -> usize {
    let before = todos.len();
    todos.retain(|v| !v.completed);
    before - todos.len()
}

/// Priority ordering keeps older to-dos first inside the same rank.
pub fn sort_todos(todos: &mut [Todo], by: TodoSort) {
    match by {
        TodoSort::Priority => todos.sort_by_key(|v| (v.priority.rank(), v.created_at, v.id)),
        TodoSort::Name => todos.sort_by_key(|v| v.text.to_lowercase()),
        TodoSort::Created => todos.sort_by_key(|v| Reverse((v.created_at, v.id))),
    }
}
