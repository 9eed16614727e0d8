use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::utils::{
    clock::Clock,
    percentage::{count_percentage, Percentage},
};

use super::{find_mut, next_id, remove_by_id, required, TrackerError, TrackerKind, TrackerRecord};

/// Unlike goals, a project's status is set by hand.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::Active => "Active",
            ProjectStatus::OnHold => "On hold",
            ProjectStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTask {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub tasks: Vec<ProjectTask>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl TrackerRecord for Project {
    const KIND: TrackerKind = TrackerKind::Projects;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ProjectSort {
    #[default]
    Name,
    /// Newest first
    Created,
    Status,
}

const PROJECT: &str = "project";

pub fn add_project(
    projects: &mut Vec<Project>,
    name: &str,
    description: &str,
    clock: &dyn Clock,
) -> Result<u64, TrackerError> {
    let name = required("name", name)?;
    let id = next_id(projects.iter().map(|v| v.id), clock);
    projects.push(Project {
        id,
        name,
        description: description.trim().to_owned(),
        status: ProjectStatus::Planning,
        tasks: vec![],
        created_at: clock.time(),
    });
    Ok(id)
}

pub fn remove_project(projects: &mut Vec<Project>, id: u64) -> Result<Project, TrackerError> {
    remove_by_id(projects, PROJECT, id)
}

pub fn set_status(
    projects: &mut [Project],
    id: u64,
    status: ProjectStatus,
) -> Result<(), TrackerError> {
    find_mut(projects, PROJECT, id)?.status = status;
    Ok(())
}

pub fn add_task(
    projects: &mut [Project],
    project_id: u64,
    title: &str,
    clock: &dyn Clock,
) -> Result<u64, TrackerError> {
    let title = required("task title", title)?;
    let project = find_mut(projects, PROJECT, project_id)?;
    let id = next_id(project.tasks.iter().map(|v| v.id), clock);
    project.tasks.push(ProjectTask {
        id,
        title,
        done: false,
    });
    Ok(id)
}

/// Returns whether the task is done after toggling.
pub fn toggle_task(projects: &mut [Project], project_id: u64, task_id: u64) -> Result<bool, TrackerError> {
    let project = find_mut(projects, PROJECT, project_id)?;
    let task = project
        .tasks
        .iter_mut()
        .find(|v| v.id == task_id)
        .ok_or(TrackerError::NotFound {
            kind: "task",
            id: task_id,
        })?;
    task.done = !task.done;
    Ok(task.done)
}

pub fn remove_task(projects: &mut [Project], project_id: u64, task_id: u64) -> Result<(), TrackerError> {
    let project = find_mut(projects, PROJECT, project_id)?;
    let before = project.tasks.len();
    project.tasks.retain(|v| v.id != task_id);
    if project.tasks.len() == before {
        return Err(TrackerError::NotFound {
            kind: "task",
            id: task_id,
        });
    }
    Ok(())
}

pub fn task_progress(project: &Project) -> Percentage {
    count_percentage(
        project.tasks.iter().filter(|v| v.done).count(),
        project.tasks.len(),
    )
}

pub fn sort_projects(projects: &mut [Project], by: ProjectSort) {
    match by {
        ProjectSort::Name => projects.sort_by_key(|v| v.name.to_lowercase()),
        ProjectSort::Created => projects.sort_by_key(|v| Reverse((v.created_at, v.id))),
        ProjectSort::Status => projects.sort_by_key(|v| (v.status, v.name.to_lowercase())),
    }
}
