use anyhow::Result;
use clap::Subcommand;

use crate::trackers::projects::{
    add_project, add_task, remove_project, remove_task, set_status, sort_projects,
    task_progress, toggle_task, Project, ProjectSort, ProjectStatus,
};

use super::{
    output::{checkbox, Painter},
    Session,
};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(about = "List projects with their tasks")]
    List {
        #[arg(long, value_enum, default_value_t)]
        sort: ProjectSort,
    },
    #[command(about = "Create a project")]
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    #[command(about = "Change status of a project")]
    Status {
        id: u64,
        #[arg(value_enum)]
        status: ProjectStatus,
    },
    #[command(about = "Add a task to a project")]
    AddTask { project: u64, title: String },
    #[command(about = "Mark a task as done, or undone if it already is")]
    ToggleTask { project: u64, task: u64 },
    #[command(about = "Delete a task")]
    RemoveTask { project: u64, task: u64 },
    #[command(about = "Delete a project")]
    Remove { id: u64 },
}

pub async fn process_project_command(command: ProjectCommand, session: &Session) -> Result<()> {
    let mut projects = session.open::<Project>().await?;
    let clock = session.clock.as_ref();
    match command {
        ProjectCommand::List { sort } => {
            let mut items = projects.items().to_vec();
            sort_projects(&mut items, sort);
            print_projects(&items, &session.painter);
        }
        ProjectCommand::Add { name, description } => {
            let id = projects
                .update(|v| Ok(add_project(v, &name, &description, clock)?))
                .await?;
            println!("Added project {id}");
        }
        ProjectCommand::Status { id, status } => {
            projects.update(|v| Ok(set_status(v, id, status)?)).await?;
            println!("Project {id} is now {}", status.label());
        }
        ProjectCommand::AddTask { project, title } => {
            let id = projects
                .update(|v| Ok(add_task(v, project, &title, clock)?))
                .await?;
            println!("Added task {id}");
        }
        ProjectCommand::ToggleTask { project, task } => {
            let done = projects
                .update(|v| Ok(toggle_task(v, project, task)?))
                .await?;
            println!("Task {task} is {}", if done { "done" } else { "open" });
        }
        ProjectCommand::RemoveTask { project, task } => {
            projects
                .update(|v| Ok(remove_task(v, project, task)?))
                .await?;
            println!("Removed task {task}");
        }
        ProjectCommand::Remove { id } => {
            let removed = projects.update(|v| Ok(remove_project(v, id)?)).await?;
            println!("Removed project \"{}\"", removed.name);
        }
    }
    Ok(())
}

fn paint_status(status: ProjectStatus, painter: &Painter) -> String {
    match status {
        ProjectStatus::Planning => painter.dim(status.label()),
        ProjectStatus::Active => painter.warn(status.label()),
        ProjectStatus::OnHold => painter.bad(status.label()),
        ProjectStatus::Completed => painter.good(status.label()),
    }
}

fn print_projects(projects: &[Project], painter: &Painter) {
    if projects.is_empty() {
        println!("{}", painter.dim("No projects"));
        return;
    }
    for project in projects {
        println!(
            "{}\t{}\t{}\t{}",
            project.id,
            painter.heading(&project.name),
            paint_status(project.status, painter),
            task_progress(project)
        );
        if !project.description.is_empty() {
            println!("\t{}", painter.dim(&project.description));
        }
        for task in &project.tasks {
            println!("\t{}\t{} {}", task.id, checkbox(task.done), task.title);
        }
    }
}

pub fn summary_line(projects: &[Project]) -> String {
    let active = projects
        .iter()
        .filter(|v| v.status == ProjectStatus::Active)
        .count();
    let completed = projects
        .iter()
        .filter(|v| v.status == ProjectStatus::Completed)
        .count();
    format!(
        "{} projects, {active} active, {completed} completed",
        projects.len()
    )
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        cli::test_support::run,
        storage::{collection::CollectionStore, synced::Synced},
        trackers::projects::{Project, ProjectStatus},
    };

    use super::summary_line;

    #[tokio::test]
    async fn test_project_commands_on_collection_backend() -> Result<()> {
        let dir = tempdir()?;
        run(
            dir.path(),
            &["projects", "add", "Kitchen", "-d", "new tiles", "--backend", "collection"],
        )
        .await?;

        let store = CollectionStore::new(dir.path().join("collections"))?;
        let project = Synced::<Project, _>::load(&store, "projects").await?.items()[0].clone();
        let id = project.id.to_string();

        run(
            dir.path(),
            &["projects", "add-task", id.as_str(), "Buy tiles", "--backend", "collection"],
        )
        .await?;
        run(
            dir.path(),
            &["projects", "status", id.as_str(), "active", "--backend", "collection"],
        )
        .await?;
        run(
            dir.path(),
            &["projects", "list", "--sort", "status", "--backend", "collection"],
        )
        .await?;

        let projects = Synced::<Project, _>::load(&store, "projects").await?;
        assert_eq!(projects.items()[0].status, ProjectStatus::Active);
        assert_eq!(projects.items()[0].tasks.len(), 1);
        assert_eq!(
            summary_line(projects.items()),
            "1 projects, 1 active, 0 completed"
        );
        Ok(())
    }
}
