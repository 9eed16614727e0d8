use anyhow::Result;
use clap::Subcommand;

use crate::trackers::todos::{
    add_todo, clear_completed, remove_todo, set_notes, set_priority, sort_todos, toggle_todo,
    Priority, Todo, TodoSort,
};

use super::{
    output::{checkbox, Painter},
    Session,
};

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    #[command(about = "List to-dos")]
    List {
        #[arg(long, value_enum, default_value_t)]
        sort: TodoSort,
        #[arg(long, help = "Hide completed to-dos")]
        pending: bool,
    },
    #[command(about = "Add a to-do")]
    Add {
        text: String,
        #[arg(short, long, value_enum, default_value_t)]
        priority: Priority,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    #[command(about = "Mark a to-do as done, or undone if it already is")]
    Done { id: u64 },
    #[command(about = "Replace notes of a to-do")]
    Notes { id: u64, notes: String },
    #[command(about = "Change priority of a to-do")]
    Priority {
        id: u64,
        #[arg(value_enum)]
        priority: Priority,
    },
    #[command(about = "Delete a to-do")]
    Remove { id: u64 },
    #[command(about = "Delete every completed to-do")]
    ClearCompleted,
}

pub async fn process_todo_command(command: TodoCommand, session: &Session) -> Result<()> {
    let mut todos = session.open::<Todo>().await?;
    let clock = session.clock.as_ref();
    match command {
        TodoCommand::List { sort, pending } => {
            let mut items = todos.items().to_vec();
            if pending {
                items.retain(|v| !v.completed);
            }
            sort_todos(&mut items, sort);
            print_todos(&items, &session.painter);
        }
        TodoCommand::Add {
            text,
            priority,
            notes,
        } => {
            let id = todos
                .update(|v| Ok(add_todo(v, &text, priority, &notes, clock)?))
                .await?;
            println!("Added to-do {id}");
        }
        TodoCommand::Done { id } => {
            let done = todos.update(|v| Ok(toggle_todo(v, id)?)).await?;
            println!("To-do {id} is {}", if done { "done" } else { "open" });
        }
        TodoCommand::Notes { id, notes } => {
            todos.update(|v| Ok(set_notes(v, id, &notes)?)).await?;
            println!("Updated notes of {id}");
        }
        TodoCommand::Priority { id, priority } => {
            todos.update(|v| Ok(set_priority(v, id, priority)?)).await?;
            println!("To-do {id} now has {} priority", priority.label());
        }
        TodoCommand::Remove { id } => {
            let removed = todos.update(|v| Ok(remove_todo(v, id)?)).await?;
            println!("Removed \"{}\"", removed.text);
        }
        TodoCommand::ClearCompleted => {
            let count = todos.update(|v| Ok(clear_completed(v))).await?;
            println!("Removed {count} completed to-dos");
        }
    }
    Ok(())
}

fn paint_priority(priority: Priority, painter: &Painter) -> String {
    let label = format!("{:<6}", priority.label());
    match priority {
        Priority::High => painter.bad(label),
        Priority::Medium => painter.warn(label),
        Priority::Low => painter.dim(label),
    }
}

fn print_todos(todos: &[Todo], painter: &Painter) {
    if todos.is_empty() {
        println!("{}", painter.dim("No to-dos"));
        return;
    }
    for todo in todos {
        let text = if todo.completed {
            painter.dim(&todo.text)
        } else {
            todo.text.clone()
        };
        print!(
            "{}\t{}\t{}\t{}",
            todo.id,
            checkbox(todo.completed),
            paint_priority(todo.priority, painter),
            text
        );
        if !todo.notes.is_empty() {
            print!("\t{}", painter.dim(&todo.notes));
        }
        println!();
    }
}

pub fn summary_line(todos: &[Todo]) -> String {
    let open = todos.iter().filter(|v| !v.completed).count();
    let high = todos
        .iter()
        .filter(|v| !v.completed && v.priority == Priority::High)
        .count();
    format!(
        "{open} open, {} done, {high} high priority",
        todos.len() - open
    )
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        cli::test_support::run,
        storage::{document::DocumentStore, synced::Synced},
        trackers::todos::{Priority, Todo},
    };

    use super::summary_line;

    #[tokio::test]
    async fn test_todo_commands() -> Result<()> {
        let dir = tempdir()?;
        run(dir.path(), &["todo", "add", "Call plumber", "-p", "high"]).await?;
        run(dir.path(), &["todo", "list", "--sort", "name"]).await?;

        let store = DocumentStore::new(dir.path().join("documents"))?;
        let todos = Synced::<Todo, _>::load(&store, "todos").await?;
        assert_eq!(todos.items().len(), 1);
        let todo = todos.items()[0].clone();
        assert_eq!(todo.priority, Priority::High);
        assert_eq!(summary_line(todos.items()), "1 open, 0 done, 1 high priority");

        let id = todo.id.to_string();
        run(dir.path(), &["todo", "done", id.as_str()]).await?;
        run(dir.path(), &["todo", "clear-completed"]).await?;
        let todos = Synced::<Todo, _>::load(&store, "todos").await?;
        assert!(todos.items().is_empty());

        assert!(run(dir.path(), &["todo", "remove", id.as_str()]).await.is_err());
        assert!(run(dir.path(), &["todo", "add", "  "]).await.is_err());
        Ok(())
    }
}
