use clap::Subcommand;

use super::open_app;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        /// Task text
        text: String,
    },
    /// List tasks as JSON, newest first
    List {
        /// Only tasks not yet completed
        #[arg(long, conflicts_with = "completed")]
        active: bool,
        /// Only completed tasks
        #[arg(long)]
        completed: bool,
    },
    /// Toggle a task between active and completed
    Toggle {
        /// Task ID
        id: u64,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: u64,
    },
    /// Remove all completed tasks
    ClearCompleted,
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app()?;

    match action {
        TaskAction::Add { text } => {
            app.add_task(&text)?;
            if let Some(task) = app.tasks().all().first() {
                println!("{}", serde_json::to_string_pretty(task)?);
            }
        }
        TaskAction::List { active, completed } => {
            let tasks = if active {
                app.tasks().active()
            } else if completed {
                app.tasks().completed()
            } else {
                app.tasks().all().iter().collect()
            };
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Toggle { id } => {
            app.toggle_task(id)?;
            if let Some(task) = app.tasks().get(id) {
                println!("{}", serde_json::to_string_pretty(task)?);
            }
        }
        TaskAction::Delete { id } => {
            app.delete_task(id)?;
            println!("{{\"deleted\": {id}}}");
        }
        TaskAction::ClearCompleted => {
            let cleared = app.tasks().completed().len();
            app.clear_completed_tasks();
            let remaining = app.tasks().all().len();
            println!("{{\"cleared\": {cleared}, \"remaining\": {remaining}}}");
        }
    }
    Ok(())
}
