mod client;
mod input;
mod tui;

use anyhow::{anyhow, Result};
use clap::Parser;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskdeck_core::{
    sort_tasks, CreateTaskRequest, Task, TaskId, TaskStatus, UpdateTaskRequest, UserId,
};

use crate::client::HttpTaskClient;
use crate::input::parse_task_input;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Personal task tracker client", long_about = None)]
struct Cli {
    /// Base URL of taskdeck-server
    #[arg(
        long,
        env = "TASKDECK_URL",
        default_value = "http://127.0.0.1:8080",
        global = true
    )]
    url: String,
    /// Your user id, as issued by the identity provider
    #[arg(long, env = "TASKDECK_USER", global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List tasks, pending first (usage: list)
    List,
    /// Add a new task (usage: add Buy milk desc: two litres)
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// Rename a task
    Edit {
        id: String,
        #[arg(trailing_var_arg = true, required = true)]
        title: Vec<String>,
    },
    /// Mark a task completed
    Done { id: String },
    /// Move a completed task back to pending
    Reopen { id: String },
    /// Delete a task
    Rm { id: String },
    /// Open the Terminal User Interface
    Tui,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "St")]
    status: &'static str,
    #[tabled(rename = "Task")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Added")]
    created: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        let id = task.id.as_str();
        let short_id = id.get(..8).unwrap_or(id);
        Self {
            id: short_id.to_string(),
            status: match task.status {
                TaskStatus::Pending => "☐",
                TaskStatus::Completed => "✔",
            },
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_else(|| "-".to_string()),
            created: task.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn required_user(user: Option<&UserId>) -> Result<UserId> {
    user.cloned()
        .ok_or_else(|| anyhow!("a user id is required: pass --user or set TASKDECK_USER"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let user = cli
        .user
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(UserId::new);
    let client = HttpTaskClient::new(&cli.url, user.clone())?;
    let runtime = tokio::runtime::Runtime::new()?;

    let command = cli.command.unwrap_or(Commands::Tui);
    if let Commands::Tui = command {
        let user = required_user(user.as_ref())?;
        return tui::run(client, user, runtime.handle().clone());
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    runtime.block_on(run_command(&client, user.as_ref(), command))
}

async fn run_command(
    client: &HttpTaskClient,
    user: Option<&UserId>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::List => {
            let mut tasks = client.list_tasks().await?;
            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }
            sort_tasks(&mut tasks);
            let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        Commands::Add { args } => {
            let user = required_user(user)?;
            let parsed = parse_task_input(&args);
            if parsed.title.trim().is_empty() {
                println!("Error: Task title is required.");
                return Ok(());
            }
            let mut request = CreateTaskRequest::new(parsed.title, user.as_str());
            request.description = parsed.description;

            let task = client.create_task(&request).await?;
            println!("Task added: {} (ID: {})", task.title, task.id);
            if let Some(desc) = &task.description {
                println!("  Description: {desc}");
            }
        }
        Commands::Edit { id, title } => {
            let request = UpdateTaskRequest::title(title.join(" "));
            let task = client.update_task(&TaskId::new(id), &request).await?;
            println!("Task renamed: {} (ID: {})", task.title, task.id);
        }
        Commands::Done { id } => {
            let task = client.complete_task(&TaskId::new(id)).await?;
            println!("Completed: {}", task.title);
        }
        Commands::Reopen { id } => {
            let task = client
                .set_status(&TaskId::new(id), TaskStatus::Pending)
                .await?;
            println!("Reopened: {}", task.title);
        }
        Commands::Rm { id } => {
            let id = TaskId::new(id);
            client.delete_task(&id).await?;
            println!("Deleted task {id}");
        }
        Commands::Tui => {}
    }
    Ok(())
}
