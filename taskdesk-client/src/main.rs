//! # TaskDesk CLI
//!
//! Command-line front end for the TaskDesk task service.
//!
//! ## Usage
//!
//! ```bash
//! taskdesk login --email user@example.com --password secret
//! taskdesk create --title "Write spec" --priority high --due 2024-03-14
//! taskdesk list --status todo
//! taskdesk update <id> --status completed
//! taskdesk delete <id>
//! taskdesk logout
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use taskdesk_client::{
    api::ApiClient,
    auth,
    config::ClientConfig,
    notification::{self, NotificationReceiver},
    presentation,
    repository::{HttpTaskRepository, TaskRepository},
    view_model::{TaskViewModel, ViewState},
};
use taskdesk_shared::models::task::{Task, TaskFields, TaskPriority, TaskStatus};
use taskdesk_shared::models::user::Credentials;
use taskdesk_shared::session::{FileTokenStorage, SessionStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Personal task manager backed by a remote task service.
#[derive(Parser, Debug)]
#[command(name = "taskdesk", version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and remember the session.
    Login(CredentialArgs),

    /// Create an account and sign in.
    Register(CredentialArgs),

    /// Forget the stored session.
    Logout,

    /// Show whether a session is stored.
    Whoami,

    #[command(flatten)]
    Task(TaskCommand),
}

/// Commands that need a signed-in session.
#[derive(Subcommand, Debug)]
enum TaskCommand {
    /// List tasks with the given status.
    List {
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
    },

    /// Create a task.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        /// YYYY-MM-DD or an RFC 3339 timestamp.
        #[arg(long, value_parser = presentation::parse_due_date)]
        due: DateTime<Utc>,
    },

    /// Edit a task; omitted fields keep their current value.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(long, value_parser = presentation::parse_due_date)]
        due: Option<DateTime<Utc>>,
    },

    /// Delete a task.
    Delete { id: String },
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
}

impl From<CredentialArgs> for Credentials {
    fn from(args: CredentialArgs) -> Self {
        Credentials::new(args.email, args.password)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing (stderr, so stdout stays clean for output)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdesk_client=info,taskdesk_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env()?;
    tracing::debug!(api = %config.api.base_url, "configuration loaded");

    let storage = Arc::new(FileTokenStorage::new(config.session.file.clone()));
    let session = Arc::new(SessionStore::restore(storage).await?);
    let api = ApiClient::new(&config.api, session.clone())?;

    run(cli.cmd, api, session).await
}

async fn run(
    cmd: Command,
    api: ApiClient,
    session: Arc<SessionStore>,
) -> anyhow::Result<ExitCode> {
    match cmd {
        Command::Login(args) => {
            let user = auth::sign_in(&api, &session, &args.into()).await?;
            println!("Signed in as {}", user.email);
            Ok(ExitCode::SUCCESS)
        }
        Command::Register(args) => {
            let user = auth::sign_up(&api, &session, &args.into()).await?;
            println!("Registered and signed in as {}", user.email);
            Ok(ExitCode::SUCCESS)
        }
        Command::Logout => {
            auth::sign_out(&session).await?;
            println!("Signed out");
            Ok(ExitCode::SUCCESS)
        }
        Command::Whoami => {
            if session.is_authenticated().await {
                println!("Signed in");
            } else {
                println!("Not signed in");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Task(task_cmd) => {
            if !session.is_authenticated().await {
                anyhow::bail!("Not signed in. Run `taskdesk login` first.");
            }
            run_task_command(task_cmd, api).await
        }
    }
}

async fn run_task_command(cmd: TaskCommand, api: ApiClient) -> anyhow::Result<ExitCode> {
    let (tx, mut rx) = notification::channel();
    let mut vm = TaskViewModel::new(HttpTaskRepository::new(api), tx);
    vm.load().await;

    let ok = match cmd {
        TaskCommand::List { status } => {
            if vm.set_filter(status).is_ok() {
                render(&vm, &mut rx);
            } else {
                flush_notifications(&mut rx);
            }
            !matches!(vm.state(), ViewState::Error(_))
        }
        TaskCommand::Create {
            title,
            description,
            status,
            priority,
            due,
        } => {
            let fields = TaskFields::new(title, due)
                .with_description(description)
                .with_status(status)
                .with_priority(priority);

            let saved = vm.create_or_update(&fields, None).await.is_ok();
            if saved && vm.set_filter(status).is_ok() {
                render(&vm, &mut rx);
            } else {
                flush_notifications(&mut rx);
            }
            saved
        }
        TaskCommand::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let current = match find_for_update(&vm, &id) {
                Ok(task) => task,
                Err(message) => {
                    flush_notifications(&mut rx);
                    anyhow::bail!(message);
                }
            };

            let mut fields = TaskFields::from(current);
            if let Some(title) = title {
                fields.title = title;
            }
            if let Some(description) = description {
                fields.description = description;
            }
            if let Some(status) = status {
                fields.status = status;
            }
            if let Some(priority) = priority {
                fields.priority = priority;
            }
            if let Some(due) = due {
                fields.due_date = due;
            }

            let saved = vm.create_or_update(&fields, Some(&id)).await.is_ok();
            if saved && vm.set_filter(fields.status).is_ok() {
                render(&vm, &mut rx);
            } else {
                flush_notifications(&mut rx);
            }
            saved
        }
        TaskCommand::Delete { id } => {
            let deleted = vm.delete_task(&id).await.is_ok();
            if deleted {
                render(&vm, &mut rx);
            } else {
                flush_notifications(&mut rx);
            }
            deleted
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Looks up the task an `update` starts from
///
/// A failed load is reported as itself rather than as a missing task.
fn find_for_update<'a, R: TaskRepository>(
    vm: &'a TaskViewModel<R>,
    id: &str,
) -> Result<&'a Task, String> {
    match vm.state() {
        ViewState::Error(message) => Err(format!("Could not load tasks: {}", message)),
        _ => vm.find(id).ok_or_else(|| format!("Task {} not found", id)),
    }
}

fn render<R: TaskRepository>(vm: &TaskViewModel<R>, rx: &mut NotificationReceiver) {
    flush_notifications(rx);
    println!("{}", presentation::render_filter_bar(vm.filter()));
    println!("{}", presentation::render_list(&vm.list_view(), Utc::now()));
}

fn flush_notifications(rx: &mut NotificationReceiver) {
    for note in notification::drain(rx) {
        if note.is_error() {
            eprintln!("{}", presentation::render_notification(&note));
        } else {
            println!("{}", presentation::render_notification(&note));
        }
    }
}
