/*
[INPUT]:  CLI arguments, YAML configuration file
[OUTPUT]: Board mutations against a live task server, board printed by column
[POS]:    Binary entry point
[UPDATE]: When changing CLI commands, flags, or startup flow
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use taskboard_adapter::{CreateTaskRequest, Priority, TaskPatch, TaskboardClient};
use taskboard_core::{BoardConfig, BoardError, BoardSnapshot, TaskBoard, TaskWorkflow};

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Kanban task board client")]
struct Cli {
    /// Config file; defaults to <config dir>/taskboard/config.yaml when present
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    /// API root, e.g. http://localhost:8080/api
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,
    #[arg(long = "log-level", value_name = "LEVEL")]
    log_level: Option<String>,
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board
    List,
    /// Create a task
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// TODO, "In Progress" or Done
        #[arg(long)]
        status: Option<String>,
        /// Low, Medium or High
        #[arg(long)]
        priority: Option<String>,
    },
    /// Change fields of a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Move a task to another column
    Move { id: String, status: String },
    /// Delete a task
    Delete { id: String },
}

impl Cli {
    fn apply_overrides(&self, config: &mut BoardConfig) {
        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = BoardConfig::load(args.config_path.as_deref()).context("load config")?;
    args.apply_overrides(&mut config);
    config.validate().context("validate config")?;

    let _log_guard = init_tracing(&config.logging.level, config.logging.file.as_deref())?;
    info!(base_url = %config.server.base_url, "starting taskboard");

    let client =
        TaskboardClient::with_config_and_base_url(config.client_config(), &config.server.base_url)
            .context("build task client")?;
    let board = TaskBoard::new(client);
    let _subscription = board.subscribe(|snapshot| {
        debug!(
            revision = snapshot.revision,
            tasks = snapshot.len(),
            pending = snapshot.pending.len(),
            "board changed"
        );
    });

    if let Err(err) = board.load().await {
        print_page_error(&board.snapshot());
        return Err(anyhow::Error::new(err).context("load board"));
    }

    match args.command.unwrap_or(Command::List) {
        Command::List => {}
        Command::Add {
            title,
            description,
            status,
            priority,
        } => {
            let mut req = CreateTaskRequest::new(title);
            if let Some(description) = description {
                req = req.with_description(description);
            }
            if let Some(status) = status {
                req = req.with_status(TaskWorkflow::parse(&status).map_err(report)?);
            }
            if let Some(priority) = priority {
                req = req.with_priority(parse_priority(&priority)?);
            }
            let task = board.create_task(req).await.map_err(report)?;
            println!("Created {}", task.id);
        }
        Command::Edit {
            id,
            title,
            description,
            priority,
        } => {
            let patch = TaskPatch {
                title,
                description,
                priority: priority.as_deref().map(parse_priority).transpose()?,
                ..TaskPatch::default()
            };
            if patch.is_empty() {
                anyhow::bail!("nothing to change: pass --title, --description or --priority");
            }
            let task = board.update_task(&id, patch).await.map_err(report)?;
            println!("Updated {}", task.id);
        }
        Command::Move { id, status } => {
            let task = board.move_task(&id, status.as_str()).await.map_err(report)?;
            println!("Moved {} to {}", task.id, task.status);
        }
        Command::Delete { id } => {
            board.delete_task(&id).await.map_err(report)?;
            println!("Deleted {id}");
        }
    }

    print_board(&board.snapshot());
    Ok(())
}

fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().context("log file path has no file name")?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            builder
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|err| anyhow!(err))
                .context("initialize tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|err| anyhow!(err))
                .context("initialize tracing subscriber")?;
            Ok(None)
        }
    }
}

fn parse_priority(raw: &str) -> Result<Priority> {
    raw.parse::<Priority>()
        .map_err(|err| report(BoardError::from(err)))
}

fn report(err: BoardError) -> anyhow::Error {
    let message = err.user_message();
    anyhow!(err).context(message)
}

fn print_page_error(snapshot: &BoardSnapshot) {
    if let Some(page) = &snapshot.page_error {
        eprintln!("{}", page.message.title);
        eprintln!("{}", page.message.subtitle);
    }
}

fn print_board(snapshot: &BoardSnapshot) {
    for column in snapshot.columns() {
        println!("{} ({})", column.status, column.tasks.len());
        for task in column.tasks {
            println!("  [{}] {} ({})", task.id, task.title, task.priority);
            if !task.description.is_empty() {
                println!("      {}", task.description);
            }
        }
    }
}
