// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};
use tracing::error;

use renderdeck::client::ManagerClient;
use renderdeck::config::ConsoleConfig;
use renderdeck::error::StagedFailure;
use renderdeck::events::EventBus;
use renderdeck::selection::SelectionStore;
use renderdeck::settings::SetupData;
use renderdeck::status::partition::partition;
use renderdeck::view::{StatusSnapshot, StatusView, TextView};
use renderdeck::worker::{SleepSchedule, WorkerAction};

/// Console client for a render-farm manager.
#[derive(Debug, Parser)]
#[command(name = "renderdeck", version, about)]
struct Cli {
    #[command(flatten)]
    config: ConsoleConfig,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow manager status continuously (the default).
    Watch,
    /// Fetch the status snapshot once and print it.
    Workers,
    /// Send a control action to one or more workers.
    Action {
        action: ActionArg,
        #[arg(required = true)]
        worker_ids: Vec<String>,
        /// Job ID, for forget-blacklist-line.
        #[arg(long)]
        job_id: Option<String>,
        /// Task type, for forget-blacklist-line.
        #[arg(long)]
        task_type: Option<String>,
    },
    /// Save a worker's sleep schedule.
    Schedule {
        worker_id: String,
        #[arg(long)]
        active: bool,
        /// Space-separated day abbreviations, e.g. "mo tu we".
        #[arg(long)]
        days: Option<String>,
        /// Sleep start time, "HH:MM". Empty means unset.
        #[arg(long)]
        start: Option<String>,
        /// Sleep end time, "HH:MM". Empty means unset.
        #[arg(long)]
        end: Option<String>,
    },
    /// Show or save the manager's settings document.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Inspect or start linking to a server.
    Link {
        #[command(subcommand)]
        command: LinkCommand,
    },
    /// Ask the manager to restart.
    Restart {
        /// Restart into setup mode instead of normal operation.
        #[arg(long)]
        to_setup: bool,
    },
    /// Kick the manager's task downloader.
    Kick,
    /// Print the log URL (or an authenticated curl command) for a task.
    Logfile {
        job_id: String,
        task_id: String,
        #[arg(long)]
        curl: bool,
    },
    /// Forget the cached auth token.
    #[command(hide = true)]
    ForgetToken,
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Fetch and print the settings document.
    Show,
    /// Upload a settings document from a YAML file.
    Save {
        file: std::path::PathBuf,
        /// Restart into setup mode after saving.
        #[arg(long)]
        restart: bool,
    },
}

#[derive(Debug, Subcommand)]
enum LinkCommand {
    /// Report whether the manager still needs to be linked.
    Status,
    /// Start the linking exchange against a server.
    Start {
        #[arg(long)]
        server: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActionArg {
    /// Shut down after the current task finishes.
    ShutdownLazy,
    /// Shut down immediately.
    Shutdown,
    /// Sleep after the current task finishes.
    SleepLazy,
    /// Sleep immediately.
    Sleep,
    /// Wake a sleeping worker.
    Wake,
    /// Acknowledge a timeout.
    AckTimeout,
    /// Send a test job.
    TestJob,
    /// Erase the worker from the manager.
    Forget,
    /// Remove a blacklist entry (needs --job-id and --task-type).
    ForgetBlacklistLine,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&cli.config);

    if let Err(e) = run(cli).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &ConsoleConfig) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).init();
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Watch);
    if let Command::Watch = command {
        return renderdeck::run_watch(cli.config).await;
    }

    let bus = EventBus::new();
    let client = renderdeck::build_client(&cli.config, &bus);

    match command {
        Command::Watch => unreachable!("handled above"),
        Command::Workers => workers_once(&cli.config, &client).await,
        Command::Action { action, worker_ids, job_id, task_type } => {
            let action = resolve_action(action, job_id, task_type)?;
            for worker_id in &worker_ids {
                match client
                    .with_auth_retry(|| client.worker_action(worker_id, &action))
                    .await
                {
                    Ok(resp) => println!("{worker_id}: {resp}"),
                    Err(e) => report(&format!("Unable to perform the action on {worker_id}"), &e),
                }
            }
            Ok(())
        }
        Command::Schedule { worker_id, active, days, start, end } => {
            let schedule = SleepSchedule {
                schedule_active: active,
                days_of_week: days.unwrap_or_default(),
                time_start: start,
                time_end: end,
            };
            match client
                .with_auth_retry(|| client.set_sleep_schedule(&worker_id, &schedule))
                .await
            {
                Ok(resp) => println!("Sleep schedule saved: {resp}"),
                Err(e) => report("Unable to save sleep schedule", &e),
            }
            Ok(())
        }
        Command::Settings { command } => settings(&client, command).await,
        Command::Link { command } => link(&client, command).await,
        Command::Restart { to_setup } => {
            match client.with_auth_retry(|| client.restart(to_setup)).await {
                Ok(()) => println!("Manager is restarting"),
                Err(e) => report("Unable to request a restart", &e),
            }
            Ok(())
        }
        Command::Kick => {
            match client.with_auth_retry(|| client.kick()).await {
                Ok(()) => println!("Task download kicked"),
                Err(e) => report("Unable to kick the task downloader", &e),
            }
            Ok(())
        }
        Command::Logfile { job_id, task_id, curl } => {
            if curl {
                println!("{}", client.logfile_curl_command(&job_id, &task_id).await);
            } else {
                println!("{}", client.logfile_url(&job_id, &task_id));
            }
            Ok(())
        }
        Command::ForgetToken => {
            client.broker().forget().await;
            Ok(())
        }
    }
}

async fn workers_once(config: &ConsoleConfig, client: &ManagerClient) -> anyhow::Result<()> {
    let mut info = client.with_auth_retry(|| client.fetch_status()).await?;
    let workers = info.workers.take();
    let (current, idle) = partition(workers, chrono::Utc::now(), config.stale_after());
    let selection = SelectionStore::new(config.state_dir());

    let mut view = TextView::new();
    view.render(&StatusSnapshot {
        info,
        current,
        idle,
        selected: selection.load_selected(),
        show_schedule: selection.show_schedule(),
    });
    Ok(())
}

async fn settings(client: &ManagerClient, command: SettingsCommand) -> anyhow::Result<()> {
    match command {
        SettingsCommand::Show => {
            let yaml = client
                .with_auth_retry(|| client.setup_data())
                .await
                .map_err(|e| anyhow::anyhow!("unable to load settings: {e}"))?;
            // Parse before printing so a broken document is reported, not echoed.
            let data = SetupData::parse(&yaml)?;
            for url in &data.own_urls {
                println!("# reachable on {url}");
            }
            print!("{yaml}");
            Ok(())
        }
        SettingsCommand::Save { file, restart } => {
            let yaml = std::fs::read_to_string(&file)?;
            if let Err(e) = SetupData::parse(&yaml) {
                anyhow::bail!("not saving, {}: {e}", file.display());
            }
            match client.with_auth_retry(|| client.save_setup_data(&yaml)).await {
                Ok(()) => {
                    if restart {
                        client
                            .with_auth_retry(|| client.restart(true))
                            .await
                            .map_err(|e| anyhow::anyhow!("settings saved, restart failed: {e}"))?;
                        println!("Configuration saved, manager restarting into setup mode");
                    } else {
                        println!("Configuration saved. Restart the manager to apply it.");
                    }
                }
                Err(e) => report("Unable to save settings", &e),
            }
            Ok(())
        }
    }
}

async fn link(client: &ManagerClient, command: LinkCommand) -> anyhow::Result<()> {
    match command {
        LinkCommand::Status => {
            let check = client
                .with_auth_retry(|| client.link_required())
                .await
                .map_err(|e| anyhow::anyhow!("link check failed: {e}"))?;
            if check.link_required {
                println!("This manager still needs to be linked to a server.");
            } else {
                match check.server_url {
                    Some(url) => println!("Linked to a server at {url}"),
                    None => println!("Linked to a server."),
                }
            }
            Ok(())
        }
        LinkCommand::Start { server } => {
            let start = client
                .with_auth_retry(|| client.link_start(&server))
                .await
                .map_err(|e| anyhow::anyhow!("linking could not start: {e}"))?;
            println!("Continue linking in a browser: {}", start.location);
            Ok(())
        }
    }
}

fn resolve_action(
    arg: ActionArg,
    job_id: Option<String>,
    task_type: Option<String>,
) -> anyhow::Result<WorkerAction> {
    Ok(match arg {
        ActionArg::ShutdownLazy => WorkerAction::ShutdownLazy,
        ActionArg::Shutdown => WorkerAction::ShutdownImmediate,
        ActionArg::SleepLazy => WorkerAction::SleepLazy,
        ActionArg::Sleep => WorkerAction::SleepImmediate,
        ActionArg::Wake => WorkerAction::WakeUp,
        ActionArg::AckTimeout => WorkerAction::AckTimeout,
        ActionArg::TestJob => WorkerAction::SendTestJob,
        ActionArg::Forget => WorkerAction::ForgetWorker,
        ActionArg::ForgetBlacklistLine => WorkerAction::ForgetBlacklistLine {
            job_id: job_id
                .ok_or_else(|| anyhow::anyhow!("forget-blacklist-line needs --job-id"))?,
            task_type: task_type
                .ok_or_else(|| anyhow::anyhow!("forget-blacklist-line needs --task-type"))?,
        },
    })
}

/// One-shot failure report, toast-style: the transport title when there is no
/// HTTP status, "Error {status}" plus the body otherwise.
fn report(transport_title: &str, staged: &StagedFailure) {
    use renderdeck::error::Stage;

    let failure = &staged.failure;
    match (staged.stage, failure.status) {
        (Stage::Token, _) => {
            eprintln!("Unable to obtain authorization token: {failure}");
        }
        (Stage::Request, Some(status)) => {
            eprintln!("Error {status}: {}", failure.message);
        }
        (Stage::Request, None) => {
            eprintln!("{transport_title}: is the manager still running & reachable?");
        }
    }
}
