pub mod names;
pub mod report;
pub mod summaries;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use names::{process_names_command, NamesCommand};
use report::process_report_command;
use summaries::process_summaries_command;
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{args::DaemonArgs, start_daemon},
    utils::{
        dir::application_path,
        logging::{enable_logging, CLI_PREFIX, DAEMON_PREFIX},
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "wipwatch", version, long_about = None)]
#[command(about = "Samples user activity and turns it into billable work summaries", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Sample activity and summarize it until stopped")]
    Serve {
        #[arg(long, help = "Detach from the terminal and keep running in the background")]
        detach: bool,
        #[command(flatten)]
        daemon: DaemonArgs,
    },
    #[command(about = "Manage canonical client and project names")]
    Names {
        #[command(subcommand)]
        command: NamesCommand,
    },
    #[command(about = "Print the summaries stored for a day")]
    Summaries {
        #[arg(long, help = "Day to print, as YYYY-MM-DD. Defaults to today (UTC)")]
        date: Option<chrono::NaiveDate>,
    },
    #[command(about = "Group WIP entries by normalized client and project")]
    Report {
        #[arg(help = "JSON file holding an array of WIP entries")]
        entries: PathBuf,
    },
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let app_dir = application_path(args.dir)?;

    match args.commands {
        Commands::Serve { detach, daemon } => {
            if detach && detach_process()? {
                return Ok(());
            }
            enable_logging(DAEMON_PREFIX, &app_dir, logging_level, args.log)?;
            single_thread_runtime()?.block_on(start_daemon(app_dir, daemon))
        }
        Commands::Names { command } => {
            enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;
            single_thread_runtime()?.block_on(process_names_command(&app_dir, command))
        }
        Commands::Summaries { date } => {
            enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;
            single_thread_runtime()?.block_on(process_summaries_command(&app_dir, date))
        }
        Commands::Report { entries } => {
            enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;
            single_thread_runtime()?.block_on(process_report_command(&app_dir, &entries))
        }
    }
}

/// Forks into the background. Returns true in the parent, which should exit right away. Has to
/// run before any runtime or logging thread exists.
#[cfg(unix)]
fn detach_process() -> Result<bool> {
    use daemonize::Daemonize;

    let daemonize = Daemonize::new()
        .stdout(daemonize::Stdio::devnull())
        .stderr(daemonize::Stdio::devnull())
        .execute();
    match daemonize {
        daemonize::Outcome::Parent(parent) => {
            parent?;
            println!("Created daemon");
            Ok(true)
        }
        daemonize::Outcome::Child(child) => {
            child?;
            Ok(false)
        }
    }
}

#[cfg(not(unix))]
fn detach_process() -> Result<bool> {
    anyhow::bail!("--detach is only supported on Unix")
}

pub(crate) fn format_duration(v: chrono::Duration) -> String {
    if v.num_hours() > 0 {
        format!("{}h{}m", v.num_hours(), v.num_minutes() % 60)
    } else {
        format!("{}m", crate::utils::time::rounded_minutes(v))
    }
}
