//! Rollcall CLI - announce forum membership changes

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Parser;
use tracing::info;

use rollcall_core::config::{Config, Overrides, SettingsFile};
use rollcall_core::services::logging;
use rollcall_core::RollcallContext;

mod output;
mod summary;

/// Rollcall - watch a forum's user list and announce who came, left or renamed
#[derive(Parser)]
#[command(name = "rollcall", version, about, long_about = None)]
struct Cli {
    /// Posting credential
    #[arg(long, env = "ROLLCALL_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Snapshot file holding the previously seen users
    #[arg(long)]
    users_file: Option<PathBuf>,

    /// Seconds to wait between posts [default: 10]
    #[arg(long)]
    sleep: Option<u64>,

    /// Only announce new users registered at most this many seconds ago, 0 for all [default: 86400]
    #[arg(long)]
    added_max_timedelta: Option<u64>,

    /// Record the current users without diffing or posting
    #[arg(long)]
    first_run: bool,

    /// Log the messages instead of posting them
    #[arg(long)]
    no_post: bool,

    /// Forum API base URL [default: https://bnw.im/api/]
    #[arg(long, env = "ROLLCALL_API_URL")]
    api_url: Option<String>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            users_file: self.users_file.clone(),
            api_url: self.api_url.clone(),
            sleep: self.sleep,
            added_max_timedelta: self.added_max_timedelta,
            first_run: self.first_run,
            no_post: self.no_post,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("{}", Local::now().format("%d-%m-%Y %H:%M:%S"));

    let settings = SettingsFile::discover(cli.settings.as_deref())?;
    let config = Config::resolve(settings, cli.overrides())?;
    let ctx = RollcallContext::new(config)?;

    let report = ctx.run(Utc::now().timestamp())?;
    summary::print(&report, ctx.config());

    Ok(())
}
