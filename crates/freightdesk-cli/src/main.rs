mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{calls, deals, metrics, serve, Context};
use crate::error::{exit_code_for, report_error};
use freightdesk_config as config;
use freightdesk_store::{paths, Store};

#[derive(Debug, Parser)]
#[command(name = "freightdesk", version, about = "freightdesk call and deal ledger")]
struct Cli {
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve(serve::ServeArgs),
    #[command(subcommand)]
    Call(calls::CallCommand),
    #[command(subcommand)]
    Deal(deals::DealCommand),
    /// Print the dashboard metrics for the shipment catalog
    Metrics(metrics::MetricsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose, matches!(cli.command, Command::Serve(_)));
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        db_path,
        config: config_path,
        json,
        verbose,
        command,
    } = cli;

    let app_config = config::load(config_path.clone()).with_context(|| "load config")?;
    if verbose {
        match config::resolve_config_path(config_path) {
            Ok(path) if path.exists() => debug!(path = %path.display(), "config resolved"),
            Ok(path) => debug!(path = %path.display(), "config missing, using defaults"),
            Err(err) => debug!(error = %err, "config unavailable"),
        }
    }

    match command {
        Command::Serve(args) => serve::serve(db_path, &app_config, args),
        Command::Metrics(args) => metrics::show_metrics(&app_config, args, json),
        command => {
            let db_path =
                paths::resolve_db_path(db_path).with_context(|| "resolve database path")?;
            debug!(path = %db_path.display(), "database path resolved");

            let store = Store::open(&db_path)
                .with_context(|| format!("open database {}", db_path.display()))?;
            store.migrate().with_context(|| "run migrations")?;

            let ctx = Context {
                store: &store,
                json,
            };

            match command {
                Command::Call(cmd) => match cmd {
                    calls::CallCommand::Add(args) => calls::add_call(&ctx, args),
                    calls::CallCommand::List => calls::list_calls(&ctx),
                    calls::CallCommand::Show(args) => calls::show_call(&ctx, args),
                    calls::CallCommand::Edit(args) => calls::edit_call(&ctx, args),
                    calls::CallCommand::Rm(args) => calls::remove_call(&ctx, args),
                },
                Command::Deal(cmd) => match cmd {
                    deals::DealCommand::Add(args) => deals::add_deal(&ctx, args),
                    deals::DealCommand::List => deals::list_deals(&ctx),
                    deals::DealCommand::Show(args) => deals::show_deal(&ctx, args),
                    deals::DealCommand::Edit(args) => deals::edit_deal(&ctx, args),
                    deals::DealCommand::Rm(args) => deals::remove_deal(&ctx, args),
                },
                Command::Serve(_) | Command::Metrics(_) => {
                    unreachable!("handled before store initialization")
                }
            }
        }
    }
}

fn init_logging(verbose: bool, serving: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = fmt().with_env_filter(filter).with_target(false);
    let _ = if serving {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    };
}
