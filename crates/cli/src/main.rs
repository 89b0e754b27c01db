// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ci: command-line client for the ci daemon.

mod client;
mod client_queries;
mod color;
mod commands;
mod env;
mod exit_error;
mod output;
mod table;

use clap::{Parser, Subcommand};

use crate::commands::{daemon, job, list, log};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "ci",
    version,
    about = "Heartbeat-driven continuous integration",
    styles = color::styles()
)]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start tracking a project
    Add {
        /// Job name, also the workspace directory
        name: String,
        /// Remote repository URL
        remote: String,
        /// Branch to follow
        branch: String,
    },
    /// Stop tracking a project and delete its workspace
    Remove {
        /// Job name
        name: String,
    },
    /// List every job with its status
    List,
    /// Show the refresh and build output of a job
    Log {
        /// Job name
        name: String,
        /// Keep polling and print new output as it arrives
        #[arg(long)]
        tail: bool,
    },
    /// Signal that new commits may be available
    Heartbeat,
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

fn main() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => exit_with(e.into()),
    };
    if let Err(e) = runtime.block_on(run(cli)) {
        exit_with(e);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = cli.output;
    match cli.command {
        Commands::Add { name, remote, branch } => job::add(&name, &remote, &branch, format).await,
        Commands::Remove { name } => job::remove(&name, format).await,
        Commands::List => list::list(format).await,
        Commands::Log { name, tail } => log::log(&name, tail, format).await,
        Commands::Heartbeat => job::heartbeat(format).await,
        Commands::Daemon(args) => daemon::daemon(args, format).await,
    }
}

fn exit_with(e: anyhow::Error) -> ! {
    if let Some(exit) = e.downcast_ref::<ExitError>() {
        if !exit.message.is_empty() {
            eprintln!("{}", exit.message);
        }
        std::process::exit(exit.code);
    }
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
