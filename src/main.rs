#![allow(clippy::module_inception)]

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use log::{error, trace};
use xsqtools::pipeline::interrupt_token;
use xsqtools::XsqError;

/// Exit status of an interrupted conversion (128 + SIGINT)
const EXIT_INTERRUPTED: u8 = 130;

#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {
    // no-op
}

/// Only conversions poll the interrupt token; other commands keep the
/// default SIGINT behavior.
fn handles_interrupt(command: &Commands) -> bool {
    matches!(command, Commands::Convert(_))
}

fn dispatch(args: &Cli) -> Result<()> {
    match args.command {
        Commands::Info(ref info) => commands::info::run(info),
        Commands::List(ref list) => commands::list::run(list),
        Commands::Convert(ref convert) => {
            let cancel = interrupt_token();
            commands::convert::run(convert, &cancel)
        }
    }
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<XsqError>()
        .is_some_and(XsqError::is_cancelled)
}

fn main() -> ExitCode {
    reset_sigpipe();

    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_env("XSQTOOLS_LOG")
        .init();

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    trace!("init");
    match dispatch(&args) {
        Ok(()) => {
            trace!("done");
            ExitCode::SUCCESS
        }
        Err(err) if handles_interrupt(&args.command) && is_cancelled(&err) => {
            error!("Interrupted, no output was written for the current sample");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
