//! Core library entry for the `koinon-graph` CLI.
//!
//! Extracts an architecture graph from the Koinon C# backend, merges it
//! with the frontend graph, checks API contract conventions and maintains
//! a semantic code index for architecture validation.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod contracts;
pub mod error;
pub mod extract;
pub mod graph;
pub mod ports;
pub mod rag;

use std::process::ExitCode;

use clap::Parser;

/// Run the CLI with the provided arguments and return the process exit code.
///
/// Help and version requests print to stdout and succeed; any other
/// argument error is a usage error.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                error::GraphError::Usage(err.to_string()).exit_code()
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match commands::dispatch(&cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            err.exit_code()
        }
    }
}
