//! Binary entrypoint for the `koinon-graph` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
    koinon_graph::run(std::env::args())
}
