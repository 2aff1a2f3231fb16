use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // stdout carries the JSON outcome line; logs go to stderr.
    let filter = EnvFilter::try_from_env("CAREWISE_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).compact().init();

    carewise_cli::run()
}
