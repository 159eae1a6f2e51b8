use std::io;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("REPERTOIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match repertoire::cli::run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("[repertoire error]: {err:#}");
            std::process::exit(1);
        }
    }
}
