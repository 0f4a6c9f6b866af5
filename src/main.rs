use std::{env, io, process};

use nscli::{cli, Error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "nscli=info".into()))
        .with_writer(io::stderr)
        .init();

    match cli::execute(env::args_os()).await {
        Ok(()) => {}
        Err(Error::Clap { source }) => source.exit(),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
