use std::path::Path;

use book_pricer::config::fetch_config;
use book_pricer::{BookController, PricerError, feed};
use tokio::io::{AsyncBufRead, BufReader, BufWriter};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), PricerError> {
    // Logs go to stderr so stdout carries nothing but quotes.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let app_config = fetch_config(std::env::args().skip(1))?;
    let mut book = BookController::new(app_config.target_size)?;

    info!(
        target_size = app_config.target_size,
        input = ?app_config.input,
        "Starting pricer"
    );

    let reader = open_input(app_config.input.as_deref()).await?;
    let mut writer = BufWriter::new(tokio::io::stdout());
    feed::run(reader, &mut writer, &mut book).await?;

    Ok(())
}

/// Opens the feed file, or stdin when no path was configured.
async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin>, PricerError> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    })
}
