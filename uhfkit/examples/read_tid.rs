//! Read one TID
//!
//! ```text
//! UHFKIT_PORT=/dev/ttyUSB0 cargo run --example read_tid
//! UHFKIT_CONFIG=reader.toml cargo run --example read_tid
//! ```

use std::path::Path;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use uhfkit::{AcquireOptions, Acquisition, CancellationToken, Reader, ReaderConfig};

#[tokio::main]
async fn main() -> uhfkit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::var("UHFKIT_CONFIG") {
        Ok(path) => ReaderConfig::load(Path::new(&path))?,
        Err(_) => {
            let port = std::env::var("UHFKIT_PORT").unwrap_or_else(|_| "COM4".to_string());
            ReaderConfig::for_port(port)
        }
    };

    let mut reader = Reader::from_config(config.clone());
    reader.connect().await?;

    if !reader.enter_tid_mode().await? {
        eprintln!("Reader did not acknowledge TID mode, reading anyway");
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<uhfkit::TidProgress>();
    tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            println!("  {} ({}/{})", progress.tid, progress.count, progress.required);
        }
    });

    // Ctrl-C stops the acquisition early
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let options = AcquireOptions::from(&config)
        .with_progress(tx)
        .with_cancel(cancel);

    let outcome = reader.acquire_stable_tid(options).await;

    match &outcome {
        Ok(Acquisition::Confirmed(tid)) => println!("TID: {}", tid),
        Ok(Acquisition::Expired) => println!("No stable TID in time"),
        Ok(Acquisition::Cancelled) => println!("Cancelled"),
        Err(e) if e.requires_mode_reset() => println!("Reader is inventorying EPCs: {}", e),
        Err(e) => println!("Failed: {}", e),
    }

    reader.stop_inventory().await?;
    reader.close().await?;

    outcome.map(|_| ())
}
