//! Inventory example

use uhfkit::{Reader, ReaderConfig, WorkMode};

#[tokio::main]
async fn main() -> uhfkit::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let port = std::env::var("UHFKIT_PORT").unwrap_or_else(|_| "COM4".to_string());

    // One second of listening per read
    let config = ReaderConfig {
        inventory_window_ms: 1_000,
        ..ReaderConfig::for_port(port)
    };

    let mut reader = Reader::from_config(config);
    reader.connect().await?;

    if reader.query_work_mode().await? != Some(WorkMode::Response) {
        println!("Switching to response mode...");
        reader.set_work_mode(WorkMode::Response).await?;
    }

    let report = reader.read_inventory_default().await?;

    println!("{}", report);
    for antenna in report.antennas() {
        println!("Antenna {}:", antenna);
        for tag in report.antenna(antenna) {
            println!("  {}", tag);
        }
    }

    reader.close().await?;

    Ok(())
}
