use gtfs_snapshot::config::Config;
use gtfs_snapshot::error::Result;
use gtfs_snapshot::logging;
use gtfs_snapshot::pipeline::Pipeline;
use gtfs_snapshot::stores::{Bucket, ObjectBucket};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize logging
    logging::init_logging();

    // Local .env support; the real environment wins
    dotenv::dotenv().ok();

    // The program takes no arguments: one run to completion, or abort.
    if let Err(e) = run().await {
        error!("Snapshot run failed: {}", e);
        eprintln!("❌ Snapshot run failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;

    let timetable: Arc<dyn Bucket> =
        Arc::new(ObjectBucket::s3(&config.source, &config.timetable_bucket)?);
    let stoptime: Arc<dyn Bucket> =
        Arc::new(ObjectBucket::s3(&config.source, &config.stoptime_bucket)?);
    let public: Arc<dyn Bucket> =
        Arc::new(ObjectBucket::s3(&config.destination, &config.public_bucket)?);

    let pipeline = Pipeline::new(timetable, stoptime, public);
    let summary = pipeline.run().await?;

    info!(summary = %serde_json::to_string(&summary)?, "Snapshot run complete");
    println!("\n📊 Snapshot run complete:");
    println!("   Timetable export: {}", summary.directory);
    println!("   Joined rows: {}", summary.joined_rows);
    println!("   Snapshot size: {} bytes", summary.snapshot_bytes);
    println!(
        "   Published keys: {} / {}",
        summary.stable_key, summary.timestamped_key
    );

    Ok(())
}
