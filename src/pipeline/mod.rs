// Snapshot pipeline: resolve, fetch, join, publish

pub mod fetch;
pub mod join;
pub mod publish;
pub mod resolve;

use crate::error::Result;
use crate::stores::Bucket;
use chrono::Utc;
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub use fetch::FetchedTables;
pub use join::JoinedFeed;
pub use publish::PublishedSnapshot;

/// Result of a complete snapshot run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub directory: String,
    pub joined_rows: usize,
    pub snapshot_bytes: usize,
    pub stable_key: String,
    pub timestamped_key: String,
}

/// Owns the store handles for one run and drives the stages in order.
///
/// Control flow is strictly sequential — resolve, fetch, join, publish —
/// and any stage error aborts the remainder of the run immediately. There
/// are no retries and no rollback of a partially published snapshot.
pub struct Pipeline {
    timetable: Arc<dyn Bucket>,
    stoptime: Arc<dyn Bucket>,
    public: Arc<dyn Bucket>,
}

impl Pipeline {
    pub fn new(
        timetable: Arc<dyn Bucket>,
        stoptime: Arc<dyn Bucket>,
        public: Arc<dyn Bucket>,
    ) -> Self {
        Self {
            timetable,
            stoptime,
            public,
        }
    }

    /// Run the complete pipeline once
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        info!("🚀 Starting snapshot run {}", run_id);
        println!("🚀 Starting snapshot run {run_id}");
        counter!("snapshot_runs_total").increment(1);
        let t_run = std::time::Instant::now();

        // Step 1: Resolve the newest timetable export
        info!("🔍 Resolving newest timetable export...");
        println!("🔍 Resolving newest timetable export...");
        let directory = resolve::resolve_newest_directory(self.timetable.as_ref()).await?;
        info!("✅ Using timetable export {}", directory);
        println!("✅ Using timetable export {directory}");

        // Step 2: Fetch the timetable files and the realtime updates
        info!("📥 Fetching timetable and realtime update files...");
        println!("📥 Fetching timetable and realtime update files...");
        let t_fetch = std::time::Instant::now();
        let tables = fetch::fetch_tables(
            self.timetable.as_ref(),
            self.stoptime.as_ref(),
            &directory,
        )
        .await?;
        histogram!("snapshot_fetch_duration_seconds").record(t_fetch.elapsed().as_secs_f64());
        info!("✅ Fetched 4 files");
        println!("✅ Fetched 4 files");

        // Step 3: Join updates against the timetable
        info!("🔧 Joining updates against the timetable...");
        println!("🔧 Joining updates against the timetable...");
        let t_join = std::time::Instant::now();
        let feed = join::join_feed(&tables).await?;
        histogram!("snapshot_join_duration_seconds").record(t_join.elapsed().as_secs_f64());
        histogram!("snapshot_joined_rows").record(feed.row_count() as f64);
        info!("✅ Joined {} rows", feed.row_count());
        println!("✅ Joined {} rows", feed.row_count());

        // Step 4: Publish under the stable and timestamped keys
        info!("💾 Publishing snapshot...");
        println!("💾 Publishing snapshot...");
        let published =
            publish::publish(&feed, self.public.as_ref(), Utc::now().timestamp()).await?;
        counter!("snapshot_published_bytes_total").increment(published.bytes as u64);
        info!(
            "💾 Published {} and {}",
            published.stable_key, published.timestamped_key
        );
        println!(
            "💾 Published {} and {}",
            published.stable_key, published.timestamped_key
        );

        histogram!("snapshot_run_duration_seconds").record(t_run.elapsed().as_secs_f64());

        Ok(RunSummary {
            run_id,
            directory,
            joined_rows: feed.row_count(),
            snapshot_bytes: published.bytes,
            stable_key: published.stable_key,
            timestamped_key: published.timestamped_key,
        })
    }
}
