/// Object naming constants shared across the pipeline stages.
/// These names are a compatibility contract with the upstream timetable
/// exporter and with consumers of the public feed — do not change them.

// Source side: dated timetable exports and the realtime updates file
pub const TIMETABLE_DIR_PREFIX: &str = "gtfs_fp";
pub const TIMETABLE_DATE_FORMAT: &str = "%Y-%m-%d";

pub const STOPS_FILE: &str = "stops.parquet";
pub const ROUTES_FILE: &str = "routes.parquet";
pub const TRIPS_FILE: &str = "trips.parquet";
pub const UPDATES_FILE: &str = "stoptime_updates.parquet";

// Destination side: the published snapshot
pub const STABLE_FEED_KEY: &str = "current_feed.parquet";
pub const FEED_CONTENT_TYPE: &str = "application/octet-stream";

/// Destination key for the timestamped copy of the snapshot.
pub fn timestamped_feed_key(epoch_seconds: i64) -> String {
    format!("feed_{epoch_seconds}.parquet")
}
