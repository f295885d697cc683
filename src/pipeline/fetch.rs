use crate::constants::{ROUTES_FILE, STOPS_FILE, TRIPS_FILE, UPDATES_FILE};
use crate::error::Result;
use crate::stores::Bucket;
use bytes::Bytes;
use tracing::debug;

/// The four Parquet buffers the join stage consumes.
///
/// Everything is held in memory for the duration of the run; the realtime
/// update volume for one agency's feed is bounded enough that no scratch
/// files are needed.
pub struct FetchedTables {
    pub stops: Bytes,
    pub routes: Bytes,
    pub trips: Bytes,
    pub updates: Bytes,
}

/// Downloads the three timetable files under the resolved directory, then
/// the realtime updates file. Strictly sequential; the first failure aborts
/// the run.
pub async fn fetch_tables(
    timetable: &dyn Bucket,
    stoptime: &dyn Bucket,
    directory: &str,
) -> Result<FetchedTables> {
    let stops = fetch_one(timetable, &format!("{directory}{STOPS_FILE}")).await?;
    let routes = fetch_one(timetable, &format!("{directory}{ROUTES_FILE}")).await?;
    let trips = fetch_one(timetable, &format!("{directory}{TRIPS_FILE}")).await?;
    let updates = fetch_one(stoptime, UPDATES_FILE).await?;

    Ok(FetchedTables {
        stops,
        routes,
        trips,
        updates,
    })
}

async fn fetch_one(bucket: &dyn Bucket, key: &str) -> Result<Bytes> {
    let data = bucket.get(key).await?;
    debug!("Downloaded {}/{} ({} bytes)", bucket.name(), key, data.len());
    Ok(data)
}
