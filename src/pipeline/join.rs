use crate::error::Result;
use crate::pipeline::fetch::FetchedTables;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::{RecordBatch, RecordBatchReader};
use bytes::Bytes;
use datafusion::datasource::MemTable;
use datafusion::prelude::SessionContext;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::sync::Arc;
use tracing::debug;

/// The one query this job exists to run: realtime stop-time updates joined
/// against the stop, route and trip tables of the timetable export.
///
/// Mixed-case and dotted column names follow the upstream updates export and
/// have to be quoted — the engine folds unquoted identifiers to lower case.
/// The inner joins drop updates whose stop, route or trip id has no match;
/// that row-dropping is part of the published feed's contract.
const FEED_QUERY: &str = r#"
    SELECT
        stops.stop_name,
        updates."StopSequence",
        updates.start_datetime,
        updates.platform,
        updates."Arrival.Delay",
        updates."Departure.Delay",
        routes.route_short_name,
        trips.trip_headsign
    FROM stops
    JOIN updates ON stops.stop_id = updates."StopId"
    JOIN routes ON updates.route_id = routes.route_id
    JOIN trips ON updates.trip_id = trips.trip_id
"#;

/// The joined feed, fully materialized. The schema is carried separately so
/// an empty result still serializes to a schema-bearing Parquet file.
pub struct JoinedFeed {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl JoinedFeed {
    pub fn row_count(&self) -> usize {
        self.batches.iter().map(|batch| batch.num_rows()).sum()
    }
}

/// Runs the feed query over the four fetched tables in an embedded
/// DataFusion session and materializes the result.
pub async fn join_feed(tables: &FetchedTables) -> Result<JoinedFeed> {
    let ctx = SessionContext::new();
    register_parquet_buffer(&ctx, "stops", &tables.stops)?;
    register_parquet_buffer(&ctx, "routes", &tables.routes)?;
    register_parquet_buffer(&ctx, "trips", &tables.trips)?;
    register_parquet_buffer(&ctx, "updates", &tables.updates)?;

    let frame = ctx.sql(FEED_QUERY).await?;
    let schema: SchemaRef = Arc::new(frame.schema().into());
    let batches = frame.collect().await?;

    Ok(JoinedFeed { schema, batches })
}

/// Decodes one Parquet buffer and registers it as an in-memory table. The
/// declared column types pass through the reader untouched.
fn register_parquet_buffer(ctx: &SessionContext, table: &str, data: &Bytes) -> Result<()> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data.clone())?.build()?;
    let schema = reader.schema();
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(
        "Registered table '{}' ({} batches, {} columns)",
        table,
        batches.len(),
        schema.fields().len()
    );

    let provider = MemTable::try_new(schema, vec![batches])?;
    ctx.register_table(table, Arc::new(provider))?;
    Ok(())
}
