use crate::constants::{timestamped_feed_key, FEED_CONTENT_TYPE, STABLE_FEED_KEY};
use crate::error::Result;
use crate::pipeline::join::JoinedFeed;
use crate::stores::Bucket;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use serde::Serialize;
use tracing::debug;

/// Destination keys and size written by one publish call.
#[derive(Debug, Serialize)]
pub struct PublishedSnapshot {
    pub stable_key: String,
    pub timestamped_key: String,
    pub bytes: usize,
}

/// Serializes the joined feed once and uploads the identical buffer under
/// the stable key and a timestamped key.
///
/// The stable key is written first. If the timestamped upload then fails,
/// the run fails with the stable key already overwritten — there is no
/// rollback, and callers must treat a failed run as possibly-updated.
pub async fn publish(
    feed: &JoinedFeed,
    public: &dyn Bucket,
    epoch_seconds: i64,
) -> Result<PublishedSnapshot> {
    let buffer = to_parquet_bytes(feed)?;
    let timestamped_key = timestamped_feed_key(epoch_seconds);
    debug!(
        "Publishing {} bytes to {}/{} and {}/{}",
        buffer.len(),
        public.name(),
        STABLE_FEED_KEY,
        public.name(),
        timestamped_key
    );

    public
        .put(STABLE_FEED_KEY, buffer.clone(), FEED_CONTENT_TYPE)
        .await?;
    public
        .put(&timestamped_key, buffer.clone(), FEED_CONTENT_TYPE)
        .await?;

    Ok(PublishedSnapshot {
        stable_key: STABLE_FEED_KEY.to_string(),
        timestamped_key,
        bytes: buffer.len(),
    })
}

/// Encodes the feed into a single Parquet buffer. An empty feed still
/// produces a valid file carrying the result schema.
pub fn to_parquet_bytes(feed: &JoinedFeed) -> Result<Bytes> {
    // Batches carry the physical schema; fall back to the logical one only
    // when the result has no batches at all.
    let schema = feed
        .batches
        .first()
        .map(|batch| batch.schema())
        .unwrap_or_else(|| feed.schema.clone());

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None)?;
    for batch in &feed.batches {
        writer.write(batch)?;
    }
    writer.close()?;

    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::sync::Arc;

    fn sample_feed() -> JoinedFeed {
        let schema = Arc::new(Schema::new(vec![
            Field::new("stop_name", DataType::Utf8, false),
            Field::new("Arrival.Delay", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Central", "Museum"])),
                Arc::new(Int64Array::from(vec![Some(60), None])),
            ],
        )
        .unwrap();
        JoinedFeed {
            schema,
            batches: vec![batch],
        }
    }

    #[test]
    fn serialized_feed_round_trips_without_loss() {
        let feed = sample_feed();
        let buffer = to_parquet_bytes(&feed).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(buffer)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], feed.batches[0]);
    }

    #[test]
    fn empty_feed_serializes_to_a_schema_bearing_file() {
        let feed = JoinedFeed {
            schema: sample_feed().schema,
            batches: vec![],
        };
        let buffer = to_parquet_bytes(&feed).unwrap();

        let builder = ParquetRecordBatchReaderBuilder::try_new(buffer).unwrap();
        assert_eq!(builder.schema().fields().len(), 2);
        let rows: usize = builder.build().unwrap().map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn uploads_identical_bytes_under_both_keys() {
        let feed = sample_feed();
        let public = crate::stores::ObjectBucket::in_memory("public-feed");

        let snapshot = publish(&feed, &public, 1_700_000_000).await.unwrap();
        assert_eq!(snapshot.stable_key, "current_feed.parquet");
        assert_eq!(snapshot.timestamped_key, "feed_1700000000.parquet");

        let stable = public.get("current_feed.parquet").await.unwrap();
        let timestamped = public.get("feed_1700000000.parquet").await.unwrap();
        assert_eq!(stable, timestamped);
        assert_eq!(stable.len(), snapshot.bytes);
    }
}
