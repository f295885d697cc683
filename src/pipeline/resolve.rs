use crate::constants::{TIMETABLE_DATE_FORMAT, TIMETABLE_DIR_PREFIX};
use crate::error::{Result, SnapshotError};
use crate::stores::Bucket;
use chrono::NaiveDate;
use tracing::debug;

/// Picks the newest dated timetable export in the bucket.
///
/// Export directories are named like `gtfs_fp_2024-03-15/`; the date is the
/// last `_`-delimited token. Entries that do not carry the prefix or whose
/// suffix does not parse as a date are ignored. Equal dates fall back to the
/// lexicographically greatest full name, so the result never depends on
/// listing order.
pub async fn resolve_newest_directory(bucket: &dyn Bucket) -> Result<String> {
    let entries = bucket.list_dirs().await?;

    let mut candidates: Vec<(NaiveDate, String)> = Vec::new();
    for name in entries {
        if !name.starts_with(TIMETABLE_DIR_PREFIX) {
            continue;
        }
        let token = match name.rsplit('_').next() {
            Some(token) => token.trim_end_matches('/'),
            None => continue,
        };
        match NaiveDate::parse_from_str(token, TIMETABLE_DATE_FORMAT) {
            Ok(date) => candidates.push((date, name)),
            Err(_) => debug!("Ignoring entry without a date suffix: {}", name),
        }
    }

    match candidates.into_iter().max() {
        Some((date, name)) => {
            debug!("Resolved newest timetable export {} ({})", name, date);
            Ok(name)
        }
        None => Err(SnapshotError::Discovery(format!(
            "no timetable directories found in bucket '{}'",
            bucket.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;

    /// Listing-only bucket double; `get`/`put` are never reached from the
    /// resolver.
    struct StubBucket {
        dirs: Vec<&'static str>,
    }

    #[async_trait]
    impl Bucket for StubBucket {
        fn name(&self) -> &str {
            "stub"
        }

        async fn list_dirs(&self) -> Result<Vec<String>> {
            Ok(self.dirs.iter().map(|d| d.to_string()).collect())
        }

        async fn get(&self, _key: &str) -> Result<Bytes> {
            unreachable!("resolver never downloads")
        }

        async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> Result<()> {
            unreachable!("resolver never uploads")
        }
    }

    #[tokio::test]
    async fn picks_the_newest_date() {
        let bucket = StubBucket {
            dirs: vec![
                "gtfs_fp_2024-01-01/",
                "gtfs_fp_2024-03-15/",
                "gtfs_fp_2024-02-10/",
            ],
        };
        let newest = resolve_newest_directory(&bucket).await.unwrap();
        assert_eq!(newest, "gtfs_fp_2024-03-15/");
    }

    #[tokio::test]
    async fn ignores_foreign_prefixes_and_undated_entries() {
        let bucket = StubBucket {
            dirs: vec![
                "archive_2024-12-31/",
                "gtfs_fp_staging/",
                "gtfs_fp_2023-11-05/",
            ],
        };
        let newest = resolve_newest_directory(&bucket).await.unwrap();
        assert_eq!(newest, "gtfs_fp_2023-11-05/");
    }

    #[tokio::test]
    async fn equal_dates_break_lexicographically_on_the_full_name() {
        let bucket = StubBucket {
            dirs: vec![
                "gtfs_fp_b_2024-03-15/",
                "gtfs_fp_a_2024-03-15/",
            ],
        };
        let newest = resolve_newest_directory(&bucket).await.unwrap();
        assert_eq!(newest, "gtfs_fp_b_2024-03-15/");

        // Same entries, reversed listing order: same winner.
        let bucket = StubBucket {
            dirs: vec![
                "gtfs_fp_a_2024-03-15/",
                "gtfs_fp_b_2024-03-15/",
            ],
        };
        let newest = resolve_newest_directory(&bucket).await.unwrap();
        assert_eq!(newest, "gtfs_fp_b_2024-03-15/");
    }

    #[tokio::test]
    async fn empty_bucket_is_a_discovery_error() {
        let bucket = StubBucket { dirs: vec![] };
        let err = resolve_newest_directory(&bucket).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Discovery(_)));
    }

    #[tokio::test]
    async fn only_undated_entries_is_a_discovery_error() {
        let bucket = StubBucket {
            dirs: vec!["gtfs_fp_latest/", "gtfs_fp_backup/"],
        };
        let err = resolve_newest_directory(&bucket).await.unwrap_err();
        assert!(matches!(err, SnapshotError::Discovery(_)));
    }
}
