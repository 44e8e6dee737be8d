//! Collection and ranking of origin hits produced by concurrent probe tasks.
use serde_derive::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A candidate that answered directly, with the measured latency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRecord {
    /// Organization name from the dataset.
    pub name: String,
    /// The domain that was probed.
    pub domain: String,
    /// Time from sending the successful request to receiving the response.
    #[serde(serialize_with = "serialize_latency_ms")]
    pub latency: Duration,
    /// Raw `Server` header, empty when the host did not send one.
    pub server: String,
    /// Position of the candidate in submission order, used to break latency ties.
    #[serde(skip)]
    pub sequence: usize,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_latency_ms<S>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(latency.as_secs_f64() * 1000.0)
}

/// Shared, append-only set of records.
///
/// Producers only hold the lock for the duration of a `push`; the network
/// round trip happens before the lock is taken.
#[derive(Debug, Default)]
pub struct ResultSet {
    records: Mutex<Vec<ScanRecord>>,
}

impl ResultSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one record.
    pub fn push(&self, record: ScanRecord) {
        // Vec::push never panics halfway, so a poisoned lock still holds a valid Vec.
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }

    /// Number of records collected so far.
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no records have been collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the set and returns at most `limit` records ordered by latency.
    ///
    /// Must only be called once every producer has finished.
    pub fn ranked(&self, limit: usize) -> Vec<ScanRecord> {
        let records = std::mem::take(
            &mut *self
                .records
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        rank(records, limit)
    }
}

/// Sorts by ascending latency, ties in submission order, then truncates.
pub fn rank(mut records: Vec<ScanRecord>, limit: usize) -> Vec<ScanRecord> {
    records.sort_by_key(|record| (record.latency, record.sequence));
    records.truncate(limit);
    records
}
