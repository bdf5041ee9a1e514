//! Binary encoding of index records.
//!
//! The name is the table key, so only the fixed payload fields are written
//! to the value, via bincode.

use metrix_common::IndexRecord;
use serde::{Deserialize, Serialize};

/// Persisted payload of an index record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct StoredIndex {
    stamp: u32,
    score: f64,
    average: f64,
}

/// Encode the payload of a record
pub fn encode(record: &IndexRecord) -> bincode::Result<Vec<u8>> {
    bincode::serialize(&StoredIndex {
        stamp: record.stamp,
        score: record.score,
        average: record.average,
    })
}

/// Decode a persisted payload into the record stored under `name`
pub fn decode(name: &str, bytes: &[u8]) -> bincode::Result<IndexRecord> {
    let stored: StoredIndex = bincode::deserialize(bytes)?;
    Ok(IndexRecord::new(name, stored.stamp, stored.score, stored.average))
}
