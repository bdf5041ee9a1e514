//! Core type definitions for Metrix
//!
//! This module defines the index record stored per metric name and the
//! rules for well-formed hierarchical names and filter patterns.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Separator between the segments of a metric name
pub const SEGMENT_SEPARATOR: char = '.';

/// Pattern segment matching exactly one arbitrary name segment
pub const WILDCARD: &str = "*";

/// Index record for one metric name
///
/// The name is the unique key; the remaining fields are the fixed payload
/// persisted for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Display)]
#[display("{name} {stamp} {score} {average}")]
pub struct IndexRecord {
    /// Dot-delimited hierarchical metric name (e.g. `timer.count.api.get`)
    pub name: String,
    /// Observation time in seconds since the epoch
    pub stamp: u32,
    /// Anomaly score of the latest observation
    pub score: f64,
    /// Rolling average of observed values
    pub average: f64,
}

impl IndexRecord {
    /// Create a new index record
    pub fn new(name: impl Into<String>, stamp: u32, score: f64, average: f64) -> Self {
        Self {
            name: name.into(),
            stamp,
            score,
            average,
        }
    }

    /// Create a record with zeroed payload fields
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, 0, 0.0, 0.0)
    }

    /// Iterate over the `.`-separated segments of the name
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split(SEGMENT_SEPARATOR)
    }
}

/// Errors that can occur when validating a metric name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("metric name must not be empty")]
    Empty,
    #[error("metric name has an empty segment at position {position}")]
    EmptySegment { position: usize },
}

/// Validate a metric name
///
/// A name is well-formed when it is non-empty and none of its segments is
/// empty, so `a..b`, `.a` and `a.` are all rejected.
pub fn validate_name(name: &str) -> std::result::Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    match name.split(SEGMENT_SEPARATOR).position(str::is_empty) {
        Some(position) => Err(NameError::EmptySegment { position }),
        None => Ok(()),
    }
}

/// Check whether a filter pattern can match anything at all
///
/// Patterns follow the name rules, with `*` allowed as a whole segment.
#[must_use]
pub fn is_valid_pattern(pattern: &str) -> bool {
    validate_name(pattern).is_ok()
}
