//! Write acknowledgements reported back to API callers.
//!
//! The public API has always answered writes with driver-style
//! acknowledgements (`matchedCount`, `insertedId`, ...); these types keep
//! that contract independent of the storage engine behind the ports.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Result of an update against a single keyed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    /// Number of records the filter matched
    pub matched_count: u64,
    /// Number of records actually changed
    pub modified_count: u64,
}

impl UpdateOutcome {
    /// Outcome for a keyed update that touched `rows` records.
    pub fn from_rows(rows: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count: rows,
            modified_count: rows,
        }
    }

    pub fn matched_nothing(&self) -> bool {
        self.matched_count == 0
    }
}

/// Result of inserting a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertOutcome {
    pub fn inserted(id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id: id,
        }
    }
}
