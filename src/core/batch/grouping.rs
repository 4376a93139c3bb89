//! Grouping of active records by owning batch job

use std::collections::BTreeMap;

use super::types::WordQueryRecord;

/// Partition records by `batch_request_id`.
///
/// Every record lands in exactly one group. Groups are keyed in batch id order
/// so passes visit batches deterministically.
pub fn group_by_batch(records: Vec<WordQueryRecord>) -> BTreeMap<String, Vec<WordQueryRecord>> {
    let mut groups: BTreeMap<String, Vec<WordQueryRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.batch_request_id.clone())
            .or_default()
            .push(record);
    }
    groups
}
