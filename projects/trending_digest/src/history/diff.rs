use std::collections::btree_map::Entry;

use crate::model::{History, RepositoryRecord};

/// Returns the records whose identifier `history` has never seen, in their
/// original order, and records them in `history`.
///
/// Known repositories are left untouched: stars and description stay as they
/// were on first sighting.
pub fn diff_against_history(
    current: Vec<RepositoryRecord>,
    history: &mut History,
) -> Vec<RepositoryRecord> {
    let mut new_records = Vec::new();

    for record in current {
        if let Entry::Vacant(slot) = history.entry(record.repo.clone()) {
            slot.insert(record.clone());
            new_records.push(record);
        }
    }

    new_records
}
