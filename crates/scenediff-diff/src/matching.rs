//! Pairing old and new records: by identity first, then by stable key.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use scenediff_types::{FileId, Record};

use crate::stable_key::{stable_key, StableKey};

/// Outcome of pairing two record lists, as indices into each list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordMatching {
    /// `(old, new)` pairs, identity matches first in old order, then
    /// re-identified pairs in new order.
    pub pairs: Vec<(usize, usize)>,
    /// Unpaired old records, in order.
    pub removed: Vec<usize>,
    /// Unpaired new records, in order.
    pub added: Vec<usize>,
    /// How many pairs came from stable keys.
    pub reidentified: usize,
}

/// Pair old and new records.
///
/// Identity matches come first. With `reidentify`, unpaired new records are
/// then looked up by [`StableKey`] among unpaired old records; records that
/// share a key are paired in document order.
pub fn match_records(old: &[Record], new: &[Record], reidentify: bool) -> RecordMatching {
    let mut new_by_id: HashMap<FileId, usize> = HashMap::with_capacity(new.len());
    for (j, record) in new.iter().enumerate() {
        new_by_id.entry(record.file_id()).or_insert(j);
    }

    let mut matching = RecordMatching::default();
    let mut old_paired = vec![false; old.len()];
    let mut new_paired = vec![false; new.len()];

    for (i, record) in old.iter().enumerate() {
        if let Some(&j) = new_by_id.get(&record.file_id()) {
            if !new_paired[j] {
                old_paired[i] = true;
                new_paired[j] = true;
                matching.pairs.push((i, j));
            }
        }
    }

    if reidentify {
        let mut by_key: HashMap<StableKey, VecDeque<usize>> = HashMap::new();
        for (i, record) in old.iter().enumerate().filter(|(i, _)| !old_paired[*i]) {
            if let Some(key) = stable_key(record) {
                by_key.entry(key).or_default().push_back(i);
            }
        }
        for (j, record) in new.iter().enumerate() {
            if new_paired[j] {
                continue;
            }
            let Some(i) = stable_key(record)
                .and_then(|key| by_key.get_mut(&key))
                .and_then(VecDeque::pop_front)
            else {
                continue;
            };
            debug!(
                old = %old[i].file_id(),
                new = %record.file_id(),
                "re-identified record"
            );
            old_paired[i] = true;
            new_paired[j] = true;
            matching.pairs.push((i, j));
            matching.reidentified += 1;
        }
    }

    matching.removed = (0..old.len()).filter(|i| !old_paired[*i]).collect();
    matching.added = (0..new.len()).filter(|j| !new_paired[*j]).collect();

    debug!(
        paired = matching.pairs.len(),
        reidentified = matching.reidentified,
        removed = matching.removed.len(),
        added = matching.added.len(),
        "matched records"
    );
    matching
}
