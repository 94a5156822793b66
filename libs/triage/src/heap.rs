//! Binary max-heap of triage entries with an id-to-position index

use crate::entry::TriageEntry;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct IndexedHeap {
    entries: Vec<TriageEntry>,
    // patient_id -> position in `entries`; kept in lockstep with every swap.
    positions: HashMap<String, usize>,
}

impl IndexedHeap {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn peek(&self) -> Option<&TriageEntry> {
        self.entries.first()
    }

    pub(crate) fn get(&self, patient_id: &str) -> Option<&TriageEntry> {
        self.positions.get(patient_id).map(|&i| &self.entries[i])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TriageEntry> {
        self.entries.iter()
    }

    /// Insert a new entry. The caller guarantees the id is not present.
    pub(crate) fn push(&mut self, entry: TriageEntry) {
        let index = self.entries.len();
        self.positions.insert(entry.patient_id.clone(), index);
        self.entries.push(entry);
        self.sift_up(index);
    }

    pub(crate) fn pop(&mut self) -> Option<TriageEntry> {
        self.remove_at(0)
    }

    pub(crate) fn remove(&mut self, patient_id: &str) -> Option<TriageEntry> {
        let index = *self.positions.get(patient_id)?;
        self.remove_at(index)
    }

    /// Apply `update` to the entry for `patient_id` and restore heap order.
    pub(crate) fn update<F>(&mut self, patient_id: &str, update: F) -> Option<&TriageEntry>
    where
        F: FnOnce(&mut TriageEntry),
    {
        let index = *self.positions.get(patient_id)?;
        update(&mut self.entries[index]);
        let index = self.reposition(index);
        Some(&self.entries[index])
    }

    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.positions.clear();
        dropped
    }

    /// Entries in dequeue order, without disturbing the heap.
    pub(crate) fn sorted(&self) -> Vec<TriageEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| {
            if a.outranks(b) {
                std::cmp::Ordering::Less
            } else if b.outranks(a) {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        });
        sorted
    }

    fn remove_at(&mut self, index: usize) -> Option<TriageEntry> {
        let last = self.entries.len().checked_sub(1)?;
        self.swap(index, last);
        let removed = self.entries.pop()?;
        self.positions.remove(&removed.patient_id);

        if index < self.entries.len() {
            self.reposition(index);
        }
        Some(removed)
    }

    fn reposition(&mut self, index: usize) -> usize {
        let index = self.sift_up(index);
        self.sift_down(index)
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.entries[index].outranks(&self.entries[parent]) {
                break;
            }
            self.swap(index, parent);
            index = parent;
        }
        index
    }

    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.entries.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut best = index;

            if left < len && self.entries[left].outranks(&self.entries[best]) {
                best = left;
            }
            if right < len && self.entries[right].outranks(&self.entries[best]) {
                best = right;
            }
            if best == index {
                return index;
            }
            self.swap(index, best);
            index = best;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].patient_id.clone(), a);
        self.positions.insert(self.entries[b].patient_id.clone(), b);
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.entries.len(), self.positions.len());
        for (i, entry) in self.entries.iter().enumerate() {
            assert_eq!(self.positions.get(&entry.patient_id), Some(&i));
            if i > 0 {
                let parent = (i - 1) / 2;
                assert!(!entry.outranks(&self.entries[parent]), "heap order broken at {i}");
            }
        }
    }
}
