use crate::domain::model::{PinEntry, PinId};
use std::collections::BTreeSet;

/// Ordered, append-only collection of the pins known to this session.
#[derive(Debug, Clone, Default)]
pub struct PinStore {
    entries: Vec<PinEntry>,
}

impl PinStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[PinEntry] {
        &self.entries
    }

    pub fn get(&self, id: PinId) -> Option<&PinEntry> {
        self.entries.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PinId, &PinEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (PinId(index), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, entry: PinEntry) -> PinId {
        self.entries.push(entry);
        PinId(self.entries.len() - 1)
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = PinEntry>) {
        self.entries.extend(entries);
    }

    /// Swaps in a freshly fetched server snapshot.
    pub fn replace_all(&mut self, entries: Vec<PinEntry>) {
        self.entries = entries;
    }

    /// Every job title once, for the job-title selector.
    pub fn distinct_job_titles(&self) -> BTreeSet<String> {
        self.entries.iter().map(|entry| entry.job.clone()).collect()
    }
}
