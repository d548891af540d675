//! Registered context sources shown to the user.

use ragdesk_types::source::SourceRef;

/// Ordered list of sources the user has added this session.
///
/// Entries are recorded once a submission has been dispatched, whatever its
/// outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    entries: Vec<SourceRef>,
}

impl SourceList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `source` after the existing entries.
    pub fn push(&mut self, source: SourceRef) {
        self.entries.push(source);
    }

    /// Remove the entry at `index`, returning it. Out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<SourceRef> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Display labels in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.label.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, SourceRef> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no source has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
