//! Bounded record of applied transitions.

use std::collections::VecDeque;

use arbor_graph::node::NodeId;

/// One applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    /// Previous state; `None` for the start transition.
    pub from: Option<NodeId>,
    /// New state.
    pub to: NodeId,
    /// Name of the link that caused it.
    pub link_name: String,
    /// Frame the transition was applied in.
    pub frame: u64,
}

/// Ring of the most recent transitions, oldest first.
///
/// A capacity of zero records nothing.
#[derive(Debug, Clone)]
pub struct TransitionHistory {
    records: VecDeque<TransitionRecord>,
    capacity: usize,
}

impl TransitionHistory {
    /// Creates an empty history holding at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record, evicting the oldest when full.
    pub fn push(&mut self, record: TransitionRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Iterates records oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    /// Returns the most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    /// Returns the number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the maximum number of records.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(to: u32) -> TransitionRecord {
        TransitionRecord {
            from: None,
            to: NodeId::from_raw(to).unwrap(),
            link_name: format!("to {to}"),
            frame: 0,
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut history = TransitionHistory::new(2);
        for to in 1..=3 {
            history.push(record(to));
        }
        let kept: Vec<u32> = history.iter().map(|r| r.to.get()).collect();
        assert_eq!(kept, [2, 3]);
        assert_eq!(history.last().map(|r| r.to.get()), Some(3));
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut history = TransitionHistory::new(0);
        history.push(record(1));
        assert!(history.is_empty());
    }
}
