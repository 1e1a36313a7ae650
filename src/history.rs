//! Undo checkpoints.
//!
//! The engine does not snapshot state itself. It tells the history service
//! when a user-visible change is complete, exactly once per gesture,
//! placement or delete.

use crate::constants::MAX_HISTORY_STATES;
use std::collections::VecDeque;
use tracing::debug;

pub trait HistoryService {
    fn commit(&mut self, label: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub sequence: u64,
    pub label: String,
}

/// Bounded in-memory checkpoint log. Oldest entries fall off first.
#[derive(Debug)]
pub struct CheckpointLog {
    entries: VecDeque<Checkpoint>,
    capacity: usize,
    next_sequence: u64,
}

impl Default for CheckpointLog {
    fn default() -> Self {
        Self::with_capacity(MAX_HISTORY_STATES)
    }
}

impl CheckpointLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(MAX_HISTORY_STATES)),
            capacity: capacity.max(1),
            next_sequence: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total commits ever recorded, including evicted ones.
    pub fn total_commits(&self) -> u64 {
        self.next_sequence
    }

    pub fn last(&self) -> Option<&Checkpoint> {
        self.entries.back()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl HistoryService for CheckpointLog {
    fn commit(&mut self, label: &str) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Checkpoint {
            sequence: self.next_sequence,
            label: label.to_string(),
        });
        self.next_sequence += 1;
        debug!(label, sequence = self.next_sequence, "History checkpoint");
    }
}
