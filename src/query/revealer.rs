use std::sync::Arc;

use crate::catalog::Record;

pub const DEFAULT_BATCH_SIZE: usize = 20;

// Exposes an evaluated view in fixed-size batches.
#[derive(Clone, Debug)]
pub struct Revealer {
    view: Vec<Arc<Record>>,
    // The count of records revealed so far.
    revealed: usize,
    batch_size: usize,
}

impl Default for Revealer {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl Revealer {
    // A batch size of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            view: Vec::new(),
            revealed: 0,
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    // Replaces the view and forgets everything revealed from the old one.
    pub fn reset(&mut self, view: Vec<Arc<Record>>) {
        self.view = view;
        self.revealed = 0;
    }

    // The records following the last revealed one, empty once exhausted.
    pub fn next_batch(&mut self) -> &[Arc<Record>] {
        let start = self.revealed;
        let end = start.saturating_add(self.batch_size).min(self.view.len());
        self.revealed = end;

        &self.view[start..end]
    }

    pub fn revealed(&self) -> &[Arc<Record>] {
        &self.view[..self.revealed]
    }

    pub fn view(&self) -> &[Arc<Record>] {
        &self.view
    }

    pub fn is_exhausted(&self) -> bool {
        self.revealed >= self.view.len()
    }
}
