//! Snapshot undo/redo history.

use crate::node::{BoardNode, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub(crate) nodes: HashMap<NodeId, BoardNode>,
    pub(crate) order: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl History {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state before a change. Clears the redo stack.
    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.limit {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    /// Forget the most recent entry (a gesture that was cancelled).
    pub(crate) fn discard_last(&mut self) {
        self.undo_stack.pop();
    }

    pub(crate) fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    pub(crate) fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub(crate) fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub(crate) fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Snapshot {
        Snapshot {
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }

    #[test]
    fn test_history_is_capped() {
        let mut history = History::new(3);
        for _ in 0..5 {
            history.push(empty());
        }
        let mut count = 0;
        while history.undo(empty()).is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
        assert!(history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(10);
        history.push(empty());
        assert!(history.undo(empty()).is_some());
        assert!(history.can_redo());
        history.push(empty());
        assert!(!history.can_redo());
        assert!(history.can_undo());
    }
}
