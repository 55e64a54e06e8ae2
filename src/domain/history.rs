//! Single-path move history with truncate-on-write.
//!
//! This is a pure domain module with no GPUI dependencies.

use crate::domain::chess::MovePair;
use crate::domain::snapshot::BoardSnapshot;

/// Label of the entry at ply 0
pub const START_LABEL: &str = "Start";

/// One position in the history log
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Text shown in the history panel
    pub label: String,
    /// The position after this ply
    pub snapshot: BoardSnapshot,
    /// The move that led here (None for the start entry)
    pub last_move: Option<MovePair>,
}

impl HistoryEntry {
    pub fn start(snapshot: BoardSnapshot) -> Self {
        Self {
            label: START_LABEL.to_string(),
            snapshot,
            last_move: None,
        }
    }

    pub fn new(label: String, snapshot: BoardSnapshot, last_move: MovePair) -> Self {
        Self {
            label,
            snapshot,
            last_move: Some(last_move),
        }
    }
}

/// History entries indexed by ply, plus the pointer to the live ply.
///
/// Entry 0 always exists and is the start position. Entries past the pointer
/// stay reachable for rollback until the next write, which discards them.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<HistoryEntry>,
    current: usize,
}

impl History {
    /// Create a log holding just the start position
    pub fn new(start: BoardSnapshot) -> Self {
        Self {
            entries: vec![HistoryEntry::start(start)],
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, ply: usize) -> Option<&HistoryEntry> {
        self.entries.get(ply)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The start entry
    pub fn root(&self) -> &HistoryEntry {
        &self.entries[0]
    }

    /// The entry at the pointer
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    /// The pointer
    pub fn current_ply(&self) -> usize {
        self.current
    }

    pub fn last_ply(&self) -> usize {
        self.entries.len() - 1
    }

    /// Check if the pointer is at the last entry
    pub fn is_at_end(&self) -> bool {
        self.current == self.last_ply()
    }

    /// Move the pointer without touching entries
    pub fn go_to(&mut self, ply: usize) -> bool {
        if ply < self.entries.len() {
            self.current = ply;
            true
        } else {
            false
        }
    }

    /// Drop every entry after the pointer, then append and advance to it.
    ///
    /// Returns the ply of the new entry.
    pub fn record(&mut self, entry: HistoryEntry) -> usize {
        self.record_after(self.current, entry)
    }

    /// Keep `history[0..=ply]`, append `entry` and point at it.
    pub fn record_after(&mut self, ply: usize, entry: HistoryEntry) -> usize {
        let keep = (ply + 1).min(self.entries.len());
        self.entries.truncate(keep);
        self.entries.push(entry);
        self.current = self.entries.len() - 1;
        self.current
    }

    /// Forget everything but a fresh start entry
    pub fn reset(&mut self, start: BoardSnapshot) {
        self.entries.clear();
        self.entries.push(HistoryEntry::start(start));
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Chess, Square};

    fn snapshot() -> BoardSnapshot {
        BoardSnapshot::from_position(&Chess::default())
    }

    fn entry(label: &str) -> HistoryEntry {
        HistoryEntry::new(
            label.to_string(),
            snapshot(),
            MovePair::new(Square::E2, Square::E4),
        )
    }

    #[test]
    fn test_new_history() {
        let history = History::new(snapshot());
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_ply(), 0);
        assert!(history.is_at_end());
        assert_eq!(history.root().label, START_LABEL);
        assert!(history.root().last_move.is_none());
    }

    #[test]
    fn test_record_advances_pointer() {
        let mut history = History::new(snapshot());
        assert_eq!(history.record(entry("e4")), 1);
        assert_eq!(history.record(entry("e5")), 2);
        assert_eq!(history.len(), 3);
        assert_eq!(history.current_ply(), history.len() - 1);
    }

    #[test]
    fn test_go_to_keeps_future_until_write() {
        let mut history = History::new(snapshot());
        for label in ["e4", "e5", "Nf3", "Nc6"] {
            history.record(entry(label));
        }

        assert!(history.go_to(1));
        assert_eq!(history.len(), 5);
        assert!(!history.is_at_end());
        assert!(!history.go_to(5));
        assert_eq!(history.current_ply(), 1);

        history.record(entry("d5"));
        assert_eq!(history.len(), 3);
        assert_eq!(history.current().label, "d5");
        assert_eq!(history.get(2).unwrap().label, "d5");
        assert!(history.get(3).is_none());
    }

    #[test]
    fn test_record_after_prefix() {
        let mut history = History::new(snapshot());
        for label in ["e4", "e5", "Nf3"] {
            history.record(entry(label));
        }
        history.record_after(0, entry("d4"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current_ply(), 1);
        assert_eq!(history.get(1).unwrap().label, "d4");
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(snapshot());
        history.record(entry("e4"));
        history.reset(snapshot());
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_ply(), 0);
    }
}
