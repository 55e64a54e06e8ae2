//! Display generation for the history panel.
//!
//! This module transforms the history log into display-ready view models.
//! It lives in the UI layer and depends on the domain, not vice versa.

use crate::domain::History;
use crate::domain::chess::{is_engine_ply, move_number};
use crate::ui::view_models::{HistoryMoveDisplay, HistoryRowDisplay};

/// Every entry after the start position, in ply order
pub fn history_moves(history: &History) -> Vec<HistoryMoveDisplay> {
    history
        .entries()
        .iter()
        .enumerate()
        .skip(1)
        .map(|(ply, entry)| HistoryMoveDisplay {
            ply,
            move_num: move_number(ply),
            is_black: ply % 2 == 0,
            san: entry.label.clone(),
            by_engine: is_engine_ply(ply),
        })
        .collect()
}

/// Group moves into numbered White/Black rows
pub fn history_rows(history: &History) -> Vec<HistoryRowDisplay> {
    let mut rows: Vec<HistoryRowDisplay> = Vec::new();
    for mv in history_moves(history) {
        match rows.last_mut() {
            Some(row) if row.move_num == mv.move_num && mv.is_black => row.black = Some(mv),
            _ => {
                let move_num = mv.move_num;
                let (white, black) = if mv.is_black { (None, Some(mv)) } else { (Some(mv), None) };
                rows.push(HistoryRowDisplay {
                    move_num,
                    white,
                    black,
                });
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chess::MovePair;
    use crate::domain::BoardSnapshot;
    use crate::domain::history::HistoryEntry;
    use shakmaty::{Chess, Square};

    fn history(labels: &[&str]) -> History {
        let snapshot = BoardSnapshot::from_position(&Chess::default());
        let mut history = History::new(snapshot.clone());
        for label in labels {
            history.record(HistoryEntry::new(
                label.to_string(),
                snapshot.clone(),
                MovePair::new(Square::E2, Square::E4),
            ));
        }
        history
    }

    #[test]
    fn test_empty_history_has_no_rows() {
        assert!(history_rows(&history(&[])).is_empty());
    }

    #[test]
    fn test_rows_pair_moves() {
        let rows = history_rows(&history(&["e4", "e5", "Nf3"]));
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].move_num, 1);
        assert_eq!(rows[0].white.as_ref().map(|m| m.san.as_str()), Some("e4"));
        let reply = rows[0].black.as_ref().unwrap();
        assert_eq!(reply.ply, 2);
        assert!(reply.by_engine);

        assert_eq!(rows[1].move_num, 2);
        assert_eq!(rows[1].white.as_ref().map(|m| m.ply), Some(3));
        assert!(rows[1].black.is_none());
    }
}
