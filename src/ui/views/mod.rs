mod board_view;
mod engine_pane;
mod move_list;

pub use board_view::ChessBoardView;
pub use engine_pane::render_ai_pane;
pub use move_list::render_history_panel;
