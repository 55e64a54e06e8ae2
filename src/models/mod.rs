mod game;

pub use game::{GameModel, SearchReport};
