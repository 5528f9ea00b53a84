mod board;
mod color;
mod file;
mod game;
mod r#move;
mod outcome;
mod piece;
mod rank;
mod role;
mod square;

/// Move validation, attack detection and move enumeration.
pub mod rules;

pub use board::*;
pub use color::*;
pub use file::*;
pub use game::*;
pub use outcome::*;
pub use piece::*;
pub use r#move::*;
pub use rank::*;
pub use role::*;
pub use rules::IllegalMove;
pub use square::*;
