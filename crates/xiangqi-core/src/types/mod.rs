//! Basic board types

mod color;
mod moves;
mod piece;
mod square;
mod value;

pub use color::Color;
pub use moves::{Move, MoveList};
pub use piece::{Piece, PieceType};
pub use square::Square;
pub use value::{Bound, MAX_PLY, Score, Value};
