//! Xiangqi engine core
//!
//! Board representation, move generation, evaluation and a multi-threaded
//! search driven through [`Engine`]. Search progress is delivered as
//! [`SearchEvent`]s over a channel so any front end can render it.

pub mod engine;
pub mod error;
pub mod eval;
pub mod events;
pub mod movegen;
pub mod notation;
pub mod options;
pub mod perft;
pub mod position;
pub mod search;
pub mod tt;
pub mod types;

pub use engine::{Engine, StopHandle};
pub use error::{EngineError, EngineResult, FenError};
pub use eval::EvalTrace;
pub use events::{InfoFull, InfoIter, InfoShort, SearchEvent};
pub use perft::PerftReport;
pub use position::{Position, START_FEN};
pub use search::Limits;
pub use types::{Bound, Color, Move, Piece, PieceType, Score, Square, Value};
