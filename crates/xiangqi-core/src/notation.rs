//! Coordinate move notation (`h2e2`)

use crate::movegen;
use crate::position::Position;
use crate::types::{Move, Square};

/// Two-character square name, e.g. `e0`
pub fn square(sq: Square) -> String {
    sq.to_string()
}

/// Four-character move text; `(none)` and `0000` for the sentinels
pub fn move_str(m: Move) -> String {
    m.to_string()
}

/// Resolve move text against the legal moves of `pos`.
///
/// Returns [`Move::NONE`] when the text does not name a legal move.
/// Matching ignores ASCII case.
pub fn to_move(pos: &Position, text: &str) -> Move {
    let wanted = text.to_ascii_lowercase();
    movegen::generate_legal(pos)
        .into_iter()
        .find(|m| move_str(*m) == wanted)
        .unwrap_or(Move::NONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_move_legal_and_illegal() {
        let pos = Position::startpos();
        let m = to_move(&pos, "h2e2");
        assert!(m.is_ok());
        assert_eq!(move_str(m), "h2e2");
        assert_eq!(to_move(&pos, "H2E2"), m);
        assert_eq!(to_move(&pos, "e0e2"), Move::NONE);
        assert_eq!(to_move(&pos, "zz"), Move::NONE);
        assert_eq!(to_move(&pos, "(none)"), Move::NONE);
    }

    #[test]
    fn test_square_names() {
        assert_eq!(square(Square::from_index(0)), "a0");
        assert_eq!(square(Square::from_index(89)), "i9");
    }
}
