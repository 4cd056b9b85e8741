//! Attack detection on a raw board array
//!
//! Advisors, elephants and kings never leave their own half, so only rooks,
//! cannons, knights and pawns can attack a square inside the enemy palace.
//! Kings facing each other are handled separately by [`kings_face`].

use super::Board;
use crate::types::{Color, Piece, PieceType, Square};

pub(crate) const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub(crate) const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Knight jumps as `(delta, leg)`; the leg square must be empty
pub(crate) const KNIGHT_JUMPS: [((i32, i32), (i32, i32)); 8] = [
    ((1, 2), (0, 1)),
    ((-1, 2), (0, 1)),
    ((1, -2), (0, -1)),
    ((-1, -2), (0, -1)),
    ((2, 1), (1, 0)),
    ((2, -1), (1, 0)),
    ((-2, 1), (-1, 0)),
    ((-2, -1), (-1, 0)),
];

/// Whether `by` attacks `sq` on `board`
pub(crate) fn attacked_by(board: &Board, sq: Square, by: Color) -> bool {
    // Rooks hit the first piece on a line, cannons the second one.
    for (df, dr) in ORTHOGONAL {
        let mut screened = false;
        let mut cur = sq;
        while let Some(next) = cur.offset(df, dr) {
            cur = next;
            let Some(piece) = board[next.index()] else {
                continue;
            };
            if piece.color() == by {
                let kind = piece.kind();
                if (!screened && kind == PieceType::Rook) || (screened && kind == PieceType::Cannon) {
                    return true;
                }
            }
            if screened {
                break;
            }
            screened = true;
        }
    }

    let knight = Some(Piece::new(by, PieceType::Knight));
    for ((df, dr), (lf, lr)) in KNIGHT_JUMPS {
        let Some(origin) = sq.offset(-df, -dr) else {
            continue;
        };
        if board[origin.index()] != knight {
            continue;
        }
        if origin.offset(lf, lr).is_some_and(|leg| board[leg.index()].is_none()) {
            return true;
        }
    }

    let pawn = Some(Piece::new(by, PieceType::Pawn));
    if sq.offset(0, -by.forward()).is_some_and(|s| board[s.index()] == pawn) {
        return true;
    }
    [-1, 1].into_iter().any(|df| {
        sq.offset(df, 0)
            .is_some_and(|s| board[s.index()] == pawn && !s.on_home_side(by))
    })
}

/// Whether two kings on `a` and `b` see each other along an open file
pub(crate) fn kings_face(board: &Board, a: Square, b: Square) -> bool {
    if a.file() != b.file() {
        return false;
    }
    let (low, high) = if a.rank() < b.rank() { (a, b) } else { (b, a) };
    (low.rank() + 1..high.rank())
        .filter_map(|rank| Square::new(low.file(), rank))
        .all(|s| board[s.index()].is_none())
}
