//! Static evaluation
//!
//! Material plus a handful of placement terms. Values are in internal units
//! where roughly 400 corresponds to one pawn-equivalent advantage at full
//! material (see the win-rate model in the protocol layer).

use crate::position::Position;
use crate::position::attacks::ORTHOGONAL;
use crate::types::{Color, PieceType, Square, Value};

const PIECE_VALUES: [i32; PieceType::NUM] = {
    let mut v = [0; PieceType::NUM];
    v[PieceType::Rook as usize] = 1300;
    v[PieceType::Advisor as usize] = 230;
    v[PieceType::Cannon as usize] = 650;
    v[PieceType::Pawn as usize] = 90;
    v[PieceType::Knight as usize] = 600;
    v[PieceType::Bishop as usize] = 250;
    v
};

const TEMPO: i32 = 20;

/// Per-side breakdown of the evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalTrace {
    pub material: [i32; Color::NUM],
    pub positional: [i32; Color::NUM],
    pub tempo: i32,
    /// Total from White's point of view
    pub total: Value,
    pub material_count: i32,
    pub in_check: bool,
}

/// Evaluation from the side to move's point of view
pub fn evaluate(pos: &Position) -> Value {
    let (material, positional) = terms(pos);
    let white = material[0] - material[1] + positional[0] - positional[1];
    let stm = match pos.side_to_move() {
        Color::White => white,
        Color::Black => -white,
    };
    Value::new(stm + TEMPO)
}

pub fn trace(pos: &Position) -> EvalTrace {
    let (material, positional) = terms(pos);
    let tempo = match pos.side_to_move() {
        Color::White => TEMPO,
        Color::Black => -TEMPO,
    };
    EvalTrace {
        material,
        positional,
        tempo,
        total: Value::new(material[0] - material[1] + positional[0] - positional[1] + tempo),
        material_count: pos.material_count(),
        in_check: pos.in_check(),
    }
}

fn terms(pos: &Position) -> ([i32; Color::NUM], [i32; Color::NUM]) {
    let mut material = [0; Color::NUM];
    let mut positional = [0; Color::NUM];
    for sq in Square::all() {
        let Some(piece) = pos.piece_on(sq) else {
            continue;
        };
        let side = piece.color().index();
        material[side] += PIECE_VALUES[piece.kind().index()];
        positional[side] += placement(pos, piece.color(), piece.kind(), sq);
    }
    (material, positional)
}

/// Rank counted from `color`'s own back rank
#[inline]
fn relative_rank(color: Color, sq: Square) -> i32 {
    match color {
        Color::White => sq.rank(),
        Color::Black => Square::RANK_NB - 1 - sq.rank(),
    }
}

fn placement(pos: &Position, color: Color, kind: PieceType, sq: Square) -> i32 {
    let rank = relative_rank(color, sq);
    let centre = 4 - (sq.file() - 4).abs();
    match kind {
        PieceType::Pawn => {
            let mut bonus = 0;
            if !sq.on_home_side(color) {
                bonus += 90 + 10 * centre;
                if (6..=8).contains(&rank) && (3..=5).contains(&sq.file()) {
                    bonus += 40;
                }
                if rank == 9 {
                    bonus -= 60;
                }
            }
            bonus
        }
        PieceType::Knight => {
            let edge = if sq.file() == 0 || sq.file() == 8 { 30 } else { 0 };
            8 * centre + 6 * rank.min(7) - edge
        }
        PieceType::Cannon => {
            if sq.file() == 4 && rank <= 2 { 25 } else { 3 * centre }
        }
        PieceType::Rook => 3 * line_mobility(pos, sq),
        PieceType::King => {
            if rank > 0 { -15 * rank } else { 0 }
        }
        PieceType::Advisor | PieceType::Bishop => 0,
    }
}

/// Empty squares reachable along ranks and files
fn line_mobility(pos: &Position, sq: Square) -> i32 {
    let mut count = 0;
    for (df, dr) in ORTHOGONAL {
        let mut cur = sq;
        while let Some(next) = cur.offset(df, dr) {
            if pos.piece_on(next).is_some() {
                break;
            }
            count += 1;
            cur = next;
        }
    }
    count
}
