//! Move generation
//!
//! Pseudo-legal generation follows the piece rules; legality (own king not
//! attacked, kings not facing) is checked afterwards with
//! [`Position::is_legal`].

use crate::position::Position;
use crate::position::attacks::{DIAGONAL, KNIGHT_JUMPS, ORTHOGONAL};
use crate::types::{Color, Move, MoveList, PieceType, Square};

/// All pseudo-legal moves of the side to move
pub fn generate_pseudo_legal(pos: &Position, list: &mut MoveList) {
    generate::<false>(pos, list);
}

/// Pseudo-legal captures only
pub fn generate_captures(pos: &Position, list: &mut MoveList) {
    generate::<true>(pos, list);
}

/// All legal moves of the side to move
pub fn generate_legal(pos: &Position) -> MoveList {
    let mut list = MoveList::new();
    generate_pseudo_legal(pos, &mut list);
    list.retain(|m| pos.is_legal(*m));
    list
}

fn generate<const CAPTURES: bool>(pos: &Position, list: &mut MoveList) {
    let us = pos.side_to_move();
    for from in Square::all() {
        let Some(piece) = pos.piece_on(from) else {
            continue;
        };
        if piece.color() != us {
            continue;
        }
        match piece.kind() {
            PieceType::Rook => slide::<CAPTURES>(pos, us, from, list),
            PieceType::Cannon => cannon::<CAPTURES>(pos, us, from, list),
            PieceType::Knight => {
                for ((df, dr), (lf, lr)) in KNIGHT_JUMPS {
                    let leg_free = from.offset(lf, lr).is_some_and(|leg| pos.piece_on(leg).is_none());
                    if !leg_free {
                        continue;
                    }
                    if let Some(to) = from.offset(df, dr) {
                        push_target::<CAPTURES>(pos, us, from, to, list);
                    }
                }
            }
            PieceType::Bishop => {
                for (df, dr) in DIAGONAL {
                    let eye_free = from.offset(df, dr).is_some_and(|eye| pos.piece_on(eye).is_none());
                    let target = from.offset(2 * df, 2 * dr).filter(|to| to.on_home_side(us));
                    if let (true, Some(to)) = (eye_free, target) {
                        push_target::<CAPTURES>(pos, us, from, to, list);
                    }
                }
            }
            PieceType::Advisor => step::<CAPTURES>(pos, us, from, &DIAGONAL, list),
            PieceType::King => step::<CAPTURES>(pos, us, from, &ORTHOGONAL, list),
            PieceType::Pawn => {
                if let Some(to) = from.offset(0, us.forward()) {
                    push_target::<CAPTURES>(pos, us, from, to, list);
                }
                if !from.on_home_side(us) {
                    for df in [-1, 1] {
                        if let Some(to) = from.offset(df, 0) {
                            push_target::<CAPTURES>(pos, us, from, to, list);
                        }
                    }
                }
            }
        }
    }
}

#[inline]
fn push_target<const CAPTURES: bool>(pos: &Position, us: Color, from: Square, to: Square, list: &mut MoveList) {
    match pos.piece_on(to) {
        Some(p) if p.color() == us => {}
        Some(_) => list.push(Move::new(from, to)),
        None if !CAPTURES => list.push(Move::new(from, to)),
        None => {}
    }
}

/// One step in each direction, confined to the palace
fn step<const CAPTURES: bool>(
    pos: &Position,
    us: Color,
    from: Square,
    dirs: &[(i32, i32)],
    list: &mut MoveList,
) {
    for &(df, dr) in dirs {
        if let Some(to) = from.offset(df, dr).filter(|to| to.in_palace(us)) {
            push_target::<CAPTURES>(pos, us, from, to, list);
        }
    }
}

fn slide<const CAPTURES: bool>(pos: &Position, us: Color, from: Square, list: &mut MoveList) {
    for (df, dr) in ORTHOGONAL {
        let mut cur = from;
        while let Some(to) = cur.offset(df, dr) {
            cur = to;
            push_target::<CAPTURES>(pos, us, from, to, list);
            if pos.piece_on(to).is_some() {
                break;
            }
        }
    }
}

/// Quiet moves slide like a rook; captures jump exactly one screen
fn cannon<const CAPTURES: bool>(pos: &Position, us: Color, from: Square, list: &mut MoveList) {
    for (df, dr) in ORTHOGONAL {
        let mut cur = from;
        let mut screened = false;
        while let Some(to) = cur.offset(df, dr) {
            cur = to;
            match (pos.piece_on(to), screened) {
                (None, false) => {
                    if !CAPTURES {
                        list.push(Move::new(from, to));
                    }
                }
                (None, true) => {}
                (Some(_), false) => screened = true,
                (Some(p), true) => {
                    if p.color() != us {
                        list.push(Move::new(from, to));
                    }
                    break;
                }
            }
        }
    }
}
