//! Board state, move application and legality

pub(crate) mod attacks;
mod fen;
mod zobrist;

pub use fen::START_FEN;

use crate::types::{Color, Move, Piece, PieceType, Square};
use std::fmt;
use zobrist::ZOBRIST;

/// Raw board contents indexed by [`Square::index`]
pub type Board = [Option<Piece>; Square::NUM];

/// Plies without capture after which the game is drawn
const RULE60_PLIES: i32 = 120;

/// Material weights used for the game-phase count
const MATERIAL_WEIGHTS: [i32; PieceType::NUM] = {
    let mut w = [0; PieceType::NUM];
    w[PieceType::Rook as usize] = 10;
    w[PieceType::Knight as usize] = 5;
    w[PieceType::Cannon as usize] = 5;
    w[PieceType::Bishop as usize] = 3;
    w[PieceType::Advisor as usize] = 2;
    w[PieceType::Pawn as usize] = 1;
    w
};

#[derive(Debug, Clone, Copy)]
struct StateInfo {
    key: u64,
    captured: Option<Piece>,
    rule60: i32,
}

#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    side_to_move: Color,
    king_sq: [Square; Color::NUM],
    counts: [[u8; PieceType::NUM]; Color::NUM],
    key: u64,
    rule60: i32,
    game_ply: i32,
    history: Vec<StateInfo>,
}

impl Position {
    /// The standard initial position
    pub fn startpos() -> Position {
        // START_FEN is a constant that always parses
        match Position::from_fen(START_FEN) {
            Ok(pos) => pos,
            Err(e) => unreachable!("start position rejected: {e}"),
        }
    }

    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_sq[color.index()]
    }

    #[inline]
    pub fn count(&self, color: Color, kind: PieceType) -> i32 {
        i32::from(self.counts[color.index()][kind.index()])
    }

    #[inline]
    pub fn game_ply(&self) -> i32 {
        self.game_ply
    }

    #[inline]
    pub fn rule60_count(&self) -> i32 {
        self.rule60
    }

    /// Weighted material of both sides: 10 per rook, 5 per knight or cannon,
    /// 3 per elephant, 2 per advisor and 1 per pawn.
    pub fn material_count(&self) -> i32 {
        Color::ALL
            .iter()
            .flat_map(|&c| PieceType::ALL.iter().map(move |&k| (c, k)))
            .map(|(c, k)| self.count(c, k) * MATERIAL_WEIGHTS[k.index()])
            .sum()
    }

    /// Whether the side to move is in check, counting facing kings
    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        let ksq = self.king_square(us);
        attacks::attacked_by(&self.board, ksq, !us)
            || attacks::kings_face(&self.board, ksq, self.king_square(!us))
    }

    /// Whether a pseudo-legal move leaves the mover's king safe
    pub fn is_legal(&self, m: Move) -> bool {
        let (from, to) = (m.from_sq(), m.to_sq());
        let Some(piece) = self.board[from.index()] else {
            return false;
        };
        let mut board = self.board;
        board[to.index()] = Some(piece);
        board[from.index()] = None;

        let us = self.side_to_move;
        let ksq = if piece.kind() == PieceType::King { to } else { self.king_square(us) };
        !attacks::attacked_by(&board, ksq, !us)
            && !attacks::kings_face(&board, ksq, self.king_square(!us))
    }

    pub fn do_move(&mut self, m: Move) {
        debug_assert!(m.is_ok(), "do_move with sentinel {m:?}");
        let (from, to) = (m.from_sq(), m.to_sq());
        let Some(piece) = self.board[from.index()] else {
            debug_assert!(false, "do_move from empty square {from}");
            return;
        };
        let captured = self.board[to.index()];

        self.history.push(StateInfo { key: self.key, captured, rule60: self.rule60 });

        let z = &*ZOBRIST;
        self.key ^= z.psq(piece, from) ^ z.psq(piece, to) ^ z.side();
        if let Some(victim) = captured {
            self.key ^= z.psq(victim, to);
            self.counts[victim.color().index()][victim.kind().index()] -= 1;
            self.rule60 = 0;
        } else {
            self.rule60 += 1;
        }

        self.board[to.index()] = Some(piece);
        self.board[from.index()] = None;
        if piece.kind() == PieceType::King {
            self.king_sq[piece.color().index()] = to;
        }
        self.side_to_move = !self.side_to_move;
        self.game_ply += 1;
    }

    pub fn undo_move(&mut self, m: Move) {
        let Some(st) = self.history.pop() else {
            debug_assert!(false, "undo_move without history");
            return;
        };
        let (from, to) = (m.from_sq(), m.to_sq());
        let piece = self.board[to.index()];

        self.board[from.index()] = piece;
        self.board[to.index()] = st.captured;
        if let Some(king) = piece.filter(|p| p.kind() == PieceType::King) {
            self.king_sq[king.color().index()] = from;
        }
        if let Some(victim) = st.captured {
            self.counts[victim.color().index()][victim.kind().index()] += 1;
        }
        self.key = st.key;
        self.rule60 = st.rule60;
        self.side_to_move = !self.side_to_move;
        self.game_ply -= 1;
    }

    /// Whether the current position already occurred with the same side to
    /// move since the last capture
    pub fn is_repetition(&self) -> bool {
        let len = self.history.len();
        let window = (self.rule60 as usize).min(len);
        (4..=window)
            .step_by(2)
            .any(|back| self.history[len - back].key == self.key)
    }

    pub fn is_rule60_draw(&self) -> bool {
        self.rule60 >= RULE60_PLIES
    }

    /// Mirror the board across the river and swap colors. Move history is
    /// discarded.
    pub fn flip(&mut self) {
        let mut board: Board = [None; Square::NUM];
        for sq in Square::all() {
            if let Some(p) = self.board[sq.index()] {
                board[sq.flip_rank().index()] = Some(p.swap_color());
            }
        }
        self.board = board;
        self.side_to_move = !self.side_to_move;
        self.king_sq = [
            self.king_sq[Color::Black.index()].flip_rank(),
            self.king_sq[Color::White.index()].flip_rank(),
        ];
        self.counts.swap(0, 1);
        self.history.clear();
        self.key = self.compute_key();
    }

    fn compute_key(&self) -> u64 {
        let z = &*ZOBRIST;
        let mut key = Square::all()
            .filter_map(|sq| self.piece_on(sq).map(|p| z.psq(p, sq)))
            .fold(0, |acc, k| acc ^ k);
        if self.side_to_move == Color::Black {
            key ^= z.side();
        }
        key
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SEPARATOR: &str = " +---+---+---+---+---+---+---+---+---+";
        writeln!(f, "{SEPARATOR}")?;
        for rank in (0..Square::RANK_NB).rev() {
            for file in 0..Square::FILE_NB {
                let c = Square::new(file, rank)
                    .and_then(|sq| self.piece_on(sq))
                    .map_or(' ', Piece::to_char);
                write!(f, " | {c}")?;
            }
            writeln!(f, " | {rank}")?;
            writeln!(f, "{SEPARATOR}")?;
        }
        writeln!(f, "   a   b   c   d   e   f   g   h   i")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", self.fen())?;
        write!(f, "Key: {:016X}", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(pos: &Position, text: &str) -> Move {
        let m = crate::notation::to_move(pos, text);
        assert!(m.is_ok(), "{text} should be legal");
        m
    }

    #[test]
    fn test_startpos_basics() {
        let pos = Position::startpos();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.king_square(Color::White).to_string(), "e0");
        assert_eq!(pos.king_square(Color::Black).to_string(), "e9");
        assert_eq!(pos.count(Color::Black, PieceType::Pawn), 5);
        assert_eq!(pos.material_count(), 2 * (20 + 10 + 10 + 6 + 4 + 5));
        assert!(!pos.in_check());
    }

    #[test]
    fn test_do_undo_restores_key() {
        let mut pos = Position::startpos();
        let before = pos.clone();
        let m = mv(&pos, "h2e2");
        pos.do_move(m);
        assert_ne!(pos.key(), before.key());
        assert_eq!(pos.key(), pos.compute_key());
        pos.undo_move(m);
        assert_eq!(pos.key(), before.key());
        assert_eq!(pos.fen(), before.fen());
    }

    #[test]
    fn test_capture_updates_counts() {
        let mut pos = Position::startpos();
        // Cannon takes the knight on b9.
        let m = mv(&pos, "b2b9");
        pos.do_move(m);
        assert_eq!(pos.count(Color::Black, PieceType::Knight), 1);
        assert_eq!(pos.rule60_count(), 0);
        assert_eq!(pos.key(), pos.compute_key());
        pos.undo_move(m);
        assert_eq!(pos.count(Color::Black, PieceType::Knight), 2);
    }

    #[test]
    fn test_repetition() {
        let mut pos = Position::startpos();
        for text in ["h0g2", "h9g7", "g2h0", "g7h9"] {
            let m = mv(&pos, text);
            pos.do_move(m);
        }
        assert!(pos.is_repetition());
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let mut pos =
            Position::from_fen("rnbakab1r/9/1c4nc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RNBAKABNR w - - 2 2")
                .unwrap();
        let fen = pos.fen();
        pos.flip();
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.piece_on(Square::parse("e7").unwrap()).map(Piece::to_char), Some('c'));
        assert_eq!(pos.key(), pos.compute_key());
        pos.flip();
        assert_eq!(pos.fen(), fen);
    }

    #[test]
    fn test_display_contains_fen() {
        let pos = Position::startpos();
        let text = pos.to_string();
        assert!(text.contains(&format!("Fen: {}", pos.fen())));
        assert!(text.lines().any(|l| l.starts_with(" | r | n | b | a | k")));
    }
}
