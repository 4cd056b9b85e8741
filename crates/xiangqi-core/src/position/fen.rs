//! FEN import and export

use super::{Board, Position, attacks};
use crate::error::FenError;
use crate::types::{Color, Piece, PieceType, Square};

pub const START_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1";

impl Position {
    /// Parse a FEN string. The side to move defaults to White; the move
    /// counters default to `0 1`. `-` placeholders are skipped.
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut fields = fen.split_whitespace();
        let placement = fields.next().ok_or(FenError::Empty)?;
        let board = parse_placement(placement)?;

        let side = match fields.next() {
            None | Some("w") | Some("r") => Color::White,
            Some("b") => Color::Black,
            Some(other) => return Err(FenError::InvalidSide(other.to_string())),
        };

        let mut counters = fields.filter(|f| *f != "-");
        let rule60 = parse_counter(counters.next(), 0)?;
        let fullmove = parse_counter(counters.next(), 1)?;

        Position::from_parts(board, side, rule60, fullmove)
    }

    fn from_parts(board: Board, side: Color, rule60: i32, fullmove: i32) -> Result<Position, FenError> {
        let mut counts = [[0u8; PieceType::NUM]; Color::NUM];
        let mut kings: [Vec<Square>; Color::NUM] = [Vec::new(), Vec::new()];
        for sq in Square::all() {
            if let Some(p) = board[sq.index()] {
                let slot = &mut counts[p.color().index()][p.kind().index()];
                *slot = slot.saturating_add(1);
                if p.kind() == PieceType::King {
                    kings[p.color().index()].push(sq);
                }
            }
        }

        let mut king_sq = [Square::from_index(0); Color::NUM];
        for color in Color::ALL {
            let found = &kings[color.index()];
            if found.len() != 1 {
                let side = if color == Color::White { "white" } else { "black" };
                return Err(FenError::KingCount { side, count: found.len() });
            }
            if !found[0].in_palace(color) {
                return Err(FenError::KingOutsidePalace(found[0].to_string()));
            }
            king_sq[color.index()] = found[0];
        }

        let them = king_sq[(!side).index()];
        if attacks::attacked_by(&board, them, side)
            || attacks::kings_face(&board, them, king_sq[side.index()])
        {
            return Err(FenError::KingCapturable);
        }

        let mut pos = Position {
            board,
            side_to_move: side,
            king_sq,
            counts,
            key: 0,
            rule60,
            game_ply: (2 * (fullmove - 1)).max(0) + i32::from(side == Color::Black),
            history: Vec::new(),
        };
        pos.key = pos.compute_key();
        Ok(pos)
    }

    /// FEN of the current position
    pub fn fen(&self) -> String {
        let mut out = String::with_capacity(64);
        for rank in (0..Square::RANK_NB).rev() {
            let mut empty = 0;
            for file in 0..Square::FILE_NB {
                match Square::new(file, rank).and_then(|sq| self.piece_on(sq)) {
                    Some(p) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(p.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        let side = self.side_to_move;
        let fullmove = 1 + (self.game_ply - i32::from(side == Color::Black)).max(0) / 2;
        format!("{out} {} - - {} {fullmove}", side.to_char(), self.rule60)
    }
}

fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != Square::RANK_NB as usize {
        return Err(FenError::RankCount(rows.len()));
    }

    let mut board: Board = [None; Square::NUM];
    for (i, row) in rows.iter().enumerate() {
        let rank = Square::RANK_NB - 1 - i as i32;
        let mut file = 0;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as i32;
                continue;
            }
            let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece(c))?;
            let sq = Square::new(file, rank).ok_or(FenError::RankWidth { rank, files: file + 1 })?;
            board[sq.index()] = Some(piece);
            file += 1;
        }
        if file != Square::FILE_NB {
            return Err(FenError::RankWidth { rank, files: file });
        }
    }
    Ok(board)
}

fn parse_counter(field: Option<&str>, default: i32) -> Result<i32, FenError> {
    match field {
        None => Ok(default),
        Some(text) => text
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| FenError::InvalidCounter(text.to_string())),
    }
}
