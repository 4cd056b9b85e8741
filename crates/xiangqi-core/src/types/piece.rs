//! Piece kinds and colored pieces

use super::Color;

/// Piece kind, independent of color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    Rook = 0,
    Advisor = 1,
    Cannon = 2,
    Pawn = 3,
    Knight = 4,
    Bishop = 5,
    King = 6,
}

impl PieceType {
    pub const NUM: usize = 7;

    pub const ALL: [PieceType; PieceType::NUM] = [
        PieceType::Rook,
        PieceType::Advisor,
        PieceType::Cannon,
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::King,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase FEN letter
    pub const fn to_char(self) -> char {
        match self {
            PieceType::Rook => 'r',
            PieceType::Advisor => 'a',
            PieceType::Cannon => 'c',
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::King => 'k',
        }
    }

    /// Parse a lowercase FEN letter. `h` and `e` are accepted as the
    /// alternative knight and elephant letters.
    pub const fn from_char(c: char) -> Option<PieceType> {
        match c {
            'r' => Some(PieceType::Rook),
            'a' => Some(PieceType::Advisor),
            'c' => Some(PieceType::Cannon),
            'p' => Some(PieceType::Pawn),
            'n' | 'h' => Some(PieceType::Knight),
            'b' | 'e' => Some(PieceType::Bishop),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }
}

/// A piece of a given color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    color: Color,
    kind: PieceType,
}

impl Piece {
    pub const NUM: usize = Color::NUM * PieceType::NUM;

    #[inline]
    pub const fn new(color: Color, kind: PieceType) -> Piece {
        Piece { color, kind }
    }

    #[inline]
    pub const fn color(self) -> Color {
        self.color
    }

    #[inline]
    pub const fn kind(self) -> PieceType {
        self.kind
    }

    /// Dense index for zobrist and piece-square tables
    #[inline]
    pub const fn index(self) -> usize {
        self.color.index() * PieceType::NUM + self.kind.index()
    }

    /// FEN letter, uppercase for White
    pub const fn to_char(self) -> char {
        let c = self.kind.to_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub const fn from_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        match PieceType::from_char(c.to_ascii_lowercase()) {
            Some(kind) => Some(Piece::new(color, kind)),
            None => None,
        }
    }

    /// Same kind, other side
    #[inline]
    pub const fn swap_color(self) -> Piece {
        Piece::new(self.color.opponent(), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_char_roundtrip() {
        for color in Color::ALL {
            for kind in PieceType::ALL {
                let piece = Piece::new(color, kind);
                assert_eq!(Piece::from_char(piece.to_char()), Some(piece));
            }
        }
    }

    #[test]
    fn test_piece_aliases() {
        assert_eq!(Piece::from_char('H'), Some(Piece::new(Color::White, PieceType::Knight)));
        assert_eq!(Piece::from_char('e'), Some(Piece::new(Color::Black, PieceType::Bishop)));
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn test_piece_index_is_dense() {
        let mut seen = [false; Piece::NUM];
        for color in Color::ALL {
            for kind in PieceType::ALL {
                seen[Piece::new(color, kind).index()] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
