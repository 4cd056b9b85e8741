//! Board squares
//!
//! Files run `a`..`i` from White's left, ranks `0`..`9` from White's back rank.
//! The index is `rank * 9 + file`.

use super::Color;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    pub const FILE_NB: i32 = 9;
    pub const RANK_NB: i32 = 10;
    pub const NUM: usize = 90;

    /// Square at `(file, rank)`, or `None` when off the board
    #[inline]
    pub const fn new(file: i32, rank: i32) -> Option<Square> {
        if file < 0 || file >= Self::FILE_NB || rank < 0 || rank >= Self::RANK_NB {
            None
        } else {
            Some(Square((rank * Self::FILE_NB + file) as u8))
        }
    }

    #[inline]
    pub const fn from_index(index: usize) -> Square {
        debug_assert!(index < Self::NUM);
        Square(index as u8)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn file(self) -> i32 {
        self.0 as i32 % Self::FILE_NB
    }

    #[inline]
    pub const fn rank(self) -> i32 {
        self.0 as i32 / Self::FILE_NB
    }

    #[inline]
    pub const fn offset(self, df: i32, dr: i32) -> Option<Square> {
        Square::new(self.file() + df, self.rank() + dr)
    }

    /// Mirror across the river
    #[inline]
    pub const fn flip_rank(self) -> Square {
        Square(((Self::RANK_NB - 1 - self.rank()) * Self::FILE_NB + self.file()) as u8)
    }

    /// Inside `color`'s palace (files d..f, the three back ranks)
    #[inline]
    pub const fn in_palace(self, color: Color) -> bool {
        let (file, rank) = (self.file(), self.rank());
        if file < 3 || file > 5 {
            return false;
        }
        match color {
            Color::White => rank <= 2,
            Color::Black => rank >= 7,
        }
    }

    /// On `color`'s side of the river
    #[inline]
    pub const fn on_home_side(self, color: Color) -> bool {
        match color {
            Color::White => self.rank() <= 4,
            Color::Black => self.rank() >= 5,
        }
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::NUM).map(Square::from_index)
    }

    /// Parse two-character notation such as `h2`
    pub fn parse(text: &str) -> Option<Square> {
        let mut chars = text.chars();
        let (f, r) = (chars.next()?, chars.next()?);
        if chars.next().is_some() || !('a'..='i').contains(&f) || !r.is_ascii_digit() {
            return None;
        }
        Square::new(f as i32 - 'a' as i32, r as i32 - '0' as i32)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file() as u8) as char;
        let rank = (b'0' + self.rank() as u8) as char;
        write!(f, "{file}{rank}")
    }
}
