//! Move encoding

use super::Square;
use smallvec::SmallVec;
use std::fmt;

/// A move packed into 16 bits: origin in the low 7 bits, destination above.
///
/// Two values never describe a real move: [`Move::NONE`] (origin and
/// destination both `a0`) and [`Move::NULL`] (both `b0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Move(u16);

impl Move {
    pub const NONE: Move = Move(0);
    pub const NULL: Move = Move(1 | (1 << 7));

    #[inline]
    pub const fn new(from: Square, to: Square) -> Move {
        Move(from.index() as u16 | ((to.index() as u16) << 7))
    }

    #[inline]
    pub const fn from_sq(self) -> Square {
        Square::from_index((self.0 & 0x7f) as usize)
    }

    #[inline]
    pub const fn to_sq(self) -> Square {
        Square::from_index((self.0 >> 7) as usize)
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn from_raw(raw: u16) -> Move {
        Move(raw)
    }

    /// False for the two sentinels
    #[inline]
    pub const fn is_ok(self) -> bool {
        (self.0 & 0x7f) != (self.0 >> 7)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::NONE => f.write_str("(none)"),
            Move::NULL => f.write_str("0000"),
            m => write!(f, "{}{}", m.from_sq(), m.to_sq()),
        }
    }
}

/// Move buffer sized for the largest Xiangqi move counts
pub type MoveList = SmallVec<[Move; 128]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_packing() {
        let from = Square::parse("h2").unwrap();
        let to = Square::parse("e2").unwrap();
        let m = Move::new(from, to);
        assert_eq!(m.from_sq(), from);
        assert_eq!(m.to_sq(), to);
        assert!(m.is_ok());
        assert_eq!(m.to_string(), "h2e2");
    }

    #[test]
    fn test_move_sentinels() {
        assert!(!Move::NONE.is_ok());
        assert!(!Move::NULL.is_ok());
        assert_eq!(Move::NONE.to_string(), "(none)");
        assert_eq!(Move::NULL.to_string(), "0000");
        assert_eq!(Move::default(), Move::NONE);
    }
}
