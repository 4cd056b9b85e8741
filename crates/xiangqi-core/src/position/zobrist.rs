//! Zobrist hashing keys

use crate::types::{Piece, Square};
use once_cell::sync::Lazy;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

pub(crate) struct Zobrist {
    psq: [[u64; Square::NUM]; Piece::NUM],
    side: u64,
}

impl Zobrist {
    fn new() -> Zobrist {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1_070_372);
        let mut psq = [[0u64; Square::NUM]; Piece::NUM];
        for row in psq.iter_mut() {
            for key in row.iter_mut() {
                *key = rng.next_u64();
            }
        }
        Zobrist { psq, side: rng.next_u64() }
    }

    #[inline]
    pub(crate) fn psq(&self, piece: Piece, sq: Square) -> u64 {
        self.psq[piece.index()][sq.index()]
    }

    #[inline]
    pub(crate) fn side(&self) -> u64 {
        self.side
    }
}

pub(crate) static ZOBRIST: Lazy<Zobrist> = Lazy::new(Zobrist::new);
