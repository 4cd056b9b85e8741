//! Perft node counting

use crate::movegen;
use crate::position::Position;
use crate::types::Move;

/// Per-root-move perft counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerftReport {
    pub divide: Vec<(Move, u64)>,
    pub nodes: u64,
}

/// Count leaf nodes of the legal move tree to `depth`
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = movegen::generate_legal(pos);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for m in moves {
        pos.do_move(m);
        nodes += perft(pos, depth - 1);
        pos.undo_move(m);
    }
    nodes
}

/// Perft split by root move
pub fn perft_divide(pos: &mut Position, depth: u32) -> PerftReport {
    let mut report = PerftReport::default();
    if depth == 0 {
        report.nodes = 1;
        return report;
    }
    for m in movegen::generate_legal(pos) {
        pos.do_move(m);
        let count = perft(pos, depth - 1);
        pos.undo_move(m);
        report.divide.push((m, count));
        report.nodes += count;
    }
    report
}
