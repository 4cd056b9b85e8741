//! Per-thread search worker

use super::SharedSearch;
use crate::eval::evaluate;
use crate::events::{InfoFull, InfoIter, SearchEvent};
use crate::movegen;
use crate::position::Position;
use crate::tt::{value_from_tt, value_to_tt};
use crate::types::{Bound, MAX_PLY, Move, MoveList, PieceType, Score, Square, Value};
use crossbeam_channel::Sender;
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// `currmove` lines are only sent once a search has run this long
const CURRMOVE_REPORT_MS: i64 = 3000;

/// Nodes between node-counter flushes and time checks
const CHECK_INTERVAL: u64 = 1024;

const HISTORY_LIMIT: i32 = 1 << 20;

/// Piece weights for capture ordering
const ORDER_VALUES: [i32; PieceType::NUM] = {
    let mut v = [0; PieceType::NUM];
    v[PieceType::Rook as usize] = 9;
    v[PieceType::Advisor as usize] = 2;
    v[PieceType::Cannon as usize] = 5;
    v[PieceType::Pawn as usize] = 1;
    v[PieceType::Knight as usize] = 4;
    v[PieceType::Bishop as usize] = 2;
    v[PieceType::King as usize] = 100;
    v
};

type ScoredMoves = SmallVec<[(Move, i32); 128]>;

#[derive(Debug, Clone)]
pub(crate) struct RootMove {
    pub mv: Move,
    pub score: Value,
    pub previous_score: Value,
    pub pv: Vec<Move>,
    pub sel_depth: i32,
}

impl RootMove {
    pub fn new(mv: Move) -> Self {
        Self {
            mv,
            score: -Value::INFINITE,
            previous_score: -Value::INFINITE,
            pv: vec![mv],
            sel_depth: 0,
        }
    }

    /// Score of the last completed evaluation of this move
    fn reported_score(&self) -> Value {
        if self.score == -Value::INFINITE { self.previous_score } else { self.score }
    }
}

pub(crate) struct Worker {
    id: usize,
    pos: Position,
    shared: Arc<SharedSearch>,
    /// Only the main thread reports
    events: Option<Sender<SearchEvent>>,
    root_moves: Vec<RootMove>,
    killers: Vec<[Move; 2]>,
    history: Vec<i32>,
    nodes: u64,
    sel_depth: i32,
}

impl Worker {
    pub fn new(
        id: usize,
        pos: Position,
        root_moves: Vec<RootMove>,
        shared: Arc<SharedSearch>,
        events: Option<Sender<SearchEvent>>,
    ) -> Self {
        Self {
            id,
            pos,
            shared,
            events,
            root_moves,
            killers: vec![[Move::NONE; 2]; MAX_PLY as usize + 2],
            history: vec![0; Square::NUM * Square::NUM],
            nodes: 0,
            sel_depth: 0,
        }
    }

    #[inline]
    fn is_main(&self) -> bool {
        self.events.is_some()
    }

    #[inline]
    fn stopped(&self) -> bool {
        self.shared.signals.stopped()
    }

    /// Best move and expected reply of the last completed iteration
    pub fn best_and_ponder(&self) -> (Move, Move) {
        match self.root_moves.first() {
            Some(rm) => (rm.pv[0], rm.pv.get(1).copied().unwrap_or(Move::NONE)),
            None => (Move::NONE, Move::NONE),
        }
    }

    pub fn iterative_deepening(&mut self) {
        let max_depth = self.shared.limits.depth.map_or(MAX_PLY - 1, |d| d.clamp(1, MAX_PLY - 1));
        let multi_pv = self.shared.multi_pv.clamp(1, self.root_moves.len().max(1));
        // Helpers start one ply deeper on odd ids to spread the work.
        let mut depth = 1 + (self.id % 2) as i32;

        while depth <= max_depth && !self.stopped() {
            for rm in self.root_moves.iter_mut() {
                rm.previous_score = rm.score;
            }

            for pv_idx in 0..multi_pv {
                self.sel_depth = 0;
                self.search_root(depth, pv_idx);
                self.root_moves[pv_idx..].sort_by(|a, b| b.score.cmp(&a.score));
                if self.stopped() {
                    break;
                }
            }

            if self.stopped() {
                break;
            }

            if self.is_main() {
                self.report(depth, multi_pv);
                self.check_iteration_limits();
            }
            depth += 1;
        }
        self.flush_nodes();
    }

    fn search_root(&mut self, depth: i32, pv_idx: usize) {
        let mut alpha = -Value::INFINITE;
        let beta = Value::INFINITE;

        for i in pv_idx..self.root_moves.len() {
            let m = self.root_moves[i].mv;
            if let Some(events) = &self.events {
                if self.shared.limits.elapsed_ms() > CURRMOVE_REPORT_MS {
                    let info = InfoIter { depth, currmove: m, currmovenumber: i + 1 };
                    let _ = events.send(SearchEvent::Iter(info));
                }
            }

            let mut child_pv = Vec::new();
            self.pos.do_move(m);
            self.count_node();
            let value = if i == pv_idx {
                -self.search(-beta, -alpha, depth - 1, 1, &mut child_pv, true)
            } else {
                let v = -self.search(-alpha - 1, -alpha, depth - 1, 1, &mut child_pv, false);
                if v > alpha && !self.stopped() {
                    -self.search(-beta, -alpha, depth - 1, 1, &mut child_pv, true)
                } else {
                    v
                }
            };
            self.pos.undo_move(m);

            if self.stopped() {
                return;
            }

            let sel_depth = self.sel_depth;
            let rm = &mut self.root_moves[i];
            if i == pv_idx || value > alpha {
                rm.score = value;
                rm.sel_depth = sel_depth;
                rm.pv.clear();
                rm.pv.push(m);
                rm.pv.extend_from_slice(&child_pv);
                alpha = alpha.max(value);
            } else {
                rm.score = -Value::INFINITE;
            }
        }
    }

    fn search(
        &mut self,
        mut alpha: Value,
        mut beta: Value,
        depth: i32,
        ply: i32,
        pv: &mut Vec<Move>,
        pv_node: bool,
    ) -> Value {
        pv.clear();
        if depth <= 0 {
            return self.qsearch(alpha, beta, ply);
        }
        if self.stopped() {
            return Value::ZERO;
        }
        self.sel_depth = self.sel_depth.max(ply);
        if ply >= MAX_PLY {
            return evaluate(&self.pos);
        }
        if self.pos.is_repetition() || self.pos.is_rule60_draw() {
            return Value::DRAW;
        }

        alpha = alpha.max(Value::mated_in(ply));
        beta = beta.min(Value::mate_in(ply + 1));
        if alpha >= beta {
            return alpha;
        }

        let key = self.pos.key();
        let tt_hit = self.shared.tt.probe(key);
        let tt_move = tt_hit.map_or(Move::NONE, |h| h.mv);
        if let Some(hit) = tt_hit.filter(|h| !pv_node && h.depth >= depth) {
            let v = value_from_tt(hit.value, ply);
            let cutoff = match hit.bound {
                Bound::Exact => true,
                Bound::Lower => v >= beta,
                Bound::Upper => v <= alpha,
            };
            if cutoff {
                return v;
            }
        }

        let in_check = self.pos.in_check();
        let depth = if in_check { depth + 1 } else { depth };

        let mut moves = MoveList::new();
        movegen::generate_pseudo_legal(&self.pos, &mut moves);
        let ordered = self.order_moves(&moves, tt_move, ply);

        let original_alpha = alpha;
        let mut best_value = -Value::INFINITE;
        let mut best_move = Move::NONE;
        let mut legal = 0;
        let mut child_pv = Vec::new();

        for (m, _) in ordered {
            if !self.pos.is_legal(m) {
                continue;
            }
            legal += 1;
            let capture = self.pos.piece_on(m.to_sq()).is_some();

            self.pos.do_move(m);
            self.count_node();
            let value = if legal == 1 {
                -self.search(-beta, -alpha, depth - 1, ply + 1, &mut child_pv, pv_node)
            } else {
                let reduction = i32::from(depth >= 3 && legal > 4 && !capture && !in_check);
                let mut v = -self.search(-alpha - 1, -alpha, depth - 1 - reduction, ply + 1, &mut child_pv, false);
                if v > alpha && reduction > 0 {
                    v = -self.search(-alpha - 1, -alpha, depth - 1, ply + 1, &mut child_pv, false);
                }
                if pv_node && v > alpha && v < beta {
                    v = -self.search(-beta, -alpha, depth - 1, ply + 1, &mut child_pv, true);
                }
                v
            };
            self.pos.undo_move(m);

            if self.stopped() {
                return Value::ZERO;
            }

            if value > best_value {
                best_value = value;
                if value > alpha {
                    best_move = m;
                    alpha = value;
                    if pv_node {
                        pv.clear();
                        pv.push(m);
                        pv.extend_from_slice(&child_pv);
                    }
                    if value >= beta {
                        if !capture {
                            self.update_quiet_stats(m, ply, depth);
                        }
                        break;
                    }
                }
            }
        }

        if legal == 0 {
            // No legal moves loses, in check or not.
            return Value::mated_in(ply);
        }

        let bound = if best_value >= beta {
            Bound::Lower
        } else if best_value > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.shared.tt.store(key, best_move, value_to_tt(best_value, ply), depth, bound);
        best_value
    }

    fn qsearch(&mut self, mut alpha: Value, beta: Value, ply: i32) -> Value {
        if self.stopped() {
            return Value::ZERO;
        }
        self.sel_depth = self.sel_depth.max(ply);
        if ply >= MAX_PLY {
            return evaluate(&self.pos);
        }

        let in_check = self.pos.in_check();
        let mut best_value = if in_check {
            -Value::INFINITE
        } else {
            let stand_pat = evaluate(&self.pos);
            if stand_pat >= beta {
                return stand_pat;
            }
            alpha = alpha.max(stand_pat);
            stand_pat
        };

        let mut moves = MoveList::new();
        if in_check {
            movegen::generate_pseudo_legal(&self.pos, &mut moves);
        } else {
            movegen::generate_captures(&self.pos, &mut moves);
        }
        let ordered = self.order_moves(&moves, Move::NONE, ply);

        let mut legal = 0;
        for (m, _) in ordered {
            if !self.pos.is_legal(m) {
                continue;
            }
            legal += 1;
            self.pos.do_move(m);
            self.count_node();
            let value = -self.qsearch(-beta, -alpha, ply + 1);
            self.pos.undo_move(m);

            if self.stopped() {
                return Value::ZERO;
            }
            if value > best_value {
                best_value = value;
                if value > alpha {
                    alpha = value;
                    if value >= beta {
                        break;
                    }
                }
            }
        }

        if in_check && legal == 0 {
            return Value::mated_in(ply);
        }
        best_value
    }

    fn order_moves(&self, moves: &MoveList, tt_move: Move, ply: i32) -> ScoredMoves {
        let killers = self.killers[ply as usize];
        let mut scored: ScoredMoves = moves
            .iter()
            .map(|&m| {
                let score = if m == tt_move {
                    1 << 30
                } else if let Some(victim) = self.pos.piece_on(m.to_sq()) {
                    let attacker = self.pos.piece_on(m.from_sq()).map_or(0, |p| ORDER_VALUES[p.kind().index()]);
                    (1 << 24) + ORDER_VALUES[victim.kind().index()] * 128 - attacker
                } else if m == killers[0] {
                    (1 << 23) + 1
                } else if m == killers[1] {
                    1 << 23
                } else {
                    self.history[history_index(m)]
                };
                (m, score)
            })
            .collect();
        scored.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        scored
    }

    fn update_quiet_stats(&mut self, m: Move, ply: i32, depth: i32) {
        let slot = &mut self.killers[ply as usize];
        if slot[0] != m {
            slot[1] = slot[0];
            slot[0] = m;
        }
        let entry = &mut self.history[history_index(m)];
        *entry += depth * depth;
        if *entry > HISTORY_LIMIT {
            for h in self.history.iter_mut() {
                *h /= 2;
            }
        }
    }

    #[inline]
    fn count_node(&mut self) {
        self.nodes += 1;
        if self.nodes % CHECK_INTERVAL == 0 {
            self.flush_nodes();
            if self.is_main() {
                self.check_time();
            }
        }
    }

    fn flush_nodes(&self) {
        self.shared.nodes[self.id].store(self.nodes, Ordering::Relaxed);
    }

    fn check_time(&self) {
        let shared = &self.shared;
        let signals = &shared.signals;
        if signals.ponder.load(Ordering::Relaxed) {
            return;
        }
        let limits = &shared.limits;
        let elapsed = limits.elapsed_ms();
        let out_of_time = (limits.use_time_management()
            && (shared.time.maximum().is_some_and(|max| elapsed >= max)
                || signals.stop_on_ponderhit.load(Ordering::Relaxed)))
            || limits.movetime.is_some_and(|mt| elapsed >= mt)
            || limits.nodes.is_some_and(|n| shared.total_nodes() >= n);
        if out_of_time {
            signals.stop.store(true, Ordering::Relaxed);
        }
    }

    /// Decide after a completed iteration whether to start another one
    fn check_iteration_limits(&self) {
        let shared = &self.shared;
        let signals = &shared.signals;
        let best = self.root_moves[0].score;

        let mate_found = shared
            .limits
            .mate
            .is_some_and(|mate| best.is_win() && Value::MATE.raw() - best.raw() <= 2 * mate);
        if mate_found {
            signals.stop.store(true, Ordering::Relaxed);
            return;
        }

        let limits = &shared.limits;
        if limits.use_time_management()
            && shared.time.optimum().is_some_and(|opt| limits.elapsed_ms() > opt)
        {
            if signals.ponder.load(Ordering::Relaxed) {
                signals.stop_on_ponderhit.store(true, Ordering::Relaxed);
            } else {
                signals.stop.store(true, Ordering::Relaxed);
            }
        }
        // Node and movetime limits may already be met between checks.
        self.check_time();
    }

    fn report(&self, depth: i32, multi_pv: usize) {
        let Some(events) = &self.events else {
            return;
        };
        self.flush_nodes();
        let shared = &self.shared;
        let elapsed = shared.limits.elapsed_ms().max(1) as u64;
        let nodes = shared.total_nodes();
        let hashfull = shared.tt.hashfull(0);
        let material = self.pos.material_count();

        for (i, rm) in self.root_moves.iter().take(multi_pv).enumerate() {
            let value = rm.reported_score();
            let info = InfoFull {
                depth,
                sel_depth: rm.sel_depth,
                multi_pv: i + 1,
                score: Score::from_value(value),
                bound: Bound::Exact,
                value,
                material,
                nodes,
                nps: nodes * 1000 / elapsed,
                hashfull,
                tb_hits: 0,
                time_ms: elapsed,
                pv: rm.pv.clone(),
            };
            if events.send(SearchEvent::UpdateFull(info)).is_err() {
                log::debug!("search event receiver dropped");
            }
        }
    }
}

#[inline]
fn history_index(m: Move) -> usize {
    m.from_sq().index() * Square::NUM + m.to_sq().index()
}
