//! Score, move and info line formatting

use std::fmt;
use xiangqi_core::{Bound, Color, EvalTrace, InfoFull, InfoIter, InfoShort, Move, Score, Value};

pub use xiangqi_core::notation::{move_str, square, to_move};

/// Logistic win-rate model coefficients for a given material count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinRateParams {
    pub a: f64,
    pub b: f64,
}

const AS: [f64; 4] = [220.59891365, -810.35730430, 928.68185198, 79.83955423];
const BS: [f64; 4] = [61.99287416, -233.72674182, 325.85508322, -68.72720854];

/// `material` is the weighted count from
/// [`Position::material_count`](xiangqi_core::Position::material_count).
pub fn win_rate_params(material: i32) -> WinRateParams {
    let m = f64::from(material.clamp(17, 110)) / 65.0;
    let poly = |c: &[f64; 4]| ((c[0] * m + c[1]) * m + c[2]) * m + c[3];
    WinRateParams { a: poly(&AS), b: poly(&BS) }
}

/// Expected wins per mille for the side with value `v`
pub fn win_rate_model(v: Value, material: i32) -> i32 {
    let WinRateParams { a, b } = win_rate_params(material);
    (0.5 + 1000.0 / (1.0 + ((a - f64::from(v.raw())) / b).exp())).floor() as i32
}

/// Win/draw/loss estimate, per mille
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wdl {
    pub win: i32,
    pub draw: i32,
    pub loss: i32,
}

impl fmt::Display for Wdl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.win, self.draw, self.loss)
    }
}

pub fn wdl(v: Value, material: i32) -> Wdl {
    let win = win_rate_model(v, material);
    let loss = win_rate_model(-v, material);
    Wdl { win, draw: 1000 - win - loss, loss }
}

/// Internal units to centipawns, normalized so that 100 cp is a 50% win rate
pub fn to_cp(v: Value, material: i32) -> i32 {
    let WinRateParams { a, .. } = win_rate_params(material);
    (100.0 * f64::from(v.raw()) / a).round() as i32
}

pub fn format_score(score: Score) -> String {
    match score {
        Score::Mate { plies } => {
            let moves = (if plies > 0 { plies + 1 } else { plies }) / 2;
            format!("mate {moves}")
        }
        Score::InternalUnits { value } => format!("cp {value}"),
    }
}

fn bound_str(bound: Bound) -> Option<&'static str> {
    match bound {
        Bound::Exact => None,
        Bound::Upper => Some("upperbound"),
        Bound::Lower => Some("lowerbound"),
    }
}

pub fn format_iter(info: &InfoIter) -> String {
    format!(
        "info depth {} currmove {} currmovenumber {}",
        info.depth,
        move_str(info.currmove),
        info.currmovenumber
    )
}

pub fn format_no_moves(info: &InfoShort) -> String {
    format!("info depth {} score {}", info.depth, format_score(info.score))
}

pub fn format_full(info: &InfoFull, show_wdl: bool) -> String {
    let mut line = format!(
        "info depth {} seldepth {} multipv {} score {}",
        info.depth,
        info.sel_depth,
        info.multi_pv,
        format_score(info.score)
    );
    if let Some(bound) = bound_str(info.bound) {
        line.push(' ');
        line.push_str(bound);
    }
    if show_wdl {
        line.push_str(&format!(" wdl {}", wdl(info.value, info.material)));
    }
    let pv: Vec<String> = info.pv.iter().map(|&m| move_str(m)).collect();
    line.push_str(&format!(
        " nodes {} nps {} hashfull {} tbhits {} time {} pv {}",
        info.nodes,
        info.nps,
        info.hashfull,
        info.tb_hits,
        info.time_ms,
        pv.join(" ")
    ));
    line
}

pub fn format_bestmove(best: Move, ponder: Move) -> String {
    if ponder == Move::NONE {
        format!("bestmove {}", move_str(best))
    } else {
        format!("bestmove {} ponder {}", move_str(best), move_str(ponder))
    }
}

/// Evaluation breakdown table, in pawns from White's point of view
pub fn format_eval_trace(trace: &EvalTrace) -> String {
    let material = trace.material_count;
    let pawns = |v: i32| f64::from(to_cp(Value::new(v), material)) / 100.0;
    let row = |term: &str, side: [i32; Color::NUM]| {
        format!(
            "{term:>12} | {:>+8.2} | {:>+8.2} | {:>+8.2}",
            pawns(side[0]),
            pawns(side[1]),
            pawns(side[0] - side[1])
        )
    };

    let mut lines = vec![
        format!("{:>12} | {:>8} | {:>8} | {:>8}", "Term", "White", "Black", "Total"),
        "-------------+----------+----------+---------".to_string(),
        row("Material", trace.material),
        row("Positional", trace.positional),
        format!("{:>12} | {:>8} | {:>8} | {:>+8.2}", "Tempo", "", "", pawns(trace.tempo)),
        String::new(),
        format!("Final evaluation       {:+.2} (white side)", pawns(trace.total.raw())),
    ];
    if trace.in_check {
        lines.push("[side to move is in check]".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use xiangqi_core::{Position, Square};

    #[test]
    fn test_format_mate_scores() {
        assert_eq!(format_score(Score::Mate { plies: 1 }), "mate 1");
        assert_eq!(format_score(Score::Mate { plies: 2 }), "mate 1");
        assert_eq!(format_score(Score::Mate { plies: 3 }), "mate 2");
        assert_eq!(format_score(Score::Mate { plies: -2 }), "mate -1");
        assert_eq!(format_score(Score::Mate { plies: -3 }), "mate -1");
        assert_eq!(format_score(Score::Mate { plies: 0 }), "mate 0");
        assert_eq!(format_score(Score::InternalUnits { value: -37 }), "cp -37");
    }

    #[test]
    fn test_square_and_sentinel_moves() {
        assert_eq!(square(Square::from_index(0)), "a0");
        assert_eq!(square(Square::from_index(89)), "i9");
        assert_eq!(move_str(Move::NONE), "(none)");
        assert_eq!(move_str(Move::NULL), "0000");
        assert_eq!(to_move(&Position::startpos(), "e0e9"), Move::NONE);
        assert_eq!(to_move(&Position::startpos(), ""), Move::NONE);
    }

    #[test]
    fn test_bestmove_line() {
        let pos = Position::startpos();
        let best = to_move(&pos, "h2e2");
        assert_eq!(format_bestmove(best, Move::NONE), "bestmove h2e2");
        let mut after = pos.clone();
        after.do_move(best);
        let ponder = to_move(&after, "h9g7");
        assert_eq!(format_bestmove(best, ponder), "bestmove h2e2 ponder h9g7");
        assert_eq!(format_bestmove(Move::NONE, Move::NONE), "bestmove (none)");
    }

    fn sample_full() -> InfoFull {
        let pos = Position::startpos();
        InfoFull {
            depth: 5,
            sel_depth: 9,
            multi_pv: 1,
            score: Score::InternalUnits { value: 40 },
            bound: Bound::Exact,
            value: Value::new(40),
            material: pos.material_count(),
            nodes: 12345,
            nps: 600000,
            hashfull: 3,
            tb_hits: 0,
            time_ms: 20,
            pv: vec![to_move(&pos, "h2e2")],
        }
    }

    #[test]
    fn test_full_info_line() {
        let info = sample_full();
        assert_eq!(
            format_full(&info, false),
            "info depth 5 seldepth 9 multipv 1 score cp 40 nodes 12345 nps 600000 hashfull 3 tbhits 0 time 20 pv h2e2"
        );

        let bounded = InfoFull { bound: Bound::Lower, ..info.clone() };
        assert!(format_full(&bounded, false).contains("score cp 40 lowerbound nodes"));

        let with_wdl = format_full(&info, true);
        let expected = format!(" wdl {} nodes", wdl(info.value, info.material));
        assert!(with_wdl.contains(&expected));
    }

    #[test]
    fn test_iter_and_no_moves_lines() {
        let pos = Position::startpos();
        let iter = InfoIter { depth: 12, currmove: to_move(&pos, "b0c2"), currmovenumber: 3 };
        assert_eq!(format_iter(&iter), "info depth 12 currmove b0c2 currmovenumber 3");
        let short = InfoShort { depth: 0, score: Score::Mate { plies: 0 } };
        assert_eq!(format_no_moves(&short), "info depth 0 score mate 0");
    }

    #[test]
    fn test_even_score_is_mostly_drawish_at_full_material() {
        let material = Position::startpos().material_count();
        let w = wdl(Value::ZERO, material);
        assert_eq!(w.win, w.loss);
        assert!(w.draw > w.win);
        assert_eq!(to_cp(Value::ZERO, material), 0);
        assert!(to_cp(Value::new(400), material) > 0);
    }

    #[test]
    fn test_eval_trace_lists_terms() {
        let text = format_eval_trace(&xiangqi_core::eval::trace(&Position::startpos()));
        assert!(text.contains("Material"));
        assert!(text.contains("Positional"));
        assert!(text.contains("Final evaluation"));
        assert!(!text.contains("in check"));
    }

    proptest! {
        #[test]
        fn prop_wdl_sums_to_one_thousand(v in -32000i32..32000, material in 0i32..160) {
            let w = wdl(Value::new(v), material);
            prop_assert_eq!(w.win + w.draw + w.loss, 1000);
            prop_assert!(w.win >= 0 && w.loss >= 0);
        }

        #[test]
        fn prop_wdl_is_symmetric(v in -32000i32..32000, material in 0i32..160) {
            let us = wdl(Value::new(v), material);
            let them = wdl(Value::new(-v), material);
            prop_assert_eq!(us.win, them.loss);
            prop_assert_eq!(us.loss, them.win);
            prop_assert_eq!(us.draw, them.draw);
        }
    }
}
