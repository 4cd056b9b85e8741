//! `bench` and `speedtest`
//!
//! Both commands expand their arguments into a list of ordinary protocol
//! commands which are then executed synchronously against the search
//! session, one `go` at a time.

use crate::misc;
use crate::parser::{Command, parse_command};
use crate::search_session::{ReportMode, SearchSession};
use std::fs;
use std::time::Instant;
use thiserror::Error;

/// Positions searched by `bench` when no FEN file is given
pub const DEFAULT_FENS: &[&str] = &[
    "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1",
    "rnbakab1r/9/1c4nc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RNBAKABNR w - - 2 2",
    "rnbakabr1/9/1c4nc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C1N2/9/RNBAKAB1R w - - 4 3",
    "rnbakabr1/9/1c4nc1/p3p1p1p/2p6/2P6/P3P1P1P/1C2C1N2/9/RNBAKAB1R w - - 0 4",
    "r2akab2/9/2n1b1n2/p2c4p/2p3p2/9/P1P3P1P/2NC2N2/9/R1BAKAB1R w - - 0 8",
    // endgames
    "3k5/9/9/9/9/9/9/9/4A4/3AKR3 w - - 0 1",
    "4ka3/4a4/9/9/9/9/9/4R4/3p5/4K4 w - - 0 1",
];

/// Opening line replayed by `speedtest`, one position per prefix
const SPEEDTEST_GAME: &[&str] = &[
    "h2e2", "h9g7", "h0g2", "i9h9", "i0h0", "b9c7", "b0c2", "a9b9", "a0b0", "c6c5", "g3g4", "g6g5",
];

const LIMIT_TYPES: &[&str] = &["depth", "nodes", "movetime", "perft", "mate", "eval"];

const NUM_WARMUP_POSITIONS: usize = 3;
const HASHFULL_AGES: [u32; 2] = [0, 999];
const DEFAULT_SPEEDTEST_MS: u64 = 15_000;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Unable to open file {path}: {source}")]
    FenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown bench limit type '{0}'")]
    LimitType(String),
}

/// Expand `bench [hash] [threads] [limit] [fenFile] [limitType]`
pub fn setup_bench(current_fen: &str, args: &[String]) -> Result<Vec<String>, BenchError> {
    let arg = |i: usize, default: &str| args.get(i).cloned().unwrap_or_else(|| default.to_string());

    let hash = numeric_arg(&arg(0, "16"), 16);
    let threads = numeric_arg(&arg(1, "1"), 1);
    let limit = numeric_arg(&arg(2, "5"), 5);
    let fen_file = arg(3, "default");
    let limit_type = arg(4, "depth");

    if !LIMIT_TYPES.contains(&limit_type.as_str()) {
        return Err(BenchError::LimitType(limit_type));
    }

    let fens: Vec<String> = match fen_file.as_str() {
        "default" => DEFAULT_FENS.iter().map(|f| f.to_string()).collect(),
        "current" => vec![current_fen.to_string()],
        path => fs::read_to_string(path)
            .map_err(|source| BenchError::FenFile { path: path.to_string(), source })?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
    };

    let mut list = vec![
        format!("setoption name Threads value {threads}"),
        format!("setoption name Hash value {hash}"),
        "ucinewgame".to_string(),
    ];

    for fen in fens {
        if fen.starts_with("setoption") {
            list.push(fen);
            continue;
        }
        list.push(format!("position fen {fen}"));
        if limit_type == "eval" {
            list.push("eval".to_string());
        } else {
            list.push(format!("go {limit_type} {limit}"));
        }
    }

    Ok(list)
}

fn numeric_arg(text: &str, default: u64) -> u64 {
    text.parse().unwrap_or_else(|_| {
        log::warn!("ignoring non-numeric bench argument '{text}'");
        default
    })
}

/// Expanded `speedtest` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSetup {
    pub threads: u64,
    pub tt_size: u64,
    pub commands: Vec<String>,
    pub original_invocation: String,
    pub filled_invocation: String,
}

/// Expand `speedtest [threads] [hash] [time]`.
///
/// Every position of the game line gets an equal share of the total time.
pub fn setup_speedtest(args: &[String], available: usize) -> BenchmarkSetup {
    let threads = args.first().map_or(available as u64, |a| numeric_arg(a, available as u64)).max(1);
    let tt_size = args.get(1).map_or(16 * threads, |a| numeric_arg(a, 16 * threads)).max(1);
    let total_ms = args.get(2).map_or(DEFAULT_SPEEDTEST_MS, |a| numeric_arg(a, DEFAULT_SPEEDTEST_MS));

    let positions = SPEEDTEST_GAME.len() as u64 + 1;
    let movetime = (total_ms / positions).max(1);

    let mut commands = vec!["ucinewgame".to_string()];
    for ply in 0..=SPEEDTEST_GAME.len() {
        if ply == 0 {
            commands.push("position startpos".to_string());
        } else {
            commands.push(format!("position startpos moves {}", SPEEDTEST_GAME[..ply].join(" ")));
        }
        commands.push(format!("go movetime {movetime}"));
    }

    BenchmarkSetup {
        threads,
        tt_size,
        commands,
        original_invocation: args.join(" "),
        filled_invocation: format!("{threads} {tt_size} {total_ms}"),
    }
}

fn counts_as_position(command: &str) -> bool {
    command.starts_with("go ") || command == "eval"
}

impl SearchSession {
    /// Run the `bench` suite and print the node/time report
    pub fn bench(&mut self, args: &[String]) {
        let list = match setup_bench(&self.engine().fen(), args) {
            Ok(list) => list,
            Err(e) => {
                self.output.info_string(&e.to_string());
                return;
            }
        };

        let total = list.iter().filter(|c| counts_as_position(c)).count();
        let _mode = self.set_report_mode(ReportMode::Bench);
        let mut index = 0;
        let mut nodes = 0u64;
        let mut start = Instant::now();

        for command in &list {
            if counts_as_position(command) {
                index += 1;
                let header = format!("\nPosition: {index}/{total} ({})", self.engine().fen());
                self.output.post(&header);
            }

            match parse_command(command) {
                Command::Go(limits) => match limits.perft_depth() {
                    Some(depth) => nodes += self.perft(depth),
                    None => {
                        self.go(limits);
                        self.wait_for_search_finished();
                        nodes += self.take_nodes();
                    }
                },
                Command::Eval => self.trace_eval(),
                Command::SetOption { name, value } => self.setoption(&name, value.as_deref()),
                Command::Position(spec) => self.set_position(&spec),
                Command::UciNewGame => {
                    self.search_clear();
                    start = Instant::now();
                }
                other => log::warn!("bench skipping {other:?}"),
            }
        }

        let elapsed = start.elapsed().as_millis() as u64 + 1;
        self.output.post(&format!(
            "\n===========================\n\
             Total time (ms) : {elapsed}\n\
             Nodes searched  : {nodes}\n\
             Nodes/second    : {}",
            1000 * nodes / elapsed
        ));
    }

    /// Run the `speedtest` warm-up and measurement and print the
    /// environment report
    pub fn speedtest(&mut self, args: &[String]) {
        let setup = setup_speedtest(args, misc::available_parallelism());
        let total_go = setup.commands.iter().filter(|c| c.starts_with("go ")).count();
        let _mode = self.set_report_mode(ReportMode::Speedtest);

        self.setoption("Threads", Some(setup.threads.to_string().as_str()));
        self.setoption("Hash", Some(setup.tt_size.to_string().as_str()));

        let mut warmed = 0;
        for command in &setup.commands {
            if warmed >= NUM_WARMUP_POSITIONS {
                break;
            }
            if let Command::Go(_) = parse_command(command) {
                warmed += 1;
                self.output.post(&format!("Warmup position {warmed}/{NUM_WARMUP_POSITIONS}"));
            }
            self.run_timed(command);
        }
        self.take_nodes();

        self.search_clear();

        let mut index = 0;
        let mut nodes = 0u64;
        let mut total_ms = 0u64;
        let mut readings = 0u32;
        let mut max_hashfull = [0u32; HASHFULL_AGES.len()];
        let mut sum_hashfull = [0u32; HASHFULL_AGES.len()];

        for command in &setup.commands {
            let is_go = matches!(parse_command(command), Command::Go(_));
            if is_go {
                index += 1;
                self.output.post(&format!("Position {index}/{total_go}"));
            }
            total_ms += self.run_timed(command);
            if is_go {
                readings += 1;
                for (i, &age) in HASHFULL_AGES.iter().enumerate() {
                    let hashfull = self.engine().hashfull(age);
                    max_hashfull[i] = max_hashfull[i].max(hashfull);
                    sum_hashfull[i] += hashfull;
                }
                nodes += self.take_nodes();
            }
        }

        let total_ms = total_ms.max(1);
        let readings = readings.max(1);
        let invocation = |rest: &str| if rest.is_empty() { "speedtest".to_string() } else { format!("speedtest {rest}") };

        self.output.post(&format!(
            "===========================\n\
             Version                    : {}\n\
             {}\
             Large pages                : no\n\
             User invocation            : {}\n\
             Filled invocation          : {}\n\
             Available processors       : 0-{}\n\
             Thread count               : {}\n\
             Thread binding             : none\n\
             TT size [MiB]              : {}\n\
             Hash max, avg [per mille]  : \n    \
             single search          : {}, {}\n    \
             single game            : {}, {}\n\
             Total nodes searched       : {nodes}\n\
             Total search time [s]      : {:.3}\n\
             Nodes/second               : {}",
            misc::engine_info(),
            misc::compiler_info(),
            invocation(&setup.original_invocation),
            invocation(&setup.filled_invocation),
            misc::available_parallelism() - 1,
            setup.threads,
            setup.tt_size,
            max_hashfull[0],
            sum_hashfull[0] / readings,
            max_hashfull[1],
            sum_hashfull[1] / readings,
            total_ms as f64 / 1000.0,
            1000 * nodes / total_ms,
        ));
    }

    /// Execute one expanded speedtest command; returns the search time of a
    /// `go`, zero otherwise
    fn run_timed(&mut self, command: &str) -> u64 {
        match parse_command(command) {
            Command::Go(limits) => {
                let start = Instant::now();
                self.go(limits);
                self.wait_for_search_finished();
                start.elapsed().as_millis() as u64
            }
            Command::Position(spec) => {
                self.set_position(&spec);
                0
            }
            Command::UciNewGame => {
                self.search_clear();
                0
            }
            other => {
                log::warn!("speedtest skipping {other:?}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xiangqi_core::{Position, START_FEN};

    fn args(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_default_bench_list() {
        let list = setup_bench(START_FEN, &[]).unwrap();
        assert_eq!(list[0], "setoption name Threads value 1");
        assert_eq!(list[1], "setoption name Hash value 16");
        assert_eq!(list[2], "ucinewgame");
        assert_eq!(list.len(), 3 + 2 * DEFAULT_FENS.len());
        assert_eq!(list[3], format!("position fen {}", DEFAULT_FENS[0]));
        assert_eq!(list[4], "go depth 5");
    }

    #[test]
    fn test_bench_current_position_with_eval() {
        let fen = "4ka3/4a4/9/9/9/9/9/4R4/3p5/4K4 w - - 0 1";
        let list = setup_bench(fen, &args("32 2 9 current eval")).unwrap();
        assert_eq!(
            list,
            vec![
                "setoption name Threads value 2".to_string(),
                "setoption name Hash value 32".to_string(),
                "ucinewgame".to_string(),
                format!("position fen {fen}"),
                "eval".to_string(),
            ]
        );
    }

    #[test]
    fn test_bench_rejects_unknown_limit_type() {
        assert!(matches!(setup_bench(START_FEN, &args("16 1 5 default byoyomi")), Err(BenchError::LimitType(_))));
    }

    #[test]
    fn test_bench_missing_fen_file() {
        let err = setup_bench(START_FEN, &args("16 1 5 /nonexistent/positions.fen")).unwrap_err();
        assert!(err.to_string().starts_with("Unable to open file /nonexistent/positions.fen"));
    }

    #[test]
    fn test_default_fens_are_valid() {
        for fen in DEFAULT_FENS {
            if let Err(e) = Position::from_fen(fen) {
                panic!("{fen}: {e}");
            }
        }
    }

    #[test]
    fn test_speedtest_defaults() {
        let setup = setup_speedtest(&[], 8);
        assert_eq!(setup.threads, 8);
        assert_eq!(setup.tt_size, 128);
        assert_eq!(setup.original_invocation, "");
        assert_eq!(setup.filled_invocation, "8 128 15000");
        assert_eq!(setup.commands[0], "ucinewgame");
        let go_count = setup.commands.iter().filter(|c| c.starts_with("go ")).count();
        assert_eq!(go_count, SPEEDTEST_GAME.len() + 1);
        assert_eq!(setup.commands[2], "go movetime 1153");
    }

    #[test]
    fn test_speedtest_explicit_args() {
        let setup = setup_speedtest(&args("2 64 1300"), 8);
        assert_eq!(setup.threads, 2);
        assert_eq!(setup.tt_size, 64);
        assert_eq!(setup.original_invocation, "2 64 1300");
        assert!(setup.commands.iter().any(|c| c == "go movetime 100"));
    }

    #[test]
    fn test_speedtest_game_line_is_legal() {
        let mut pos = Position::startpos();
        for text in SPEEDTEST_GAME {
            let m = crate::format::to_move(&pos, text);
            assert!(m.is_ok(), "{text} is not legal in {}", pos.fen());
            pos.do_move(m);
        }
    }
}
