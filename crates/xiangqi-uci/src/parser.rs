//! UCI command parser

use std::str::FromStr;
use xiangqi_core::{Color, Limits, START_FEN};

/// Arguments of a `position` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSpec {
    pub fen: String,
    pub moves: Vec<String>,
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Stop,
    PonderHit,
    Uci,
    IsReady,
    SetOption { name: String, value: Option<String> },
    Position(PositionSpec),
    Go(Limits),
    UciNewGame,
    Flip,
    /// `d`: print the board
    Display,
    Eval,
    Compiler,
    ExportNet(Option<String>),
    Bench(Vec<String>),
    Speedtest(Vec<String>),
    Help,
    /// `#` comment line
    Comment,
    Empty,
    /// Known verb whose arguments could not be understood
    Invalid { line: String, reason: String },
    Unknown(String),
}

/// Parse one command line. Never fails; bad input maps to
/// [`Command::Invalid`] or [`Command::Unknown`].
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&verb) = parts.first() else {
        return Command::Empty;
    };

    let invalid = |reason: String| Command::Invalid { line: line.to_string(), reason };

    match verb {
        "quit" => Command::Quit,
        "stop" => Command::Stop,
        "ponderhit" => Command::PonderHit,
        "uci" => Command::Uci,
        "isready" => Command::IsReady,
        "ucinewgame" => Command::UciNewGame,
        "setoption" => match parse_setoption(&parts[1..]) {
            Ok((name, value)) => Command::SetOption { name, value },
            Err(reason) => invalid(reason),
        },
        "position" => parse_position(&parts[1..]).map_or_else(invalid, Command::Position),
        // `fen ...` and `startpos ...` are read as the arguments of `position`
        "fen" | "startpos" => parse_position(&parts).map_or_else(invalid, Command::Position),
        "go" => Command::Go(parse_limits(&parts[1..])),
        "flip" => Command::Flip,
        "d" => Command::Display,
        "eval" => Command::Eval,
        "compiler" => Command::Compiler,
        "export_net" => Command::ExportNet(parts.get(1).map(|s| s.to_string())),
        "bench" => Command::Bench(owned(&parts[1..])),
        "speedtest" => Command::Speedtest(owned(&parts[1..])),
        "help" | "--help" | "license" | "--license" => Command::Help,
        _ if verb.starts_with('#') => Command::Comment,
        _ => Command::Unknown(line.to_string()),
    }
}

fn owned(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Parse `name <name...> [value <value...>]`
pub fn parse_setoption(parts: &[&str]) -> Result<(String, Option<String>), String> {
    if parts.first() != Some(&"name") {
        return Err("setoption requires 'name'".to_string());
    }

    let value_pos = parts.iter().position(|&p| p == "value");
    let name = parts[1..value_pos.unwrap_or(parts.len())].join(" ");
    if name.is_empty() {
        return Err("setoption requires an option name".to_string());
    }

    let value = value_pos
        .map(|pos| parts[pos + 1..].join(" "))
        .filter(|v| !v.is_empty());

    Ok((name, value))
}

/// Parse `startpos [moves ...]` or `fen <fen...> [moves ...]`
pub fn parse_position(parts: &[&str]) -> Result<PositionSpec, String> {
    let (fen, rest) = match parts.first() {
        Some(&"startpos") => (START_FEN.to_string(), &parts[1..]),
        Some(&"fen") => {
            let end = parts.iter().position(|&p| p == "moves").unwrap_or(parts.len());
            if end <= 1 {
                return Err("position fen requires a FEN".to_string());
            }
            (parts[1..end].join(" "), &parts[end..])
        }
        _ => return Err("position requires 'startpos' or 'fen'".to_string()),
    };

    let moves = match rest.split_first() {
        None => Vec::new(),
        Some((&"moves", moves)) => owned(moves),
        Some((token, _)) => return Err(format!("unexpected token '{token}'")),
    };

    Ok(PositionSpec { fen, moves })
}

/// Parse the arguments of `go`.
///
/// Keywords may come in any order. A value that does not parse leaves the
/// field unset and is left in place to be read as the next keyword.
/// `searchmoves` takes every remaining token.
pub fn parse_limits(parts: &[&str]) -> Limits {
    let mut limits = Limits::new();
    let mut i = 0;

    while i < parts.len() {
        let keyword = parts[i];
        i += 1;
        match keyword {
            "searchmoves" => {
                limits.searchmoves = owned(&parts[i..]);
                i = parts.len();
            }
            "wtime" => limits.time[Color::White.index()] = take(parts, &mut i),
            "btime" => limits.time[Color::Black.index()] = take(parts, &mut i),
            "winc" => limits.inc[Color::White.index()] = take(parts, &mut i),
            "binc" => limits.inc[Color::Black.index()] = take(parts, &mut i),
            "movestogo" => limits.movestogo = take(parts, &mut i),
            "depth" => limits.depth = take(parts, &mut i),
            "nodes" => limits.nodes = take(parts, &mut i),
            "movetime" => limits.movetime = take(parts, &mut i),
            "mate" => limits.mate = take(parts, &mut i),
            "perft" => limits.perft = take(parts, &mut i),
            "infinite" => limits.infinite = true,
            "ponder" => limits.ponder_mode = true,
            other => log::debug!("ignoring go token '{other}'"),
        }
    }

    limits
}

/// Consume `parts[*i]` if it parses as `T`
fn take<T: FromStr>(parts: &[&str], i: &mut usize) -> Option<T> {
    let value = parts.get(*i)?.parse().ok()?;
    *i += 1;
    Some(value)
}
