//! `bench`, `speedtest` and `eval` reports

mod common;

use common::*;
use std::time::Duration;

#[test]
fn test_bench_current_position_report() {
    let session = open_session();
    send(&session, "position fen 4ka3/4a4/9/9/9/9/9/4R4/3p5/4K4 w - - 0 1");
    send(&session, "bench 16 1 3 current depth");
    let lines = expect_prefix(&session, "Nodes/second", T_BESTMOVE);

    assert!(lines.contains(&"Position: 1/1 (4ka3/4a4/9/9/9/9/9/4R4/3p5/4K4 w - - 0 1)".to_string()));
    assert_eq!(lines.iter().filter(|l| l.starts_with("bestmove ")).count(), 1);
    assert!(lines.iter().any(|l| l.starts_with("Total time (ms) : ")));
    let nodes: u64 = lines
        .iter()
        .find_map(|l| l.strip_prefix("Nodes searched  : "))
        .expect("nodes line")
        .parse()
        .unwrap();
    assert!(nodes > 0);
}

#[test]
fn test_bench_perft_limit_counts_perft_nodes() {
    let session = open_session();
    send(&session, "bench 16 1 2 current perft");
    let lines = expect_prefix(&session, "Nodes/second", T_BESTMOVE);
    assert!(lines.contains(&"Nodes searched: 1920".to_string()));
    assert!(lines.contains(&"Nodes searched  : 1920".to_string()));
}

#[test]
fn test_bench_eval_lists_trace() {
    let session = open_session();
    send(&session, "bench 16 1 1 current eval");
    let lines = expect_prefix(&session, "Nodes/second", T_INIT);
    assert!(lines.iter().any(|l| l.starts_with("Final evaluation")));
    assert!(lines.contains(&"Nodes searched  : 0".to_string()));
}

#[test]
fn test_bench_restores_interactive_output() {
    let session = open_session();
    send(&session, "bench 16 1 1 current depth");
    expect_prefix(&session, "Nodes/second", T_BESTMOVE);
    send(&session, "go depth 1");
    let lines = expect_prefix(&session, "bestmove ", T_BESTMOVE);
    assert!(lines.iter().any(|l| l.starts_with("info depth 1 ")));
}

#[test]
fn test_bench_bad_limit_type() {
    let session = open_session();
    send(&session, "bench 16 1 1 default byoyomi");
    let line = session.recv_timeout(T_INIT).unwrap();
    assert_eq!(line, "info string unknown bench limit type 'byoyomi'");
}

#[test]
fn test_speedtest_report_then_interactive_again() {
    let session = open_session();
    send(&session, "speedtest 1 8 650");
    let lines = expect_prefix(&session, "Nodes/second               : ", Duration::from_secs(60));

    assert!(lines.contains(&"Warmup position 3/3".to_string()));
    assert!(lines.contains(&"Position 13/13".to_string()));
    assert!(!lines.iter().any(|l| l.starts_with("bestmove ") || l.starts_with("info depth")));
    assert!(lines.contains(&"User invocation            : speedtest 1 8 650".to_string()));
    assert!(lines.contains(&"Filled invocation          : speedtest 1 8 650".to_string()));
    assert!(lines.contains(&"Thread count               : 1".to_string()));
    assert!(lines.contains(&"TT size [MiB]              : 8".to_string()));
    assert!(lines.contains(&"Large pages                : no".to_string()));

    send(&session, "go depth 1");
    let lines = expect_prefix(&session, "bestmove ", T_BESTMOVE);
    assert!(lines.iter().any(|l| l.starts_with("info depth 1 ")));
}

#[test]
fn test_eval_command() {
    let session = open_session();
    send(&session, "eval");
    let lines = expect_prefix(&session, "Final evaluation", T_INIT);
    assert!(lines[0].contains("Term"));
    assert!(lines.iter().any(|l| l.trim_start().starts_with("Material")));
}
