//! End-to-end tests of the `xiangqi-uci` binary

mod common;

use assert_cmd::Command;
use common::*;
use std::fs;
use std::io::BufReader;
use std::time::Duration;

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout).lines().map(str::to_string).collect()
}

#[test]
fn test_piped_handshake() {
    let output = Command::cargo_bin("xiangqi-uci")
        .unwrap()
        .write_stdin("uci\nisready\nquit\n")
        .timeout(Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines[0].starts_with("Xiangqi-UCI "));
    assert!(lines[1].starts_with("id name Xiangqi-UCI "));
    let uciok = lines.iter().position(|l| l == "uciok").expect("uciok");
    assert_eq!(lines[uciok + 1], "readyok");
}

#[test]
fn test_eof_acts_as_quit() {
    let output = Command::cargo_bin("xiangqi-uci")
        .unwrap()
        .write_stdin("isready\n")
        .timeout(Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_lines(&output).contains(&"readyok".to_string()));
}

#[test]
fn test_single_shot_command_from_arguments() {
    let output = Command::cargo_bin("xiangqi-uci")
        .unwrap()
        .args(["go", "perft", "2"])
        .timeout(Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.last().map(String::as_str), Some("Nodes searched: 1920"));
    assert!(!lines.iter().any(|l| l.starts_with("Xiangqi-UCI ")));
}

#[test]
fn test_help_is_a_command_not_a_flag() {
    let output = Command::cargo_bin("xiangqi-uci")
        .unwrap()
        .arg("--help")
        .timeout(Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("GNU GPLv3"));
}

#[test]
fn test_bench_from_fen_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.fen");
    fs::write(&path, "3k5/9/9/9/9/9/9/9/4A4/3AKR3 w - - 0 1\n\n4ka3/4a4/9/9/9/9/9/4R4/3p5/4K4 w - - 0 1\n").unwrap();

    let output = Command::cargo_bin("xiangqi-uci")
        .unwrap()
        .args(["bench", "16", "1", "2"])
        .arg(&path)
        .arg("depth")
        .timeout(Duration::from_secs(60))
        .output()
        .unwrap();
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert!(lines.iter().any(|l| l.starts_with("Position: 2/2 (4ka3/")));
    assert_eq!(lines.iter().filter(|l| l.starts_with("bestmove ")).count(), 2);
    assert!(lines.last().unwrap().starts_with("Nodes/second    : "));
}

#[test]
fn test_interactive_stop_over_pipes() {
    let mut engine = spawn_engine();
    let mut stdin = engine.stdin.take().expect("Failed to get stdin");
    let stdout = engine.stdout.as_mut().expect("Failed to get stdout");
    let mut reader = BufReader::new(stdout);

    send_command(&mut stdin, "isready");
    read_until_prefix(&mut reader, "readyok", T_INIT).unwrap();

    send_command(&mut stdin, "go infinite");
    std::thread::sleep(Duration::from_millis(200));
    send_command(&mut stdin, "stop");
    let bestmove = read_until_prefix(&mut reader, "bestmove ", Duration::from_secs(5)).unwrap();
    assert!(!bestmove.contains("(none)"));

    send_command(&mut stdin, "quit");
    drop(stdin);
    assert!(engine.wait().unwrap().success());
}
