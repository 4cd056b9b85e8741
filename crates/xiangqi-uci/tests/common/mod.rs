//! Common test utilities for xiangqi-uci tests

#![allow(dead_code)] // not every test file uses every helper

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};
use xiangqi_uci::{Session, SessionConfig};

pub const T_INIT: Duration = Duration::from_secs(5);
pub const T_BESTMOVE: Duration = Duration::from_secs(30);
pub const T_SHORT: Duration = Duration::from_millis(100);

pub fn open_session() -> Session {
    Session::open(SessionConfig::default()).expect("Failed to open session")
}

/// Push `cmd` and print it for test logs
pub fn send(session: &Session, cmd: &str) {
    println!(">>> {cmd}");
    session.push(cmd).expect("Failed to push command");
}

/// Collect output until a line starts with `prefix`
pub fn expect_prefix(session: &Session, prefix: &str, timeout: Duration) -> Vec<String> {
    let lines = session
        .wait_for(timeout, |line| line.starts_with(prefix))
        .unwrap_or_else(|| panic!("Timeout waiting for prefix: {prefix}"));
    for line in &lines {
        println!("<<< {line}");
    }
    lines
}

/// Spawn the engine binary with piped stdio
pub fn spawn_engine() -> Child {
    Command::new(env!("CARGO_BIN_EXE_xiangqi-uci"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("Failed to spawn engine")
}

pub fn send_command(stdin: &mut ChildStdin, cmd: &str) {
    println!(">>> {cmd}");
    writeln!(stdin, "{cmd}").expect("Failed to write command");
    stdin.flush().expect("Failed to flush stdin");
}

pub fn read_until_prefix(
    reader: &mut BufReader<&mut ChildStdout>,
    prefix: &str,
    timeout: Duration,
) -> Result<String, String> {
    let start = Instant::now();
    let mut buffer = String::new();

    while start.elapsed() < timeout {
        buffer.clear();
        match reader.read_line(&mut buffer) {
            Ok(0) => return Err("EOF reached".to_string()),
            Ok(_) => {
                let line = buffer.trim();
                if !line.is_empty() {
                    println!("<<< {line}");
                    if line.starts_with(prefix) {
                        return Ok(line.to_string());
                    }
                }
            }
            Err(e) => return Err(format!("Read error: {e}")),
        }
    }

    Err(format!("Timeout waiting for prefix: {prefix}"))
}
