// UCI (Universal Chess Interface) adapter for xiangqi

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use xiangqi_uci::misc;
use xiangqi_uci::stdin_reader::spawn_stdin_reader;
use xiangqi_uci::{CommandQueue, Output, UciLoop};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Run this single command and exit instead of reading stdin
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level))
        .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(args.command) {
        log::error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Vec<String>) -> Result<()> {
    let queue = Arc::new(CommandQueue::new());
    let output = Output::stdout();
    let running = Arc::new(AtomicBool::new(true));

    if command.is_empty() {
        output.post(&format!("{} by {}", misc::engine_info(), misc::ENGINE_AUTHOR));
        // never joined
        let _reader = spawn_stdin_reader(Arc::clone(&queue))?;
    }

    UciLoop::new(command, queue, output, running)?.run();
    Ok(())
}
