//! The protocol loop
//!
//! Pulls command lines either once from the process arguments or from the
//! [`CommandQueue`], and dispatches them against the [`SearchSession`].

use crate::misc;
use crate::output::Output;
use crate::parser::{Command, parse_command};
use crate::queue::CommandQueue;
use crate::search_session::SearchSession;
use xiangqi_core::StopHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct UciLoop {
    /// Single-shot command from the process arguments, if any
    args: Vec<String>,
    queue: Arc<CommandQueue>,
    output: Output,
    session: SearchSession,
    running: Arc<AtomicBool>,
}

impl UciLoop {
    pub fn new(
        args: Vec<String>,
        queue: Arc<CommandQueue>,
        output: Output,
        running: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let session = SearchSession::new(output.clone())?;
        Ok(Self { args, queue, output, session, running })
    }

    /// Handle that interrupts whatever search this loop is running
    pub fn stop_handle(&self) -> StopHandle {
        self.session.engine().stop_handle()
    }

    /// Process commands until `quit`, queue shutdown, or the end of the
    /// single argument command
    pub fn run(mut self) {
        self.running.store(true, Ordering::SeqCst);

        if self.args.is_empty() {
            while let Some(line) = self.queue.pop_blocking() {
                if self.execute(&line) {
                    break;
                }
            }
        } else {
            let line = self.args.join(" ");
            log::debug!("single-shot command: {line}");
            self.execute(&line);
            self.session.wait_for_search_finished();
        }

        self.running.store(false, Ordering::SeqCst);
        self.queue.shutdown();
        log::debug!("protocol loop finished");
    }

    /// Execute one command line; returns `true` for `quit`
    pub fn execute(&mut self, line: &str) -> bool {
        let command = parse_command(line);
        log::debug!("command: {command:?}");

        match command {
            Command::Quit => {
                self.session.stop();
                return true;
            }
            Command::Stop => self.session.stop(),
            Command::PonderHit => self.session.ponderhit(),
            Command::Uci => {
                self.output.post(&format!(
                    "id name {}\nid author {}\n{}",
                    misc::engine_info(),
                    misc::ENGINE_AUTHOR,
                    self.session.engine().options()
                ));
                self.output.post("uciok");
            }
            Command::IsReady => self.output.post("readyok"),
            Command::SetOption { name, value } => self.session.setoption(&name, value.as_deref()),
            Command::Position(spec) => self.session.set_position(&spec),
            Command::Go(limits) => {
                // Sent after `go` for the benefit of GUIs that only read
                // output once a search has been requested
                self.output.info_string(&self.session.engine().processor_information());
                self.output.info_string(&self.session.engine().thread_allocation_information());
                self.session.go(limits);
            }
            Command::UciNewGame => self.session.search_clear(),
            Command::Flip => self.session.flip(),
            Command::Display => self.output.post(&self.session.engine().visualize()),
            Command::Eval => self.session.trace_eval(),
            Command::Compiler => self.output.post(&misc::compiler_info()),
            Command::ExportNet(path) => {
                if let Err(e) = self.session.engine().save_network(path.as_deref()) {
                    self.output.info_string(&e.to_string());
                }
            }
            Command::Bench(args) => self.session.bench(&args),
            Command::Speedtest(args) => self.session.speedtest(&args),
            Command::Help => self.output.post(misc::HELP_TEXT),
            Command::Comment | Command::Empty => {}
            Command::Invalid { line, reason } => {
                log::debug!("malformed command: {reason}");
                self.output.info_string(&format!("Malformed command: '{line}'"));
            }
            Command::Unknown(line) => {
                self.output.post(&format!("Unknown command: '{line}'. Type help for more information."));
            }
        }

        false
    }
}
