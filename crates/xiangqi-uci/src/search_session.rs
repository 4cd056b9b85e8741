//! Search session controller
//!
//! Owns the [`Engine`] and a reporter thread that turns [`SearchEvent`]s into
//! protocol lines. The loop thread never formats search output itself; it
//! only starts, stops and waits for runs.

use crate::format;
use crate::output::Output;
use crate::parser::PositionSpec;
use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use xiangqi_core::{Engine, EngineError, Limits, SearchEvent};

/// How search events are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Every event becomes a protocol line
    Interactive,
    /// Like `Interactive`, also recording the nodes of each full update
    Bench,
    /// Silent; only records nodes
    Speedtest,
}

#[derive(Debug)]
struct ReportState {
    mode: ReportMode,
    /// Nodes of the last full update seen outside interactive mode
    nodes: u64,
    /// Runs whose `BestMove` has been handled
    finished_runs: u64,
}

struct Reporter {
    state: Mutex<ReportState>,
    run_finished: Condvar,
    show_wdl: AtomicBool,
    output: Output,
}

impl Reporter {
    fn handle(&self, event: SearchEvent) {
        let mode = self.state.lock().mode;
        let verbose = mode != ReportMode::Speedtest;

        match event {
            SearchEvent::Iter(info) => {
                if verbose {
                    self.output.post(&format::format_iter(&info));
                }
            }
            SearchEvent::UpdateNoMoves(info) => {
                if verbose {
                    self.output.post(&format::format_no_moves(&info));
                }
            }
            SearchEvent::UpdateFull(info) => {
                if mode != ReportMode::Interactive {
                    self.state.lock().nodes = info.nodes;
                }
                if verbose {
                    let show_wdl = self.show_wdl.load(Ordering::Relaxed);
                    self.output.post(&format::format_full(&info, show_wdl));
                }
            }
            SearchEvent::Failed(reason) => {
                self.output.info_string(&format!("search failed: {reason}"));
            }
            SearchEvent::BestMove { best, ponder } => {
                if verbose {
                    self.output.post(&format::format_bestmove(best, ponder));
                }
                self.state.lock().finished_runs += 1;
                self.run_finished.notify_all();
            }
        }
    }

    fn run(&self, events: Receiver<SearchEvent>, shutdown: Receiver<()>) {
        loop {
            select! {
                recv(events) -> event => match event {
                    Ok(event) => self.handle(event),
                    Err(_) => break,
                },
                recv(shutdown) -> _ => {
                    for event in events.try_iter() {
                        self.handle(event);
                    }
                    break;
                }
            }
        }
        log::debug!("reporter thread exiting");
    }
}

/// Restores [`ReportMode::Interactive`] when dropped
#[must_use = "the report mode is reset as soon as the guard is dropped"]
pub struct ReportModeGuard {
    reporter: Arc<Reporter>,
}

impl Drop for ReportModeGuard {
    fn drop(&mut self) {
        self.reporter.state.lock().mode = ReportMode::Interactive;
    }
}

pub struct SearchSession {
    engine: Engine,
    reporter: Arc<Reporter>,
    reporter_thread: Option<JoinHandle<()>>,
    shutdown_tx: Option<Sender<()>>,
    started_runs: u64,
    pub(crate) output: Output,
}

impl SearchSession {
    pub fn new(output: Output) -> std::io::Result<Self> {
        let (events_tx, events_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = bounded(0);
        let engine = Engine::new(events_tx);

        let reporter = Arc::new(Reporter {
            state: Mutex::new(ReportState { mode: ReportMode::Interactive, nodes: 0, finished_runs: 0 }),
            run_finished: Condvar::new(),
            show_wdl: AtomicBool::new(engine.options().get_bool("UCI_ShowWDL").unwrap_or(false)),
            output: output.clone(),
        });

        let reporter_thread = {
            let reporter = Arc::clone(&reporter);
            thread::Builder::new()
                .name("uci-reporter".into())
                .spawn(move || reporter.run(events_rx, shutdown_rx))?
        };

        Ok(Self {
            engine,
            reporter,
            reporter_thread: Some(reporter_thread),
            shutdown_tx: Some(shutdown_tx),
            started_runs: 0,
            output,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run perft or start an asynchronous search
    pub fn go(&mut self, limits: Limits) {
        match limits.perft_depth() {
            Some(depth) => {
                self.perft(depth);
            }
            None => self.start(limits),
        }
    }

    fn start(&mut self, limits: Limits) {
        match self.engine.go(limits) {
            Ok(()) => self.started_runs += 1,
            Err(e) => {
                log::error!("failed to start search: {e}");
                self.output.info_string(&e.to_string());
            }
        }
    }

    /// Split perft of the current position; returns the total node count
    pub fn perft(&mut self, depth: u32) -> u64 {
        let fen = self.engine.fen();
        match self.engine.perft(&fen, depth) {
            Ok(report) => {
                let mut lines: Vec<String> = report
                    .divide
                    .iter()
                    .map(|&(m, count)| format!("{}: {count}", format::move_str(m)))
                    .collect();
                lines.push(String::new());
                lines.push(format!("Nodes searched: {}", report.nodes));
                self.output.post(&lines.join("\n"));
                report.nodes
            }
            Err(e) => {
                self.output.info_string(&e.to_string());
                0
            }
        }
    }

    pub fn stop(&self) {
        self.engine.stop();
    }

    pub fn ponderhit(&self) {
        self.engine.set_ponderhit(false);
    }

    /// Block until the current run is over and its `bestmove` has been
    /// written
    pub fn wait_for_search_finished(&mut self) {
        self.engine.wait_for_search_finished();

        let mut state = self.reporter.state.lock();
        while state.finished_runs < self.started_runs {
            let timed_out = self
                .reporter
                .run_finished
                .wait_for(&mut state, Duration::from_millis(200))
                .timed_out();
            if timed_out && self.reporter_thread.as_ref().is_none_or(|h| h.is_finished()) {
                log::error!("reporter thread is gone; not waiting for bestmove");
                break;
            }
        }
    }

    /// Apply an option once the running search has finished
    pub fn setoption(&mut self, name: &str, value: Option<&str>) {
        self.wait_for_search_finished();
        match self.engine.setoption(name, value) {
            Ok(()) => {
                let show_wdl = self.engine.options().get_bool("UCI_ShowWDL").unwrap_or(false);
                self.reporter.show_wdl.store(show_wdl, Ordering::Relaxed);
            }
            Err(e) => self.output.info_string(&e.to_string()),
        }
    }

    pub fn set_position(&mut self, spec: &PositionSpec) {
        match self.engine.set_position(&spec.fen, &spec.moves) {
            Ok(()) => {}
            Err(EngineError::Fen(e)) => {
                self.output.info_string(&format!("Invalid FEN '{}': {e}", spec.fen));
            }
            Err(e) => self.output.info_string(&e.to_string()),
        }
    }

    pub fn search_clear(&mut self) {
        self.wait_for_search_finished();
        self.engine.search_clear();
    }

    pub fn flip(&mut self) {
        self.engine.flip();
    }

    pub fn trace_eval(&self) {
        let trace = self.engine.trace_eval();
        self.output.post(&format::format_eval_trace(&trace));
    }

    /// Switch the report mode until the returned guard is dropped
    pub fn set_report_mode(&self, mode: ReportMode) -> ReportModeGuard {
        let mut state = self.reporter.state.lock();
        state.mode = mode;
        state.nodes = 0;
        ReportModeGuard { reporter: Arc::clone(&self.reporter) }
    }

    pub fn report_mode(&self) -> ReportMode {
        self.reporter.state.lock().mode
    }

    /// Nodes recorded since the last call
    pub fn take_nodes(&self) -> u64 {
        std::mem::take(&mut self.reporter.state.lock().nodes)
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.engine.stop();
        self.wait_for_search_finished();
        self.shutdown_tx.take();
        if let Some(handle) = self.reporter_thread.take() {
            if handle.join().is_err() {
                log::error!("reporter thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use xiangqi_core::{Move, START_FEN};

    fn session() -> (SearchSession, Receiver<String>) {
        let (output, rx) = Output::channel();
        (SearchSession::new(output).unwrap(), rx)
    }

    #[test]
    fn test_failed_run_reports_and_restores_mode() {
        let (output, rx) = Output::channel();
        let reporter = Arc::new(Reporter {
            state: Mutex::new(ReportState { mode: ReportMode::Interactive, nodes: 0, finished_runs: 0 }),
            run_finished: Condvar::new(),
            show_wdl: AtomicBool::new(false),
            output,
        });

        {
            reporter.state.lock().mode = ReportMode::Bench;
            let _guard = ReportModeGuard { reporter: Arc::clone(&reporter) };
            reporter.handle(SearchEvent::Failed("x".into()));
            reporter.handle(SearchEvent::BestMove { best: Move::NONE, ponder: Move::NONE });
            assert_eq!(reporter.state.lock().finished_runs, 1);
        }

        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["info string search failed: x", "bestmove (none)"]);
        assert_eq!(reporter.state.lock().mode, ReportMode::Interactive);
    }

    #[test]
    fn test_wait_includes_bestmove_line() {
        let (mut session, rx) = session();
        session.go(Limits { depth: Some(2), ..Limits::new() });
        session.wait_for_search_finished();
        let lines: Vec<String> = rx.try_iter().collect();
        assert!(lines.last().unwrap().starts_with("bestmove "));
        assert!(lines.iter().any(|l| l.starts_with("info depth 2 seldepth")));
    }

    #[test]
    fn test_perft_output() {
        let (mut session, rx) = session();
        assert_eq!(session.perft(1), 44);
        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(lines.len(), 46);
        assert_eq!(lines[44], "");
        assert_eq!(lines[45], "Nodes searched: 44");
        assert!(lines[..44].iter().all(|l| l.ends_with(": 1")));
    }

    #[test]
    fn test_speedtest_mode_is_silent_and_counts_nodes() {
        let (mut session, rx) = session();
        {
            let _guard = session.set_report_mode(ReportMode::Speedtest);
            session.go(Limits { depth: Some(3), ..Limits::new() });
            session.wait_for_search_finished();
            assert!(session.take_nodes() > 0);
            assert_eq!(session.report_mode(), ReportMode::Speedtest);
        }
        assert_eq!(session.report_mode(), ReportMode::Interactive);
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn test_guard_restores_mode_on_panic() {
        let (session, _rx) = session();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = session.set_report_mode(ReportMode::Bench);
            panic!("bench aborted");
        }));
        assert!(result.is_err());
        assert_eq!(session.report_mode(), ReportMode::Interactive);
    }

    #[test]
    fn test_invalid_fen_and_illegal_move_diagnostics() {
        let (mut session, rx) = session();
        session.set_position(&PositionSpec { fen: "xyz".into(), moves: Vec::new() });
        session.set_position(&PositionSpec { fen: START_FEN.into(), moves: vec!["h2e2".into(), "e9e5".into()] });
        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("info string Invalid FEN 'xyz'"));
        assert!(lines[1].starts_with("info string illegal move 'e9e5'"));
        assert_eq!(session.engine().fen(), "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C4/9/RNBAKABNR b - - 1 1");
    }

    #[test]
    fn test_setoption_waits_for_running_search() {
        let (mut session, rx) = session();
        session.go(Limits { depth: Some(4), ..Limits::new() });
        session.setoption("Bogus", Some("1"));
        let lines: Vec<String> = rx.try_iter().collect();
        let n = lines.len();
        assert!(lines[n - 2].starts_with("bestmove "));
        assert_eq!(lines[n - 1], "info string No such option: Bogus");
    }

    #[test]
    fn test_show_wdl_applies_to_next_search() {
        let (mut session, rx) = session();
        session.setoption("uci_showwdl", Some("true"));
        session.go(Limits { depth: Some(1), ..Limits::new() });
        session.wait_for_search_finished();
        let lines: Vec<String> = rx.try_iter().collect();
        assert!(lines.iter().any(|l| l.starts_with("info depth 1") && l.contains(" wdl ")));
    }

    #[test]
    fn test_stop_ends_infinite_search() {
        let (mut session, rx) = session();
        session.go(Limits { infinite: true, ..Limits::new() });
        thread::sleep(Duration::from_millis(50));
        let stopped_at = Instant::now();
        session.stop();
        session.wait_for_search_finished();
        assert!(stopped_at.elapsed() < Duration::from_secs(5));
        assert!(rx.try_iter().last().unwrap().starts_with("bestmove "));
    }

    #[test]
    fn test_unknown_option_is_reported() {
        let (mut session, rx) = session();
        session.setoption("Nonexistent", Some("1"));
        assert_eq!(rx.try_recv().unwrap(), "info string No such option: Nonexistent");
    }
}
