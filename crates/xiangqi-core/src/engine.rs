//! Engine handle: position, options, transposition table and search threads

use crate::error::{EngineError, EngineResult};
use crate::eval::{self, EvalTrace};
use crate::events::{InfoShort, SearchEvent};
use crate::movegen;
use crate::notation;
use crate::options::OptionsMap;
use crate::perft::{self, PerftReport};
use crate::position::Position;
use crate::search::{Limits, RootMove, SharedSearch, Signals, TimeManager, Worker};
use crate::tt::TranspositionTable;
use crate::types::{Move, Score};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Stack size for search threads
const STACK_SIZE: usize = 16 * 1024 * 1024;

/// Poll interval while a finished search waits for `stop` or `ponderhit`
const WAIT_POLL: Duration = Duration::from_millis(1);

/// Maximum value of the `Threads` option
pub const MAX_THREADS: i64 = 1024;

/// Stops the current search of an [`Engine`] without borrowing it
#[derive(Clone)]
pub struct StopHandle(Arc<Signals>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.stop.store(true, Ordering::SeqCst);
    }
}

pub struct Engine {
    position: Position,
    options: OptionsMap,
    tt: Arc<TranspositionTable>,
    signals: Arc<Signals>,
    events: Sender<SearchEvent>,
    search_thread: Option<JoinHandle<()>>,
}

impl Engine {
    /// Create an engine that reports search progress on `events`
    pub fn new(events: Sender<SearchEvent>) -> Self {
        let options = OptionsMap::engine_defaults(MAX_THREADS);
        let hash_mb = options.get_int("Hash").unwrap_or(16) as usize;
        Self {
            position: Position::startpos(),
            options,
            tt: Arc::new(TranspositionTable::new(hash_mb)),
            signals: Arc::new(Signals::default()),
            events,
            search_thread: None,
        }
    }

    /// Start searching the current position asynchronously.
    ///
    /// A previous search is waited for first. On success exactly one
    /// [`SearchEvent::BestMove`] will follow.
    pub fn go(&mut self, limits: Limits) -> EngineResult<()> {
        self.wait_for_search_finished();

        let root_moves: Vec<RootMove> = movegen::generate_legal(&self.position)
            .into_iter()
            .filter(|m| {
                limits.searchmoves.is_empty()
                    || limits.searchmoves.iter().any(|s| notation::to_move(&self.position, s) == *m)
            })
            .map(RootMove::new)
            .collect();

        let threads = self.thread_count();
        let overhead = self.options.get_int("Move Overhead").unwrap_or(10);
        let multi_pv = self.options.get_int("MultiPV").unwrap_or(1).max(1) as usize;
        let time = TimeManager::new(&limits, self.position.side_to_move(), overhead);

        self.signals.reset(limits.ponder_mode);
        self.tt.new_search();
        let shared = Arc::new(SharedSearch {
            limits,
            time,
            signals: Arc::clone(&self.signals),
            tt: Arc::clone(&self.tt),
            multi_pv,
            nodes: (0..threads).map(|_| AtomicU64::new(0)).collect(),
        });

        let job = SearchJob {
            position: self.position.clone(),
            root_moves,
            shared,
            events: self.events.clone(),
            threads,
        };
        log::debug!("starting search with {threads} thread(s), multipv {multi_pv}");
        let handle = thread::Builder::new()
            .name("search-main".into())
            .stack_size(STACK_SIZE)
            .spawn(move || job.run_guarded())?;
        self.search_thread = Some(handle);
        Ok(())
    }

    /// Ask the running search to stop as soon as possible
    pub fn stop(&self) {
        self.signals.stop.store(true, Ordering::SeqCst);
    }

    /// Handle that stops this engine's searches from another thread
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.signals))
    }

    /// Switch pondering on or off. Turning it off converts a ponder
    /// search into a normal one.
    pub fn set_ponderhit(&self, pondering: bool) {
        self.signals.ponder.store(pondering, Ordering::SeqCst);
    }

    /// Block until the search thread has exited
    pub fn wait_for_search_finished(&mut self) {
        if let Some(handle) = self.search_thread.take() {
            if handle.join().is_err() {
                log::error!("search thread terminated abnormally");
            }
        }
    }

    pub fn is_searching(&self) -> bool {
        self.search_thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Set the root position from a FEN and a move list.
    ///
    /// An invalid FEN leaves the position untouched. Moves are applied in
    /// order; the first illegal one stops application, keeping the moves
    /// before it.
    pub fn set_position<S: AsRef<str>>(&mut self, fen: &str, moves: &[S]) -> EngineResult<()> {
        let mut pos = Position::from_fen(fen)?;
        let mut result = Ok(());
        for (applied, text) in moves.iter().enumerate() {
            let m = notation::to_move(&pos, text.as_ref());
            if m == Move::NONE {
                result = Err(EngineError::IllegalMove { mv: text.as_ref().to_string(), applied });
                break;
            }
            pos.do_move(m);
        }
        self.position = pos;
        result
    }

    /// Forget everything learned in earlier searches
    pub fn search_clear(&mut self) {
        self.wait_for_search_finished();
        self.tt.clear();
    }

    /// Perft split by root move from `fen`
    pub fn perft(&self, fen: &str, depth: u32) -> EngineResult<PerftReport> {
        let mut pos = Position::from_fen(fen)?;
        Ok(perft::perft_divide(&mut pos, depth))
    }

    pub fn options(&self) -> &OptionsMap {
        &self.options
    }

    /// Apply a `setoption` and its side effects
    pub fn setoption(&mut self, name: &str, value: Option<&str>) -> EngineResult<()> {
        let previous_hash = self.options.get_int("Hash").unwrap_or(16);
        let canonical = self.options.set(name, value)?;
        match canonical.as_str() {
            "Hash" => {
                let mb = self.options.get_int("Hash").unwrap_or(16) as usize;
                match TranspositionTable::try_new(mb) {
                    Ok(tt) => self.tt = Arc::new(tt),
                    Err(e) => {
                        // roll back to the size of the table still in use
                        self.options.set("Hash", Some(&previous_hash.to_string()))?;
                        return Err(e);
                    }
                }
            }
            "Clear Hash" => self.tt.clear(),
            _ => {}
        }
        log::debug!("option {canonical} set to {value:?}");
        Ok(())
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    /// Board diagram with FEN and key
    pub fn visualize(&self) -> String {
        self.position.to_string()
    }

    pub fn trace_eval(&self) -> EvalTrace {
        eval::trace(&self.position)
    }

    /// Mirror the current position, swapping sides
    pub fn flip(&mut self) {
        self.position.flip();
    }

    pub fn hashfull(&self, max_age: u32) -> u32 {
        self.tt.hashfull(max_age)
    }

    fn thread_count(&self) -> usize {
        self.options.get_int("Threads").unwrap_or(1).max(1) as usize
    }

    pub fn processor_information(&self) -> String {
        let available = thread::available_parallelism().map_or(1, |n| n.get());
        format!("Available processors: 0-{}", available - 1)
    }

    pub fn thread_allocation_information(&self) -> String {
        match self.thread_count() {
            1 => "Using 1 thread".to_string(),
            n => format!("Using {n} threads"),
        }
    }

    /// This engine evaluates without a trained network.
    pub fn save_network(&self, _path: Option<&str>) -> EngineResult<()> {
        Err(EngineError::NoNetwork)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
        self.wait_for_search_finished();
    }
}

/// Everything the search-main thread needs
struct SearchJob {
    position: Position,
    root_moves: Vec<RootMove>,
    shared: Arc<SharedSearch>,
    events: Sender<SearchEvent>,
    threads: usize,
}

impl SearchJob {
    /// Run the search; a panic is converted into `Failed` plus a sentinel
    /// `BestMove` so consumers always see the run end.
    fn run_guarded(self) {
        let events = self.events.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.run()));
        if let Err(panic_info) = result {
            let message = if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "unknown panic".to_string()
            };
            log::error!("search thread panicked: {message}");
            let _ = events.send(SearchEvent::Failed(message));
            let _ = events.send(SearchEvent::BestMove { best: Move::NONE, ponder: Move::NONE });
        }
    }

    fn run(self) {
        let SearchJob { position, root_moves, shared, events, threads } = self;

        if root_moves.is_empty() {
            let info = InfoShort { depth: 0, score: Score::Mate { plies: 0 } };
            let _ = events.send(SearchEvent::UpdateNoMoves(info));
            wait_while_pondering(&shared);
            let _ = events.send(SearchEvent::BestMove { best: Move::NONE, ponder: Move::NONE });
            return;
        }

        let mut helpers = Vec::with_capacity(threads.saturating_sub(1));
        for id in 1..threads {
            let mut worker = Worker::new(id, position.clone(), root_moves.clone(), Arc::clone(&shared), None);
            let spawned = thread::Builder::new()
                .name(format!("search-helper-{id}"))
                .stack_size(STACK_SIZE)
                .spawn(move || worker.iterative_deepening());
            match spawned {
                Ok(handle) => helpers.push(handle),
                Err(e) => log::warn!("failed to spawn helper {id}: {e}"),
            }
        }

        let mut main = Worker::new(0, position, root_moves, Arc::clone(&shared), Some(events.clone()));
        main.iterative_deepening();

        wait_while_pondering(&shared);
        shared.signals.stop.store(true, Ordering::SeqCst);
        for handle in helpers {
            if handle.join().is_err() {
                log::warn!("helper search thread panicked");
            }
        }

        let (best, ponder) = main.best_and_ponder();
        let _ = events.send(SearchEvent::BestMove { best, ponder });
    }
}

/// A finished `go infinite` or ponder search must not report before it is
/// told to stop or the ponder move is played
fn wait_while_pondering(shared: &SharedSearch) {
    let signals = &shared.signals;
    while !signals.stopped() && (signals.ponder.load(Ordering::SeqCst) || shared.limits.infinite) {
        thread::sleep(WAIT_POLL);
    }
}
