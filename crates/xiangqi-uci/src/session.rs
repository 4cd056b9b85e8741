//! Embeddable session handle
//!
//! Runs the protocol loop on its own thread. The host pushes command lines
//! and drains output lines from any thread; dropping the handle quits the
//! loop and joins it.

use crate::output::Output;
use crate::queue::{CommandQueue, QueueError};
use crate::uci_loop::UciLoop;
use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use xiangqi_core::StopHandle;

/// How a [`Session`] is started
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// When non-empty, executed once as a single command and the loop ends
    pub args: Vec<String>,
    /// Bound on pending commands; `None` for unbounded
    pub queue_capacity: Option<usize>,
}

pub struct Session {
    queue: Arc<CommandQueue>,
    output: Receiver<String>,
    running: Arc<AtomicBool>,
    stop: StopHandle,
    loop_thread: Option<JoinHandle<()>>,
}

impl Session {
    pub fn open(config: SessionConfig) -> Result<Self> {
        let queue = Arc::new(match config.queue_capacity {
            Some(capacity) => CommandQueue::with_capacity(capacity),
            None => CommandQueue::new(),
        });
        let (output, output_rx) = Output::channel();
        let running = Arc::new(AtomicBool::new(true));

        let uci = UciLoop::new(config.args, Arc::clone(&queue), output, Arc::clone(&running))
            .context("failed to create search session")?;
        let stop = uci.stop_handle();
        let loop_thread = thread::Builder::new()
            .name("uci-loop".into())
            .spawn(move || uci.run())
            .context("failed to spawn protocol loop thread")?;

        log::debug!("session opened");
        Ok(Self { queue, output: output_rx, running, stop, loop_thread: Some(loop_thread) })
    }

    /// Queue one command line
    pub fn push(&self, command: &str) -> Result<(), QueueError> {
        self.queue.push(command)
    }

    /// Every output line produced so far
    pub fn drain(&self) -> Vec<String> {
        self.output.try_iter().collect()
    }

    /// Next output line, waiting at most `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Option<String> {
        self.output.recv_timeout(timeout).ok()
    }

    /// Wait for an output line satisfying `pred`, returning it and every line
    /// before it
    pub fn wait_for<F>(&self, timeout: Duration, pred: F) -> Option<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut seen = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let line = self.recv_timeout(remaining)?;
            let done = pred(&line);
            seen.push(line);
            if done {
                return Some(seen);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Quit the loop and wait for it to finish
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(handle) = self.loop_thread.take() else {
            return Ok(());
        };
        if let Err(e) = self.queue.push("quit") {
            log::debug!("quit not queued ({e}), closing the queue instead");
            self.queue.shutdown();
        }
        // commands such as setoption wait on the running search
        self.stop.stop();
        handle.join().map_err(|_| anyhow::anyhow!("protocol loop thread panicked"))?;
        log::debug!("session closed");
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("{e}");
        }
    }
}
