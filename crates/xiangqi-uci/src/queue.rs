//! Thread-safe command queue feeding the protocol loop

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("command queue is full ({0} pending)")]
    Full(usize),
    #[error("command queue has been shut down")]
    Closed,
}

struct QueueState {
    items: VecDeque<String>,
    closed: bool,
}

/// Multi-producer, single-consumer FIFO of command lines.
///
/// `pop_blocking` parks the consumer until a line arrives or the queue is
/// shut down. Shutdown is idempotent and wakes every waiter.
pub struct CommandQueue {
    state: Mutex<QueueState>,
    available: Condvar,
    capacity: Option<usize>,
}

impl CommandQueue {
    /// Unbounded queue
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Queue whose `push` fails with [`QueueError::Full`] past `capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        Self::build(Some(capacity))
    }

    fn build(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState { items: VecDeque::new(), closed: false }),
            available: Condvar::new(),
            capacity,
        }
    }

    pub fn push(&self, line: impl Into<String>) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(QueueError::Closed);
        }
        if let Some(cap) = self.capacity {
            if state.items.len() >= cap {
                log::warn!("command queue overflow, rejecting command");
                return Err(QueueError::Full(state.items.len()));
            }
        }
        state.items.push_back(line.into());
        drop(state);
        self.available.notify_one();
        Ok(())
    }

    /// Next command, or `None` once the queue has been shut down.
    ///
    /// Lines still pending at shutdown are discarded.
    pub fn pop_blocking(&self) -> Option<String> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(line) = state.items.pop_front() {
                return Some(line);
            }
            self.available.wait(&mut state);
        }
    }

    pub fn shutdown(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            log::debug!("command queue shut down with {} pending", state.items.len());
        }
        drop(state);
        self.available.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
