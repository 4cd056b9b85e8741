//! Serialized output path shared by the loop and the reporter thread

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use std::io::{self, BufWriter, Stdout, Write};
use std::sync::Arc;

/// Destination for protocol lines
pub trait OutputSink: Send + Sync {
    fn write_line(&self, line: &str);

    fn flush(&self) {}
}

/// Cloneable handle that writes whole text blocks atomically.
///
/// A block may contain several lines; they reach the sink back to back
/// even when other threads post at the same time.
#[derive(Clone)]
pub struct Output {
    sink: Arc<dyn OutputSink>,
    lock: Arc<Mutex<()>>,
}

impl Output {
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink, lock: Arc::new(Mutex::new(())) }
    }

    /// Output backed by an in-memory channel, returned with its receiver
    pub fn channel() -> (Self, Receiver<String>) {
        let (sink, rx) = ChannelSink::new();
        (Self::new(Arc::new(sink)), rx)
    }

    pub fn stdout() -> Self {
        Self::new(Arc::new(StdoutSink::new()))
    }

    /// Write `text`, one sink line per `\n`-separated line. Empty text is
    /// ignored.
    pub fn post(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let _guard = self.lock.lock();
        for line in text.split('\n') {
            self.sink.write_line(line.strip_suffix('\r').unwrap_or(line));
        }
        self.sink.flush();
    }

    /// `info string` line per non-blank line of `text`
    pub fn info_string(&self, text: &str) {
        let block: Vec<String> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| format!("info string {line}"))
            .collect();
        self.post(&block.join("\n"));
    }
}

/// Sends every line over a crossbeam channel
pub struct ChannelSink {
    tx: Sender<String>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<String>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl OutputSink for ChannelSink {
    fn write_line(&self, line: &str) {
        if self.tx.send(line.to_string()).is_err() {
            log::debug!("output receiver dropped, discarding: {line}");
        }
    }
}

pub struct StdoutSink {
    writer: Mutex<BufWriter<Stdout>>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { writer: Mutex::new(BufWriter::new(io::stdout())) }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{line}") {
            log::error!("failed to write to stdout: {e}");
        }
    }

    fn flush(&self) {
        if let Err(e) = self.writer.lock().flush() {
            log::error!("failed to flush stdout: {e}");
        }
    }
}
