//! Feeds input lines into the command queue

use crate::queue::CommandQueue;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Spawn a thread pushing every line of `reader` into `queue`. End of input
/// or a read error queues `quit`.
pub fn spawn_reader<R>(reader: R, queue: Arc<CommandQueue>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new().name("stdin-reader".into()).spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    log::debug!("Received: {line}");
                    if let Err(e) = queue.push(line) {
                        log::debug!("command dropped, exiting reader: {e}");
                        return;
                    }
                }
                Err(e) => {
                    log::error!("input read error: {e}");
                    break;
                }
            }
        }
        log::info!("input closed, shutting down");
        if let Err(e) = queue.push("quit") {
            log::debug!("quit not queued at end of input: {e}");
        }
    })
}

pub fn spawn_stdin_reader(queue: Arc<CommandQueue>) -> io::Result<JoinHandle<()>> {
    spawn_reader(io::BufReader::new(io::stdin()), queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_lines_then_quit() {
        let queue = Arc::new(CommandQueue::new());
        let handle = spawn_reader(Cursor::new("uci\nisready\n"), Arc::clone(&queue)).unwrap();
        handle.join().unwrap();
        assert_eq!(queue.pop_blocking().as_deref(), Some("uci"));
        assert_eq!(queue.pop_blocking().as_deref(), Some("isready"));
        assert_eq!(queue.pop_blocking().as_deref(), Some("quit"));
    }

    #[test]
    fn test_reader_stops_on_closed_queue() {
        let queue = Arc::new(CommandQueue::new());
        queue.shutdown();
        let handle = spawn_reader(Cursor::new("go\n"), Arc::clone(&queue)).unwrap();
        handle.join().unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_end_of_input_after_queue_closed() {
        let queue = Arc::new(CommandQueue::new());
        queue.shutdown();
        let handle = spawn_reader(Cursor::new(""), Arc::clone(&queue)).unwrap();
        handle.join().unwrap();
        assert!(queue.is_empty());
        assert_eq!(queue.pop_blocking(), None);
    }
}
