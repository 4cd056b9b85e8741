//! UCI protocol front end for the xiangqi engine
//!
//! [`Session`] runs the protocol loop on a background thread so a host can
//! push command lines and drain the engine's replies without owning a
//! stdin/stdout pipe. The `xiangqi-uci` binary wires the same loop to the
//! standard streams.

pub mod bench;
pub mod format;
pub mod misc;
pub mod output;
pub mod parser;
pub mod queue;
pub mod search_session;
pub mod session;
pub mod stdin_reader;
pub mod uci_loop;

pub use output::{Output, OutputSink};
pub use parser::{Command, parse_command};
pub use queue::{CommandQueue, QueueError};
pub use search_session::{ReportMode, SearchSession};
pub use session::{Session, SessionConfig};
pub use uci_loop::UciLoop;
