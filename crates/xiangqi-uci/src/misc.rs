//! Identification and build information

use std::env::consts::{ARCH, OS};

pub const ENGINE_NAME: &str = "Xiangqi-UCI";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const ENGINE_AUTHOR: &str = "the Xiangqi-UCI developers";

pub const HELP_TEXT: &str = "
Xiangqi-UCI is a xiangqi engine speaking the UCI protocol.
It is released as free software licensed under the GNU GPLv3 License.
Commands are read one per line; type 'uci' to list the options, 'd' to show
the board and 'quit' to exit.";

/// `<name> <version>`, as sent in `id name`
pub fn engine_info() -> String {
    format!("{ENGINE_NAME} {ENGINE_VERSION}")
}

/// Target and build settings, one `label : value` line each
pub fn compiler_info() -> String {
    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    let mut features = Vec::new();
    if cfg!(target_feature = "avx2") {
        features.push("AVX2");
    }
    if cfg!(target_feature = "sse4.1") {
        features.push("SSE41");
    }
    if cfg!(target_feature = "neon") {
        features.push("NEON");
    }
    if cfg!(target_pointer_width = "64") {
        features.push("64bit");
    }

    format!(
        "Compiled by                : rustc ({profile} profile)\n\
         Compilation architecture   : {ARCH}\n\
         Compilation settings       : {}\n\
         Compiled for               : {OS}\n",
        if features.is_empty() { "none".to_string() } else { features.join(" ") }
    )
}

/// Number of hardware threads, at least one
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_info_has_version() {
        assert_eq!(engine_info(), format!("Xiangqi-UCI {}", env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_compiler_info_lines() {
        let info = compiler_info();
        assert!(info.starts_with("Compiled by"));
        assert!(info.ends_with('\n'));
        assert_eq!(info.lines().count(), 4);
    }
}
