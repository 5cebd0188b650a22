//! Terminal bell audio backend.

use match_core::{Cue, CueError, CueSink};
use std::io::Write;

/// Rings the terminal bell on stderr; a check rings twice.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl CueSink for TerminalBell {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        let tone = cue.tone();
        tracing::trace!(%cue, start_hz = tone.start_hz, end_hz = tone.end_hz, "bell");
        let rings: &[u8] = if cue == Cue::Check { b"\x07\x07" } else { b"\x07" };
        let mut err = std::io::stderr().lock();
        err.write_all(rings)
            .and_then(|_| err.flush())
            .map_err(|e| CueError(e.to_string()))
    }
}
