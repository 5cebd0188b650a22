//! Audio cues for applied moves.
//!
//! The controller only decides *which* cue to play. A [`CueSink`] backend
//! turns it into sound; [`SoundBoard`] guards the backend so that a broken
//! or slow audio device can never disturb the match.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::CueError;
use crate::types::GameStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Move,
    Capture,
    Check,
}

impl Cue {
    /// Check beats capture beats a plain move.
    pub fn select(status_after: GameStatus, captured: bool) -> Cue {
        if status_after == GameStatus::Check {
            Cue::Check
        } else if captured {
            Cue::Capture
        } else {
            Cue::Move
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Cue::Move => "move",
            Cue::Capture => "capture",
            Cue::Check => "check",
        }
    }

    /// Synthesis parameters for backends that generate the sound themselves.
    pub fn tone(self) -> Tone {
        match self {
            Cue::Capture => Tone {
                waveform: Waveform::Triangle,
                start_hz: 220.0,
                end_hz: 110.0,
                sweep_ms: 100,
                gain: 0.3,
                duration_ms: 120,
            },
            Cue::Check => Tone {
                waveform: Waveform::Sine,
                start_hz: 880.0,
                end_hz: 440.0,
                sweep_ms: 150,
                gain: 0.2,
                duration_ms: 120,
            },
            Cue::Move => Tone {
                waveform: Waveform::Sine,
                start_hz: 440.0,
                end_hz: 220.0,
                sweep_ms: 50,
                gain: 0.15,
                duration_ms: 120,
            },
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
}

/// A short exponential frequency sweep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub sweep_ms: u32,
    pub gain: f32,
    pub duration_ms: u32,
}

/// Audio backend. Implementations must return quickly; anything slow belongs
/// on the backend's own thread.
pub trait CueSink: Send {
    fn play(&mut self, cue: Cue) -> Result<(), CueError>;
}

/// Backend that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl CueSink for Silent {
    fn play(&mut self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}

/// Backend that records every cue, for observers that want the history.
#[derive(Debug, Clone, Default)]
pub struct CueLog {
    played: Arc<Mutex<Vec<Cue>>>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl CueSink for CueLog {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        self.played
            .lock()
            .map_err(|_| CueError("cue log poisoned".to_string()))?
            .push(cue);
        Ok(())
    }
}

/// Fires cues through a backend, honouring the on/off toggle and swallowing
/// every backend failure.
pub struct SoundBoard {
    sink: Box<dyn CueSink>,
    enabled: bool,
}

impl SoundBoard {
    pub fn new(sink: Box<dyn CueSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(Silent), false)
    }

    pub fn fire(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.sink.play(cue) {
            tracing::debug!(cue = cue.id(), error = %e, "sound cue dropped");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip sound on or off; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}

impl fmt::Debug for SoundBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundBoard")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "sound_tests.rs"]
mod sound_tests;
