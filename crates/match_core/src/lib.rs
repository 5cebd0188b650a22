//! Orchestration core for a human-vs-engine chess match.
//!
//! [`MatchController`] owns the match and is the only thing that mutates it.
//! The automated side is an [`Opponent`]: a UCI process behind
//! [`EngineBridge`] while it works, a [`RandomMover`] once it does not.
//! Providers answer on a reply channel that the host drains into
//! [`MatchController::on_engine_reply`].

pub mod bridge;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
mod notation;
pub mod provider;
pub mod rules;
pub mod sound;
pub mod types;
pub mod uci;

#[cfg(test)]
mod test_support;

pub use bridge::EngineBridge;
pub use clock::{format_elapsed, MatchClock};
pub use config::MatchConfig;
pub use controller::{MatchController, MatchSnapshot, MoveOutcome, ReplyDisposition};
pub use error::*;
pub use provider::{
    reply_channel, EngineReply, EngineRequest, MoveProvider, Opponent, ProviderKind, RandomMover,
    ReplyOutcome, ReplyReceiver, ReplySender, Ticket,
};
pub use rules::{CozyRules, Position, RulesAuthority, START_FEN};
pub use sound::{Cue, CueLog, CueSink, Silent, SoundBoard, Tone, Waveform};
pub use types::*;
