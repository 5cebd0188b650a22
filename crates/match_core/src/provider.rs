//! Move providers for the automated side.
//!
//! A provider receives an [`EngineRequest`] and answers later, on the reply
//! channel, with exactly one [`EngineReply`] carrying the request's ticket and
//! match generation. The controller uses those to recognise stale answers.

use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ProviderError;
use crate::rules::{Position, RulesAuthority};
use crate::types::{Difficulty, MoveSpec, Side};

pub type ReplySender = mpsc::UnboundedSender<EngineReply>;
pub type ReplyReceiver = mpsc::UnboundedReceiver<EngineReply>;

/// Channel on which providers deliver their answers.
pub fn reply_channel() -> (ReplySender, ReplyReceiver) {
    mpsc::unbounded_channel()
}

/// Correlates a reply with the request that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Ticket(pub u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ask for a move in `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRequest {
    pub ticket: Ticket,
    /// Match generation the request was issued in
    pub generation: u64,
    pub position: Position,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Engine,
    Random,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Engine => write!(f, "engine"),
            ProviderKind::Random => write!(f, "random"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    BestMove(MoveSpec),
    /// The position has no legal move
    NoMove,
    /// The provider broke while the request was outstanding
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub ticket: Ticket,
    pub generation: u64,
    /// Position the answer was computed for
    pub position: Position,
    pub source: ProviderKind,
    pub outcome: ReplyOutcome,
}

impl EngineReply {
    pub fn answer(request: &EngineRequest, source: ProviderKind, outcome: ReplyOutcome) -> Self {
        Self {
            ticket: request.ticket,
            generation: request.generation,
            position: request.position.clone(),
            source,
            outcome,
        }
    }
}

/// Something that can pick a move for the automated side.
pub trait MoveProvider: Send {
    fn kind(&self) -> ProviderKind;

    fn name(&self) -> &str;

    /// False once the provider can no longer serve requests.
    fn is_available(&self) -> bool {
        true
    }

    /// A new match starts at the given difficulty.
    fn new_game(&mut self, _difficulty: Difficulty) {}

    /// Start working on `request`. The answer arrives on the reply channel.
    fn request_move(&mut self, request: EngineRequest) -> Result<(), ProviderError>;

    /// Abandon the outstanding request and any pending think-time delay.
    fn cancel(&mut self);
}

/// Picks uniformly at random among the legal moves.
pub struct RandomMover {
    rules: Arc<dyn RulesAuthority>,
    replies: ReplySender,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl RandomMover {
    /// With a zero `delay` the reply is sent synchronously; otherwise it is
    /// scheduled on the Tokio runtime.
    pub fn new(rules: Arc<dyn RulesAuthority>, replies: ReplySender, delay: Duration) -> Self {
        Self {
            rules,
            replies,
            delay,
            pending: None,
        }
    }
}

impl MoveProvider for RandomMover {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Random
    }

    fn name(&self) -> &str {
        "Random v1.0"
    }

    fn request_move(&mut self, request: EngineRequest) -> Result<(), ProviderError> {
        self.cancel();

        let moves = self.rules.legal_moves(&request.position, None)?;
        let outcome = match moves.choose(&mut thread_rng()) {
            Some(mv) => ReplyOutcome::BestMove(mv.spec),
            None => ReplyOutcome::NoMove,
        };
        let reply = EngineReply::answer(&request, ProviderKind::Random, outcome);

        if self.delay.is_zero() {
            let _ = self.replies.send(reply);
        } else {
            let replies = self.replies.clone();
            let delay = self.delay;
            self.pending = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = replies.send(reply);
            }));
        }
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

impl Drop for RandomMover {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The automated side: the remote engine while it works, the fallback otherwise.
///
/// Once the remote provider fails it is dropped for the rest of the session.
pub struct Opponent {
    remote: Option<Box<dyn MoveProvider>>,
    fallback: Box<dyn MoveProvider>,
}

enum RemoteAttempt {
    Taken,
    Skipped,
    Broken(String),
}

impl Opponent {
    pub fn new(remote: Option<Box<dyn MoveProvider>>, fallback: Box<dyn MoveProvider>) -> Self {
        Self { remote, fallback }
    }

    pub fn fallback_only(fallback: Box<dyn MoveProvider>) -> Self {
        Self::new(None, fallback)
    }

    /// True while the remote engine is still in use.
    pub fn engine_available(&self) -> bool {
        self.remote.as_ref().is_some_and(|r| r.is_available())
    }

    pub fn name(&self) -> &str {
        match &self.remote {
            Some(remote) => remote.name(),
            None => self.fallback.name(),
        }
    }

    pub fn new_game(&mut self, difficulty: Difficulty) {
        if let Some(remote) = self.remote.as_mut() {
            remote.new_game(difficulty);
        }
        self.fallback.new_game(difficulty);
    }

    /// Hand the request to the engine if it can take it, else to the fallback.
    pub fn request(&mut self, request: EngineRequest) -> Result<ProviderKind, ProviderError> {
        let attempt = match self.remote.as_mut() {
            None => RemoteAttempt::Skipped,
            Some(remote) if !remote.is_available() => {
                RemoteAttempt::Broken("engine reported unavailable".to_string())
            }
            Some(remote) => match remote.request_move(request.clone()) {
                Ok(()) => RemoteAttempt::Taken,
                Err(e @ (ProviderError::NotReady | ProviderError::Busy)) => {
                    tracing::debug!(ticket = %request.ticket, reason = %e, "serving turn at random");
                    RemoteAttempt::Skipped
                }
                Err(e) => RemoteAttempt::Broken(e.to_string()),
            },
        };

        match attempt {
            RemoteAttempt::Taken => Ok(ProviderKind::Engine),
            RemoteAttempt::Skipped => self.request_fallback(request),
            RemoteAttempt::Broken(reason) => {
                self.degrade(&reason);
                self.request_fallback(request)
            }
        }
    }

    /// Serve one request from the fallback without touching the engine.
    pub fn request_fallback(&mut self, request: EngineRequest) -> Result<ProviderKind, ProviderError> {
        self.fallback.request_move(request)?;
        Ok(self.fallback.kind())
    }

    /// Stop using the remote engine for the rest of the session.
    pub fn degrade(&mut self, reason: &str) {
        if let Some(mut remote) = self.remote.take() {
            tracing::warn!(engine = remote.name(), reason, "engine unavailable, falling back to random moves");
            remote.cancel();
        }
    }

    pub fn cancel(&mut self) {
        if let Some(remote) = self.remote.as_mut() {
            remote.cancel();
        }
        self.fallback.cancel();
    }
}

impl fmt::Debug for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opponent")
            .field("name", &self.name())
            .field("engine_available", &self.engine_available())
            .finish()
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod provider_tests;
