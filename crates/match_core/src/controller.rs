//! Match orchestration.
//!
//! [`MatchController`] owns the whole match: position, history, turn, status,
//! clock and the automated opponent. Every state change goes through its
//! `&mut self` methods, so nothing interleaves. Provider answers are fed back
//! by the host through [`MatchController::on_engine_reply`] and are checked
//! against the current request ticket, match generation and position before
//! anything is applied.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::clock::MatchClock;
use crate::error::{MatchError, RulesError};
use crate::provider::{EngineReply, EngineRequest, Opponent, ReplyOutcome, Ticket};
use crate::rules::{Applied, Position, RulesAuthority};
use crate::sound::{Cue, SoundBoard};
use crate::types::{
    Difficulty, GameStatus, LegalMove, MatchPhase, MoveRecord, MoveSpec, PendingPromotion,
    Promotion, Side, Square,
};

/// Positions repeated this often end the match in a draw.
const REPETITION_LIMIT: u32 = 3;

/// What became of a submitted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied(MoveRecord),
    /// The move needs a promotion piece; see [`MatchController::choose_promotion`].
    PromotionPending(PendingPromotion),
}

/// What became of a provider reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyDisposition {
    Applied(MoveRecord),
    /// Answer to a request that is no longer current
    Stale,
    /// The provider found no legal move
    NoMove,
    /// The answer was unusable and the turn went to the fallback mover
    Reissued,
}

/// Immutable view of the match handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSnapshot {
    pub fen: String,
    pub turn: Side,
    pub status: GameStatus,
    pub phase: MatchPhase,
    pub moves: Vec<MoveRecord>,
    pub elapsed_secs: u64,
    pub thinking: bool,
    pub last_automated_move: Option<String>,
    pub pending_promotion: Option<PendingPromotion>,
    pub human_side: Side,
    pub difficulty: Difficulty,
    /// Board drawn from Black's side
    pub board_flipped: bool,
    pub opponent: String,
    pub engine_available: bool,
    pub sound_enabled: bool,
}

pub struct MatchController {
    rules: Arc<dyn RulesAuthority>,
    opponent: Opponent,
    sound: SoundBoard,
    phase: MatchPhase,
    position: Position,
    /// Status of `position`, repetition draws included
    status: GameStatus,
    turn: Side,
    moves: Vec<MoveRecord>,
    /// Occurrences of each position, by repetition key
    seen: HashMap<String, u32>,
    human: Side,
    difficulty: Difficulty,
    pending_promotion: Option<PendingPromotion>,
    /// The automated side is thinking about this
    outstanding: Option<EngineRequest>,
    last_automated_move: Option<String>,
    clock: MatchClock,
    /// Bumped on every start and reset
    generation: u64,
    next_ticket: u64,
}

impl MatchController {
    pub fn new(rules: Arc<dyn RulesAuthority>, opponent: Opponent, sound: SoundBoard) -> Self {
        let position = rules.initial_position();
        Self {
            rules,
            opponent,
            sound,
            phase: MatchPhase::NotStarted,
            position,
            status: GameStatus::InProgress,
            turn: Side::White,
            moves: Vec::new(),
            seen: HashMap::new(),
            human: Side::White,
            difficulty: Difficulty::default(),
            pending_promotion: None,
            outstanding: None,
            last_automated_move: None,
            clock: MatchClock::new(),
            generation: 0,
            next_ticket: 0,
        }
    }

    pub fn start_match(&mut self, human: Side, difficulty: Difficulty) -> Result<(), MatchError> {
        self.start_match_at(human, difficulty, Instant::now())
    }

    /// Start a match with the clock counting from `now`.
    pub fn start_match_at(
        &mut self,
        human: Side,
        difficulty: Difficulty,
        now: Instant,
    ) -> Result<(), MatchError> {
        if self.phase != MatchPhase::NotStarted {
            return Err(MatchError::InvalidPhase { phase: self.phase });
        }
        let position = self.rules.initial_position();
        let turn = self.rules.side_to_move(&position)?;
        let status = self.rules.status(&position)?;

        self.generation += 1;
        self.clear_match();
        self.seen.insert(position.repetition_key(), 1);
        self.position = position;
        self.turn = turn;
        self.status = status;
        self.human = human;
        self.difficulty = difficulty;
        self.phase = MatchPhase::Playing;
        self.clock.start(now);
        self.opponent.new_game(difficulty);

        tracing::info!(
            human = %human,
            %difficulty,
            opponent = self.opponent.name(),
            generation = self.generation,
            "match started"
        );

        if self.turn != self.human {
            self.request_automated_move(Dispatch::Preferred);
        }
        Ok(())
    }

    /// Submit the human player's move.
    ///
    /// A pawn move to the last rank without a piece is parked as a pending
    /// promotion and nothing changes until [`choose_promotion`] is called.
    ///
    /// [`choose_promotion`]: MatchController::choose_promotion
    pub fn submit_move(&mut self, mv: MoveSpec) -> Result<MoveOutcome, MatchError> {
        self.ensure_playing()?;
        if self.pending_promotion.is_some() {
            return Err(MatchError::PromotionPending);
        }
        if self.turn != self.human {
            return Err(MatchError::NotYourTurn { expected: self.turn });
        }

        if mv.promotion.is_none() {
            let promotes = self
                .rules
                .legal_moves(&self.position, Some(mv.from))?
                .iter()
                .any(|lm| lm.spec.to == mv.to && lm.is_promotion());
            if promotes {
                let pending = PendingPromotion {
                    from: mv.from,
                    to: mv.to,
                    side: self.turn,
                };
                tracing::debug!(from = %mv.from, to = %mv.to, "promotion pending");
                self.pending_promotion = Some(pending);
                return Ok(MoveOutcome::PromotionPending(pending));
            }
        }

        self.apply(mv).map(MoveOutcome::Applied)
    }

    /// Complete the pending promotion with `piece`.
    pub fn choose_promotion(&mut self, piece: Promotion) -> Result<MoveRecord, MatchError> {
        let pending = self
            .pending_promotion
            .take()
            .ok_or(MatchError::NoPendingPromotion)?;
        let mv = MoveSpec::new(pending.from, pending.to).with_promotion(piece);
        self.apply(mv).map_err(|e| {
            self.pending_promotion = Some(pending);
            e
        })
    }

    /// Drop the pending promotion without moving.
    pub fn cancel_promotion(&mut self) -> Option<PendingPromotion> {
        self.pending_promotion.take()
    }

    /// Feed back an answer from a move provider.
    pub fn on_engine_reply(&mut self, reply: EngineReply) -> ReplyDisposition {
        if !self.is_current(&reply) {
            tracing::debug!(
                ticket = %reply.ticket,
                generation = reply.generation,
                source = %reply.source,
                "stale reply discarded"
            );
            return ReplyDisposition::Stale;
        }
        self.outstanding = None;

        match reply.outcome {
            ReplyOutcome::BestMove(mv) => match self.apply(mv) {
                Ok(record) => {
                    self.last_automated_move = Some(format!("AI: {} → {}", record.from, record.to));
                    ReplyDisposition::Applied(record)
                }
                Err(e) => {
                    tracing::warn!(%mv, source = %reply.source, error = %e, "rejected automated move");
                    self.request_automated_move(Dispatch::Fallback);
                    ReplyDisposition::Reissued
                }
            },
            ReplyOutcome::NoMove => {
                tracing::debug!(source = %reply.source, status = %self.status, "provider found no move");
                ReplyDisposition::NoMove
            }
            ReplyOutcome::Failed(reason) => {
                self.opponent.degrade(&reason);
                self.request_automated_move(Dispatch::Fallback);
                ReplyDisposition::Reissued
            }
        }
    }

    /// Abandon the match and go back to side selection.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.opponent.cancel();
        self.clear_match();
        self.phase = MatchPhase::NotStarted;
        tracing::info!(generation = self.generation, "match reset");
    }

    pub fn resign(&mut self) {
        if self.phase == MatchPhase::Playing {
            tracing::info!(side = %self.human, moves = self.moves.len(), "player resigned");
        }
        self.reset();
    }

    /// Flip sound on or off; returns the new state.
    pub fn toggle_sound(&mut self) -> bool {
        self.sound.toggle()
    }

    /// Recompute the elapsed time. Returns true if it changed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.phase != MatchPhase::Playing {
            return false;
        }
        self.clock.tick(now)
    }

    /// Legal moves for the side to move, optionally from one square.
    pub fn legal_moves(&self, from: Option<Square>) -> Result<Vec<LegalMove>, MatchError> {
        Ok(self.rules.legal_moves(&self.position, from)?)
    }

    /// Status of the current position computed from scratch.
    pub fn derive_status(&self) -> Result<GameStatus, MatchError> {
        let status = self.rules.status(&self.position)?;
        let repeats = self
            .seen
            .get(&self.position.repetition_key())
            .copied()
            .unwrap_or(0);
        Ok(with_repetition(status, repeats))
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn human_side(&self) -> Side {
        self.human
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.pending_promotion
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    pub fn is_thinking(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn last_automated_move(&self) -> Option<&str> {
        self.last_automated_move.as_deref()
    }

    pub fn engine_available(&self) -> bool {
        self.opponent.engine_available()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound.is_enabled()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            fen: self.position.as_fen().to_string(),
            turn: self.turn,
            status: self.status,
            phase: self.phase,
            moves: self.moves.clone(),
            elapsed_secs: self.clock.elapsed_secs(),
            thinking: self.is_thinking(),
            last_automated_move: self.last_automated_move.clone(),
            pending_promotion: self.pending_promotion,
            human_side: self.human,
            difficulty: self.difficulty,
            board_flipped: self.human == Side::Black,
            opponent: self.opponent.name().to_string(),
            engine_available: self.opponent.engine_available(),
            sound_enabled: self.sound.is_enabled(),
        }
    }

    fn ensure_playing(&self) -> Result<(), MatchError> {
        if self.phase == MatchPhase::Playing {
            Ok(())
        } else {
            Err(MatchError::InvalidPhase { phase: self.phase })
        }
    }

    fn is_current(&self, reply: &EngineReply) -> bool {
        self.phase == MatchPhase::Playing
            && reply.generation == self.generation
            && reply.position == self.position
            && self
                .outstanding
                .as_ref()
                .is_some_and(|req| req.ticket == reply.ticket && req.position == reply.position)
    }

    /// The single place where a move changes the match.
    fn apply(&mut self, mv: MoveSpec) -> Result<MoveRecord, MatchError> {
        self.ensure_playing()?;
        let Applied { position, record } =
            self.rules
                .apply_move(&self.position, &mv)
                .map_err(|e| match e {
                    RulesError::IllegalMove { mv } => MatchError::IllegalMove { mv },
                    other => MatchError::Rules(other),
                })?;
        let turn = self.rules.side_to_move(&position)?;
        let key = position.repetition_key();
        let repeats = self.seen.get(&key).copied().unwrap_or(0) + 1;
        let status = with_repetition(self.rules.status(&position)?, repeats);

        self.seen.insert(key, repeats);
        self.position = position;
        self.turn = turn;
        self.status = status;
        self.moves.push(record.clone());
        tracing::debug!(side = %record.side, san = %record.san, %status, "move applied");

        if status.is_terminal() {
            self.phase = MatchPhase::Concluded;
            self.clock.stop();
            tracing::info!(
                %status,
                moves = self.moves.len(),
                elapsed = self.clock.elapsed_secs(),
                "match concluded"
            );
        } else {
            self.sound.fire(Cue::select(status, record.captured.is_some()));
            if self.turn != self.human {
                self.request_automated_move(Dispatch::Preferred);
            }
        }
        Ok(record)
    }

    fn request_automated_move(&mut self, dispatch: Dispatch) {
        self.next_ticket += 1;
        let request = EngineRequest {
            ticket: Ticket(self.next_ticket),
            generation: self.generation,
            position: self.position.clone(),
            side: self.turn,
        };
        let sent = match dispatch {
            Dispatch::Preferred => self.opponent.request(request.clone()),
            Dispatch::Fallback => self.opponent.request_fallback(request.clone()),
        };
        match sent {
            Ok(provider) => {
                tracing::debug!(ticket = %request.ticket, %provider, "automated move requested");
                self.outstanding = Some(request);
            }
            Err(e) => {
                tracing::warn!(ticket = %request.ticket, error = %e, "no provider took the move request");
            }
        }
    }

    fn clear_match(&mut self) {
        self.position = self.rules.initial_position();
        self.status = GameStatus::InProgress;
        self.turn = Side::White;
        self.moves.clear();
        self.seen.clear();
        self.pending_promotion = None;
        self.outstanding = None;
        self.last_automated_move = None;
        self.clock = MatchClock::new();
    }
}

impl std::fmt::Debug for MatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchController")
            .field("phase", &self.phase)
            .field("position", &self.position)
            .field("status", &self.status)
            .field("moves", &self.moves.len())
            .field("generation", &self.generation)
            .field("opponent", &self.opponent)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy)]
enum Dispatch {
    Preferred,
    Fallback,
}

fn with_repetition(status: GameStatus, repeats: u32) -> GameStatus {
    if repeats >= REPETITION_LIMIT && !status.is_terminal() {
        GameStatus::Draw
    } else {
        status
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
