//! Test doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use crate::error::{CueError, ProviderError, RulesError};
use crate::provider::{EngineRequest, MoveProvider, ProviderKind};
use crate::rules::{Applied, CozyRules, Position, RulesAuthority};
use crate::sound::{Cue, CueSink};
use crate::types::{Difficulty, GameStatus, LegalMove, MoveSpec, Side, Square};

/// How a [`RecordingProvider`] answers `request_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Accept,
    NotReady,
    Busy,
    Broken,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub requests: Vec<EngineRequest>,
    pub new_games: Vec<Difficulty>,
    pub cancels: usize,
}

/// Remote provider stand-in that records every call and never answers on its own.
#[derive(Clone)]
pub struct RecordingProvider {
    pub calls: Arc<Mutex<Calls>>,
    pub behaviour: Arc<Mutex<Behaviour>>,
}

impl RecordingProvider {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Calls::default())),
            behaviour: Arc::new(Mutex::new(behaviour)),
        }
    }

    pub fn set_behaviour(&self, behaviour: Behaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn requests(&self) -> Vec<EngineRequest> {
        self.calls.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> EngineRequest {
        self.requests().last().cloned().expect("no request recorded")
    }

    pub fn cancels(&self) -> usize {
        self.calls.lock().unwrap().cancels
    }

    pub fn new_games(&self) -> Vec<Difficulty> {
        self.calls.lock().unwrap().new_games.clone()
    }
}

impl MoveProvider for RecordingProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Engine
    }

    fn name(&self) -> &str {
        "Recording"
    }

    fn new_game(&mut self, difficulty: Difficulty) {
        self.calls.lock().unwrap().new_games.push(difficulty);
    }

    fn request_move(&mut self, request: EngineRequest) -> Result<(), ProviderError> {
        match *self.behaviour.lock().unwrap() {
            Behaviour::Accept => {
                self.calls.lock().unwrap().requests.push(request);
                Ok(())
            }
            Behaviour::NotReady => Err(ProviderError::NotReady),
            Behaviour::Busy => Err(ProviderError::Busy),
            Behaviour::Broken => Err(ProviderError::Unavailable("pipe closed".to_string())),
        }
    }

    fn cancel(&mut self) {
        self.calls.lock().unwrap().cancels += 1;
    }
}

/// Standard rules, but every match starts from `fen`.
#[derive(Debug, Clone, Copy)]
pub struct StartingAt(pub &'static str);

impl RulesAuthority for StartingAt {
    fn initial_position(&self) -> Position {
        Position::from_fen(self.0)
    }

    fn legal_moves(
        &self,
        position: &Position,
        from: Option<Square>,
    ) -> Result<Vec<LegalMove>, RulesError> {
        CozyRules.legal_moves(position, from)
    }

    fn apply_move(&self, position: &Position, mv: &MoveSpec) -> Result<Applied, RulesError> {
        CozyRules.apply_move(position, mv)
    }

    fn status(&self, position: &Position) -> Result<GameStatus, RulesError> {
        CozyRules.status(position)
    }

    fn side_to_move(&self, position: &Position) -> Result<Side, RulesError> {
        CozyRules.side_to_move(position)
    }
}

/// Audio backend that fails on every cue.
#[derive(Debug, Clone, Copy)]
pub struct BrokenSpeaker;

impl CueSink for BrokenSpeaker {
    fn play(&mut self, _cue: Cue) -> Result<(), CueError> {
        Err(CueError("device unplugged".to_string()))
    }
}
