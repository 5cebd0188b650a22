//! UCI wire format: commands we send to the engine and lines it sends back.

use std::fmt;

use crate::error::UciError;
use crate::types::MoveSpec;

/// UCI option that sets engine strength.
pub const SKILL_OPTION: &str = "Skill Level";

/// A command sent to the engine, one per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Uci,
    SetOption { name: String, value: String },
    IsReady,
    NewGame,
    Position { fen: String },
    Go { movetime_ms: u64 },
    Stop,
    Quit,
}

impl EngineCommand {
    pub fn skill(level: u8) -> Self {
        EngineCommand::SetOption {
            name: SKILL_OPTION.to_string(),
            value: level.to_string(),
        }
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Uci => write!(f, "uci"),
            EngineCommand::SetOption { name, value } => {
                write!(f, "setoption name {} value {}", name, value)
            }
            EngineCommand::IsReady => write!(f, "isready"),
            EngineCommand::NewGame => write!(f, "ucinewgame"),
            EngineCommand::Position { fen } => write!(f, "position fen {}", fen),
            EngineCommand::Go { movetime_ms } => write!(f, "go movetime {}", movetime_ms),
            EngineCommand::Stop => write!(f, "stop"),
            EngineCommand::Quit => write!(f, "quit"),
        }
    }
}

/// A line received from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    Id { name: String },
    UciOk,
    ReadyOk,
    /// `None` when the engine reports no legal move.
    BestMove(Option<MoveSpec>),
    Info,
    Other(String),
}

/// Decode one engine output line.
pub fn parse_engine_line(line: &str) -> Result<EngineMessage, UciError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return Err(UciError::Empty);
    };

    match head {
        "id" => {
            if parts.get(1) == Some(&"name") {
                Ok(EngineMessage::Id {
                    name: parts[2..].join(" "),
                })
            } else {
                Ok(EngineMessage::Other(line.trim().to_string()))
            }
        }
        "uciok" => Ok(EngineMessage::UciOk),
        "readyok" => Ok(EngineMessage::ReadyOk),
        "info" => Ok(EngineMessage::Info),
        "bestmove" => {
            let txt = parts.get(1).ok_or(UciError::MissingMove)?;
            Ok(EngineMessage::BestMove(parse_uci_move(txt)?))
        }
        _ => Ok(EngineMessage::Other(line.trim().to_string())),
    }
}

/// Parse a move in UCI notation. The null move and `(none)` decode to `None`.
pub fn parse_uci_move(txt: &str) -> Result<Option<MoveSpec>, UciError> {
    match txt {
        "(none)" | "0000" => Ok(None),
        _ => txt
            .parse::<MoveSpec>()
            .map(Some)
            .map_err(|_| UciError::BadMove(txt.to_string())),
    }
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
