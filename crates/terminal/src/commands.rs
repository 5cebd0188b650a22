//! Player input, one command per line.

use match_core::{Difficulty, MoveSpec, Promotion, Side, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start a new match, abandoning any current one
    New { side: Side, difficulty: Difficulty },
    Move(MoveSpec),
    Promote(Promotion),
    CancelPromotion,
    /// Legal moves, optionally from one square
    Legal(Option<Square>),
    Reset,
    Resign,
    Sound,
    Show,
    Moves,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  new [white|black] [standard|master]   start a match
  e2e4 | e7e8q                          play a move (UCI squares)
  promote q|r|b|n                       finish a pending promotion
  cancel                                drop a pending promotion
  legal [square]                        list legal moves
  moves | show                          history / board
  sound                                 toggle sound
  reset | resign | quit";

/// Parse one input line. Blank lines give `Ok(None)`.
///
/// `new` without arguments reuses `side` and `difficulty`.
pub fn parse_command(
    line: &str,
    side: Side,
    difficulty: Difficulty,
) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "new" | "start" => {
            let mut side = side;
            let mut difficulty = difficulty;
            for word in &rest {
                if let Ok(s) = word.parse::<Side>() {
                    side = s;
                } else {
                    difficulty = word.parse()?;
                }
            }
            Command::New { side, difficulty }
        }
        "promote" | "p" => {
            let piece = rest.first().ok_or("promote needs a piece: q, r, b or n")?;
            Command::Promote(piece.parse()?)
        }
        "cancel" => Command::CancelPromotion,
        "legal" => match rest.first() {
            Some(square) => Command::Legal(Some(square.parse()?)),
            None => Command::Legal(None),
        },
        "reset" => Command::Reset,
        "resign" => Command::Resign,
        "sound" => Command::Sound,
        "show" | "board" => Command::Show,
        "moves" | "history" => Command::Moves,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        word => Command::Move(
            word.parse()
                .map_err(|_| format!("unknown command `{word}` (try `help`)"))?,
        ),
    };
    Ok(Some(command))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
