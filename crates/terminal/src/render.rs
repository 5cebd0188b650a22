//! Text rendering of match snapshots.

use match_core::{format_elapsed, GameStatus, MatchPhase, MatchSnapshot, MoveRecord};

/// History as numbered move pairs: `1. e4 e5`.
pub fn history(moves: &[MoveRecord]) -> String {
    moves
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let sans: Vec<&str> = pair.iter().map(|m| m.san.as_str()).collect();
            format!("{}. {}", i + 1, sans.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// ASCII diagram of the FEN placement, drawn from Black's side when flipped.
pub fn board(fen: &str, flipped: bool) -> String {
    let placement = fen.split_whitespace().next().unwrap_or_default();
    let mut grid = [['.'; 8]; 8];
    for (row, rank) in placement.split('/').take(8).enumerate() {
        let mut file = 0usize;
        for ch in rank.chars() {
            if let Some(skip) = ch.to_digit(10) {
                file += skip as usize;
            } else if file < 8 {
                grid[row][file] = ch;
                file += 1;
            }
        }
    }

    let rows: Vec<usize> = if flipped { (0..8).rev().collect() } else { (0..8).collect() };
    let files: Vec<usize> = if flipped { (0..8).rev().collect() } else { (0..8).collect() };

    let mut out = String::new();
    for &row in &rows {
        out.push_str(&format!("{} ", 8 - row));
        for &file in &files {
            out.push(' ');
            out.push(grid[row][file]);
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &file in &files {
        out.push(' ');
        out.push((b'a' + file as u8) as char);
    }
    out
}

pub fn status_line(snapshot: &MatchSnapshot) -> String {
    let clock = format_elapsed(snapshot.elapsed_secs);
    match snapshot.phase {
        MatchPhase::NotStarted => "No match in progress. Type `new` to start.".to_string(),
        MatchPhase::Concluded => format!("{} | {}", outcome(snapshot), clock),
        MatchPhase::Playing => {
            let mut line = format!("{} to move", snapshot.turn);
            if snapshot.status == GameStatus::Check {
                line.push_str(" (check)");
            }
            line.push_str(&format!(" | {} | {} {}", clock, snapshot.opponent, snapshot.difficulty));
            if snapshot.thinking {
                line.push_str(" | thinking...");
            }
            if let Some(p) = snapshot.pending_promotion {
                line.push_str(&format!(" | promote {}{}: q, r, b or n?", p.from, p.to));
            }
            line
        }
    }
}

fn outcome(snapshot: &MatchSnapshot) -> String {
    match snapshot.status {
        GameStatus::Checkmate => {
            // The side to move is the one that got mated
            let winner = snapshot.turn.other();
            let who = if winner == snapshot.human_side { "You win" } else { "You lose" };
            format!("Checkmate, {winner} wins. {who}")
        }
        GameStatus::Stalemate => "Stalemate, draw".to_string(),
        _ => "Draw".to_string(),
    }
}

/// Board, last automated move and status line.
pub fn render(snapshot: &MatchSnapshot) -> String {
    let mut out = String::new();
    if snapshot.phase != MatchPhase::NotStarted {
        out.push_str(&board(&snapshot.fen, snapshot.board_flipped));
        out.push('\n');
        if let Some(last) = &snapshot.last_automated_move {
            out.push_str(last);
            out.push('\n');
        }
    }
    out.push_str(&status_line(snapshot));
    if !snapshot.engine_available && snapshot.phase != MatchPhase::NotStarted {
        out.push_str("\n(engine offline, random moves)");
    }
    out
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
