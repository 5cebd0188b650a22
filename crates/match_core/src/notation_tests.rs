use crate::rules::{CozyRules, Position, RulesAuthority, START_FEN};
use crate::types::MoveSpec;

fn play(fen: &str, moves: &[&str]) -> Vec<String> {
    let rules = CozyRules::new();
    let mut pos = Position::from_fen(fen);
    let mut sans = Vec::new();
    for txt in moves {
        let mv: MoveSpec = txt.parse().unwrap();
        let applied = rules.apply_move(&pos, &mv).unwrap();
        sans.push(applied.record.san);
        pos = applied.position;
    }
    sans
}

#[test]
fn test_pawn_and_piece_moves() {
    assert_eq!(play(START_FEN, &["e2e4", "g8f6"]), vec!["e4", "Nf6"]);
}

#[test]
fn test_pawn_capture_names_origin_file() {
    let sans = play(START_FEN, &["e2e4", "d7d5", "e4d5"]);
    assert_eq!(sans[2], "exd5");
}

#[test]
fn test_castling_both_wings() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    assert_eq!(play(fen, &["e1g1"]), vec!["O-O"]);
    assert_eq!(play(fen, &["e1c1"]), vec!["O-O-O"]);
}

#[test]
fn test_knight_disambiguation_by_file() {
    let fen = "4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1";
    assert_eq!(play(fen, &["b1d2"]), vec!["Nbd2"]);
    assert_eq!(play(fen, &["f3d2"]), vec!["Nfd2"]);
}

#[test]
fn test_promotion_with_check_suffix() {
    let fen = "8/P7/8/8/8/8/8/k6K w - - 0 1";
    assert_eq!(play(fen, &["a7a8q"]), vec!["a8=Q+"]);
}

#[test]
fn test_mate_suffix() {
    // Fool's mate
    let sans = play(START_FEN, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(sans.last().unwrap(), "Qh4#");
}

#[test]
fn test_en_passant_capture() {
    let sans = play("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", &["e5d6"]);
    assert_eq!(sans, vec!["exd6"]);
}
