use super::*;
use crate::types::Promotion;

#[test]
fn commands_render_as_protocol_lines() {
    assert_eq!(EngineCommand::Uci.to_string(), "uci");
    assert_eq!(
        EngineCommand::skill(10).to_string(),
        "setoption name Skill Level value 10"
    );
    assert_eq!(EngineCommand::IsReady.to_string(), "isready");
    assert_eq!(
        EngineCommand::Position {
            fen: "8/8/8/8/8/8/8/K6k w - - 0 1".to_string()
        }
        .to_string(),
        "position fen 8/8/8/8/8/8/8/K6k w - - 0 1"
    );
    assert_eq!(
        EngineCommand::Go { movetime_ms: 1000 }.to_string(),
        "go movetime 1000"
    );
}

#[test]
fn parses_handshake_lines() {
    assert_eq!(
        parse_engine_line("id name Stockfish 17.1").unwrap(),
        EngineMessage::Id {
            name: "Stockfish 17.1".to_string()
        }
    );
    assert_eq!(parse_engine_line("uciok").unwrap(), EngineMessage::UciOk);
    assert_eq!(parse_engine_line("readyok\r").unwrap(), EngineMessage::ReadyOk);
    assert_eq!(
        parse_engine_line("info depth 12 score cp 31").unwrap(),
        EngineMessage::Info
    );
    assert!(matches!(
        parse_engine_line("option name Hash type spin").unwrap(),
        EngineMessage::Other(_)
    ));
}

#[test]
fn parses_bestmove_with_ponder_and_promotion() {
    let msg = parse_engine_line("bestmove e7e8q ponder a2a3").unwrap();
    let EngineMessage::BestMove(Some(mv)) = msg else {
        panic!("expected a move, got {msg:?}");
    };
    assert_eq!(mv.from.to_string(), "e7");
    assert_eq!(mv.to.to_string(), "e8");
    assert_eq!(mv.promotion, Some(Promotion::Queen));
    assert_eq!(mv.to_string(), "e7e8q");
}

#[test]
fn no_move_sentinels_decode_to_none() {
    assert_eq!(
        parse_engine_line("bestmove (none)").unwrap(),
        EngineMessage::BestMove(None)
    );
    assert_eq!(
        parse_engine_line("bestmove 0000").unwrap(),
        EngineMessage::BestMove(None)
    );
}

#[test]
fn malformed_lines_are_errors() {
    assert_eq!(parse_engine_line("   "), Err(UciError::Empty));
    assert_eq!(parse_engine_line("bestmove"), Err(UciError::MissingMove));
    assert_eq!(
        parse_engine_line("bestmove z9z9"),
        Err(UciError::BadMove("z9z9".to_string()))
    );
}
