//! Engine bridge against a scripted UCI stand-in.
#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use match_core::config::EngineConfig;
use match_core::{
    reply_channel, CozyRules, Difficulty, EngineBridge, EngineRequest, MatchController,
    MoveOutcome, MoveProvider, Opponent, Position, ProviderError, ProviderKind, RandomMover,
    ReplyDisposition, ReplyOutcome, ReplyReceiver, RulesAuthority, Side, SoundBoard, Ticket, START_FEN,
};

/// Answers every search with e7e5.
const ANSWERS_E5: &str = "while read l; do case \"$l\" in \
    uci) echo 'id name Scripted'; echo uciok;; \
    isready) echo readyok;; \
    go*) echo 'bestmove e7e5';; \
    quit) exit 0;; \
    esac; done";

/// Handshakes, then dies on the first search.
const DIES_ON_GO: &str = "while read l; do case \"$l\" in \
    uci) echo uciok;; \
    isready) echo readyok;; \
    go*) exit 3;; \
    esac; done";

/// Stays silent on the first search and answers `stop` with a8a7;
/// later searches are answered with e7e5.
const SLOW_FIRST_SEARCH: &str = "n=0; while read l; do case \"$l\" in \
    uci) echo uciok;; \
    isready) echo readyok;; \
    go*) n=$((n+1)); if [ $n -gt 1 ]; then echo 'bestmove e7e5'; fi;; \
    stop) echo 'bestmove a8a7';; \
    quit) exit 0;; \
    esac; done";

/// Names itself after how many `isready` it has seen.
const COUNTS_ISREADY: &str = "n=0; while read l; do case \"$l\" in \
    uci) echo uciok;; \
    isready) n=$((n+1)); echo \"id name Round$n\"; echo readyok;; \
    quit) exit 0;; \
    esac; done";

fn scripted(script: &str) -> EngineConfig {
    EngineConfig {
        path: "sh".into(),
        args: vec!["-c".to_string(), script.to_string()],
        think_delay_ms: 0,
        move_time_ms: 50,
        ..EngineConfig::default()
    }
}

async fn wait_ready(bridge: &EngineBridge) {
    for _ in 0..200 {
        if bridge.is_ready() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("engine never became ready");
}

async fn next_reply(replies: &mut ReplyReceiver) -> match_core::EngineReply {
    tokio::time::timeout(Duration::from_secs(5), replies.recv())
        .await
        .expect("reply in time")
        .expect("channel open")
}

fn after_e4() -> EngineRequest {
    ticketed(1)
}

fn ticketed(ticket: u64) -> EngineRequest {
    EngineRequest {
        ticket: Ticket(ticket),
        generation: 1,
        position: Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"),
        side: Side::Black,
    }
}

#[tokio::test]
async fn handshake_then_bestmove() {
    let (tx, mut replies) = reply_channel();
    let mut bridge = EngineBridge::launch(&scripted(ANSWERS_E5), Difficulty::Master, tx).unwrap();
    wait_ready(&bridge).await;
    assert_eq!(bridge.engine_name().as_deref(), Some("Scripted"));

    bridge.request_move(after_e4()).unwrap();
    assert_eq!(bridge.request_move(after_e4()), Err(ProviderError::Busy));

    let reply = next_reply(&mut replies).await;
    assert_eq!(reply.ticket, Ticket(1));
    assert_eq!(reply.source, ProviderKind::Engine);
    assert_eq!(reply.outcome, ReplyOutcome::BestMove("e7e5".parse().unwrap()));
}

#[tokio::test]
async fn engine_exit_fails_the_outstanding_request() {
    let (tx, mut replies) = reply_channel();
    let mut bridge = EngineBridge::launch(&scripted(DIES_ON_GO), Difficulty::Standard, tx).unwrap();
    wait_ready(&bridge).await;

    bridge.request_move(after_e4()).unwrap();
    let reply = next_reply(&mut replies).await;
    assert!(matches!(reply.outcome, ReplyOutcome::Failed(_)));
    assert!(bridge.has_failed());
    assert!(!bridge.is_available());
    assert!(bridge.request_move(after_e4()).is_err());
}

#[tokio::test]
async fn controller_plays_the_engine_move() {
    let (tx, mut replies) = reply_channel();
    let bridge = EngineBridge::launch(&scripted(ANSWERS_E5), Difficulty::Standard, tx.clone()).unwrap();
    wait_ready(&bridge).await;

    let rules: Arc<dyn RulesAuthority> = Arc::new(CozyRules::new());
    let fallback = RandomMover::new(rules.clone(), tx, Duration::ZERO);
    let opponent = Opponent::new(Some(Box::new(bridge)), Box::new(fallback));
    let mut controller = MatchController::new(rules, opponent, SoundBoard::silent());

    controller.start_match(Side::White, Difficulty::Standard).unwrap();
    assert!(controller.position().as_fen().starts_with(START_FEN.split(' ').next().unwrap()));
    let outcome = controller.submit_move("e2e4".parse().unwrap()).unwrap();
    assert!(matches!(outcome, MoveOutcome::Applied(_)));
    assert!(controller.is_thinking());

    let reply = next_reply(&mut replies).await;
    assert_eq!(reply.source, ProviderKind::Engine);
    assert!(matches!(
        controller.on_engine_reply(reply),
        ReplyDisposition::Applied(_)
    ));
    assert_eq!(controller.last_automated_move(), Some("AI: e7 → e5"));
    assert_eq!(controller.turn(), Side::White);
    assert!(controller.engine_available());
}

#[tokio::test]
async fn cancel_during_think_delay_sends_nothing() {
    let (tx, mut replies) = reply_channel();
    let config = EngineConfig {
        think_delay_ms: 200,
        ..scripted(ANSWERS_E5)
    };
    let mut bridge = EngineBridge::launch(&config, Difficulty::Standard, tx).unwrap();
    wait_ready(&bridge).await;

    bridge.request_move(ticketed(1)).unwrap();
    bridge.cancel();
    let quiet = tokio::time::timeout(Duration::from_millis(600), replies.recv()).await;
    assert!(quiet.is_err(), "cancelled request was answered");

    bridge.request_move(ticketed(2)).unwrap();
    let reply = next_reply(&mut replies).await;
    assert_eq!(reply.ticket, Ticket(2));
    assert_eq!(reply.outcome, ReplyOutcome::BestMove("e7e5".parse().unwrap()));
}

#[tokio::test]
async fn cancelled_search_answer_is_swallowed() {
    let (tx, mut replies) = reply_channel();
    let mut bridge =
        EngineBridge::launch(&scripted(SLOW_FIRST_SEARCH), Difficulty::Standard, tx).unwrap();
    wait_ready(&bridge).await;

    bridge.request_move(ticketed(1)).unwrap();
    // Let the search start before stopping it
    tokio::time::sleep(Duration::from_millis(100)).await;
    bridge.cancel();

    bridge.request_move(ticketed(2)).unwrap();
    let reply = next_reply(&mut replies).await;
    assert_eq!(reply.ticket, Ticket(2));
    assert_eq!(reply.outcome, ReplyOutcome::BestMove("e7e5".parse().unwrap()));

    let extra = tokio::time::timeout(Duration::from_millis(200), replies.recv()).await;
    assert!(extra.is_err(), "answer to the stopped search leaked");
}

#[tokio::test]
async fn new_game_waits_for_readiness_again() {
    let (tx, _replies) = reply_channel();
    let mut bridge =
        EngineBridge::launch(&scripted(COUNTS_ISREADY), Difficulty::Standard, tx).unwrap();
    wait_ready(&bridge).await;
    assert_eq!(bridge.engine_name().as_deref(), Some("Round1"));

    bridge.new_game(Difficulty::Master);
    for _ in 0..200 {
        if bridge.engine_name().as_deref() == Some("Round2") {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no isready after ucinewgame");
}
