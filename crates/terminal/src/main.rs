//! Chess terminal
//!
//! Play a match against a UCI engine from the command line. Engine replies,
//! player input and the match clock are multiplexed on one Tokio task.

mod bell;
mod commands;
mod options;
mod render;

use anyhow::{Context, Result};
use match_core::{
    reply_channel, CozyRules, Difficulty, EngineBridge, MatchConfig, MatchController,
    MoveOutcome, MoveProvider, Opponent, RandomMover, ReplyDisposition, RulesAuthority, Side,
    SoundBoard,
};
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use bell::TerminalBell;
use commands::{parse_command, Command, HELP};
use options::{parse_args, print_usage};

struct Session {
    controller: MatchController,
    json: bool,
    side: Side,
    difficulty: Difficulty,
}

impl Session {
    fn show(&self) {
        let snapshot = self.controller.snapshot();
        if self.json {
            match serde_json::to_string(&snapshot) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "snapshot not serializable"),
            }
        } else {
            println!("{}", render::render(&snapshot));
        }
    }

    fn start(&mut self, side: Side, difficulty: Difficulty) {
        self.side = side;
        self.difficulty = difficulty;
        self.controller.reset();
        match self.controller.start_match(side, difficulty) {
            Ok(()) => self.show(),
            Err(e) => println!("cannot start: {e}"),
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::New { side, difficulty } => self.start(side, difficulty),
            Command::Move(mv) => match self.controller.submit_move(mv) {
                Ok(MoveOutcome::Applied(_)) | Ok(MoveOutcome::PromotionPending(_)) => self.show(),
                Err(e) => println!("{e}"),
            },
            Command::Promote(piece) => match self.controller.choose_promotion(piece) {
                Ok(_) => self.show(),
                Err(e) => println!("{e}"),
            },
            Command::CancelPromotion => {
                if self.controller.cancel_promotion().is_some() {
                    self.show();
                } else {
                    println!("no promotion is pending");
                }
            }
            Command::Legal(from) => match self.controller.legal_moves(from) {
                Ok(moves) => {
                    let list: Vec<String> = moves.iter().map(|m| m.spec.to_string()).collect();
                    println!("{}", list.join(" "));
                }
                Err(e) => println!("{e}"),
            },
            Command::Reset => {
                self.controller.reset();
                self.show();
            }
            Command::Resign => {
                self.controller.resign();
                println!("You resigned.");
                self.show();
            }
            Command::Sound => {
                let on = self.controller.toggle_sound();
                println!("sound {}", if on { "on" } else { "off" });
            }
            Command::Show => self.show(),
            Command::Moves => println!("{}", render::history(self.controller.moves())),
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        print_usage();
        return Ok(());
    };

    let mut config = match &options.config {
        Some(path) => MatchConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => MatchConfig::default(),
    };
    if let Some(engine) = options.engine.clone() {
        config.engine.path = engine;
    }

    let (replies_tx, mut replies) = reply_channel();
    let rules: Arc<dyn RulesAuthority> = Arc::new(CozyRules::new());

    let remote: Option<Box<dyn MoveProvider>> =
        match EngineBridge::launch(&config.engine, options.difficulty, replies_tx.clone()) {
            Ok(bridge) => Some(Box::new(bridge)),
            Err(e) => {
                tracing::warn!(error = %e, "engine unavailable, playing random moves");
                None
            }
        };
    let fallback = RandomMover::new(rules.clone(), replies_tx, config.fallback.delay());
    let sound = SoundBoard::new(Box::new(TerminalBell), config.sound.enabled);

    let mut session = Session {
        controller: MatchController::new(rules, Opponent::new(remote, Box::new(fallback)), sound),
        json: options.json,
        side: options.side.unwrap_or(Side::White),
        difficulty: options.difficulty,
    };

    match options.side {
        Some(side) => session.start(side, options.difficulty),
        None => println!("{HELP}"),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(config.clock.tick());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading input")? else {
                    break;
                };
                match parse_command(&line, session.side, session.difficulty) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => session.execute(command),
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            Some(reply) = replies.recv() => {
                match session.controller.on_engine_reply(reply) {
                    ReplyDisposition::Applied(_) => session.show(),
                    ReplyDisposition::NoMove => tracing::debug!("opponent has no move"),
                    ReplyDisposition::Stale | ReplyDisposition::Reissued => {}
                }
            }
            _ = ticker.tick() => {
                // Only the JSON stream carries the clock between moves
                if session.controller.tick() && session.json {
                    session.show();
                }
            }
        }
    }

    session.controller.reset();
    Ok(())
}
