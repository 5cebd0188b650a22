//! Bridge to an external UCI engine process.
//!
//! The process is driven by two Tokio tasks: a writer that drains a command
//! queue into the engine's stdin, and a reader that decodes its stdout. The
//! bridge itself is never blocked. Answers travel to the controller as
//! [`EngineReply`] values on the shared reply channel.
//!
//! Protocol:
//! 1. `uci`, `setoption name Skill Level value N`, `isready` once at launch;
//!    requests are refused with [`ProviderError::NotReady`] until `readyok`.
//! 2. Per request, after the think-time delay: `position fen ...` and
//!    `go movetime ...`, answered by one `bestmove`.
//! 3. Cancelling a running search sends `stop`; the `bestmove` that the engine
//!    still owes for it is swallowed, whether or not it decodes.
//! 4. A new match sends `ucinewgame`, the skill option and `isready`.
//!
//! A closed pipe or process exit marks the bridge as failed for good. If a
//! request was outstanding it is answered with [`ReplyOutcome::Failed`].

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::error::{BridgeError, ProviderError, UciError};
use crate::provider::{EngineReply, EngineRequest, MoveProvider, ProviderKind, ReplyOutcome, ReplySender};
use crate::types::{Difficulty, MoveSpec};
use crate::uci::{parse_engine_line, EngineCommand, EngineMessage};

/// Request bookkeeping shared between the bridge and its tasks.
#[derive(Debug, Default)]
struct Inflight {
    /// Request awaiting its `bestmove`
    current: Option<EngineRequest>,
    /// `go` has been sent for `current`
    searching: bool,
    /// `bestmove` lines still owed for cancelled searches
    discard: usize,
}

#[derive(Debug, Default)]
struct Shared {
    ready: AtomicBool,
    failed: AtomicBool,
    closing: AtomicBool,
    engine_name: Mutex<Option<String>>,
    inflight: Mutex<Inflight>,
}

impl Shared {
    fn inflight(&self) -> MutexGuard<'_, Inflight> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_line(&self, line: &str, replies: &ReplySender) {
        match parse_engine_line(line) {
            Ok(EngineMessage::ReadyOk) => {
                if !self.ready.swap(true, Ordering::SeqCst) {
                    tracing::info!("engine ready");
                }
            }
            Ok(EngineMessage::Id { name }) => {
                tracing::debug!(%name, "engine identified");
                *self.engine_name.lock().unwrap_or_else(PoisonError::into_inner) = Some(name);
            }
            Ok(EngineMessage::BestMove(mv)) => self.resolve(mv, replies),
            Ok(EngineMessage::UciOk | EngineMessage::Info | EngineMessage::Other(_)) => {
                tracing::trace!(line, "engine output");
            }
            Err(UciError::Empty) => {}
            Err(e) => {
                let mut inflight = self.inflight();
                if inflight.discard > 0 {
                    // Owed to a cancelled search, so its content does not matter
                    inflight.discard -= 1;
                    tracing::debug!(line, "bestmove for a cancelled search discarded");
                    return;
                }
                // The search is over even though its answer is unusable
                inflight.searching = false;
                tracing::warn!(line, error = %e, "undecodable engine reply discarded");
            }
        }
    }

    fn resolve(&self, mv: Option<MoveSpec>, replies: &ReplySender) {
        let mut inflight = self.inflight();
        if inflight.discard > 0 {
            inflight.discard -= 1;
            tracing::debug!("bestmove for a cancelled search discarded");
            return;
        }
        inflight.searching = false;
        let Some(request) = inflight.current.take() else {
            tracing::debug!("unsolicited bestmove discarded");
            return;
        };
        let outcome = match mv {
            Some(mv) => ReplyOutcome::BestMove(mv),
            None => ReplyOutcome::NoMove,
        };
        let _ = replies.send(EngineReply::answer(&request, ProviderKind::Engine, outcome));
    }

    fn fail(&self, replies: &ReplySender, reason: String) {
        if self.failed.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.closing.load(Ordering::SeqCst) {
            tracing::debug!(%reason, "engine closed");
        } else {
            tracing::warn!(%reason, "engine process failed");
        }
        let mut inflight = self.inflight();
        inflight.searching = false;
        if let Some(request) = inflight.current.take() {
            let _ = replies.send(EngineReply::answer(
                &request,
                ProviderKind::Engine,
                ReplyOutcome::Failed(reason),
            ));
        }
    }
}

/// [`MoveProvider`] backed by a long-lived UCI process.
pub struct EngineBridge {
    label: String,
    commands: mpsc::UnboundedSender<EngineCommand>,
    shared: Arc<Shared>,
    config: EngineConfig,
    delay_task: Option<JoinHandle<()>>,
}

impl EngineBridge {
    /// Spawn the engine and start the handshake.
    ///
    /// Must be called from within a Tokio runtime. Fails only if the process
    /// cannot be started; readiness is reported later through
    /// [`EngineBridge::is_ready`].
    pub fn launch(
        config: &EngineConfig,
        difficulty: Difficulty,
        replies: ReplySender,
    ) -> Result<Self, BridgeError> {
        let path = config.path.display().to_string();
        let mut child = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| BridgeError::Spawn {
                path: path.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(BridgeError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(BridgeError::MissingPipe("stdout"))?;

        let shared = Arc::new(Shared::default());
        let (commands, queue) = mpsc::unbounded_channel();

        tokio::spawn(write_commands(stdin, queue, shared.clone(), replies.clone()));
        tokio::spawn(read_replies(child, stdout, shared.clone(), replies));

        let _ = commands.send(EngineCommand::Uci);
        let _ = commands.send(EngineCommand::skill(config.skill_for(difficulty)));
        let _ = commands.send(EngineCommand::IsReady);

        tracing::info!(
            engine = %path,
            skill = config.skill_for(difficulty),
            move_time = ?config.move_time(),
            "engine launched"
        );

        Ok(Self {
            label: path,
            commands,
            shared,
            config: config.clone(),
            delay_task: None,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::SeqCst)
    }

    pub fn has_failed(&self) -> bool {
        self.shared.failed.load(Ordering::SeqCst)
    }

    /// Name from the engine's `id name` line, once received.
    pub fn engine_name(&self) -> Option<String> {
        self.shared
            .engine_name
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MoveProvider for EngineBridge {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Engine
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn is_available(&self) -> bool {
        !self.has_failed()
    }

    fn new_game(&mut self, difficulty: Difficulty) {
        if self.has_failed() {
            return;
        }
        let _ = self.commands.send(EngineCommand::NewGame);
        let _ = self
            .commands
            .send(EngineCommand::skill(self.config.skill_for(difficulty)));
        let _ = self.commands.send(EngineCommand::IsReady);
    }

    fn request_move(&mut self, request: EngineRequest) -> Result<(), ProviderError> {
        if self.has_failed() {
            return Err(ProviderError::Unavailable("engine process failed".to_string()));
        }
        if !self.is_ready() {
            return Err(ProviderError::NotReady);
        }

        let ticket = request.ticket;
        let fen = request.position.as_fen().to_string();
        {
            let mut inflight = self.shared.inflight();
            if inflight.current.is_some() {
                return Err(ProviderError::Busy);
            }
            inflight.current = Some(request);
        }

        let shared = self.shared.clone();
        let commands = self.commands.clone();
        let delay = self.config.think_delay();
        let movetime_ms = self.config.move_time_ms;

        self.delay_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inflight = shared.inflight();
            // Cancelled while we slept
            if inflight.current.as_ref().map(|r| r.ticket) != Some(ticket) {
                return;
            }
            inflight.searching = true;
            let _ = commands.send(EngineCommand::Position { fen });
            let _ = commands.send(EngineCommand::Go { movetime_ms });
        }));
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(task) = self.delay_task.take() {
            task.abort();
        }
        let mut inflight = self.shared.inflight();
        if inflight.current.take().is_some() {
            tracing::debug!("engine request cancelled");
        }
        if inflight.searching {
            inflight.searching = false;
            inflight.discard += 1;
            let _ = self.commands.send(EngineCommand::Stop);
        }
    }
}

impl Drop for EngineBridge {
    fn drop(&mut self) {
        self.shared.closing.store(true, Ordering::SeqCst);
        if let Some(task) = self.delay_task.take() {
            task.abort();
        }
        let _ = self.commands.send(EngineCommand::Quit);
    }
}

async fn write_commands(
    mut stdin: ChildStdin,
    mut queue: mpsc::UnboundedReceiver<EngineCommand>,
    shared: Arc<Shared>,
    replies: ReplySender,
) {
    while let Some(command) = queue.recv().await {
        tracing::trace!(%command, "to engine");
        if let Err(e) = send_line(&mut stdin, &command.to_string()).await {
            shared.fail(&replies, format!("write failed: {e}"));
            return;
        }
        if command == EngineCommand::Quit {
            return;
        }
    }
}

async fn send_line(stdin: &mut ChildStdin, line: &str) -> std::io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

async fn read_replies(
    mut child: Child,
    stdout: ChildStdout,
    shared: Arc<Shared>,
    replies: ReplySender,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => shared.handle_line(&line, &replies),
            Ok(None) => {
                shared.fail(&replies, "engine closed its output".to_string());
                break;
            }
            Err(e) => {
                shared.fail(&replies, format!("read failed: {e}"));
                break;
            }
        }
    }
    let _ = child.start_kill();
    let _ = child.wait().await;
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod bridge_tests;
