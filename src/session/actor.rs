//! Game Session Actor
//!
//! Runs one `GameManager` on a tokio task. Commands arrive over an mpsc
//! channel with oneshot replies; game events fan out over a broadcast
//! channel. Between commands the actor sleeps until the manager's next
//! deadline, so flips and the mismatch delay resolve on their own.
//!
//! Every `game-save` is written to the configured store before the event
//! is broadcast.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep_until;
use tracing::{debug, info, warn};

use crate::core::layout::Viewport;
use crate::game::card::CardView;
use crate::game::config::{ConfigError, GameConfig, ManagerSettings};
use crate::game::events::GameEvent;
use crate::game::manager::{ClickOutcome, GameManager};
use crate::game::snapshot::{Snapshot, SnapshotError};
use crate::game::weapon::{asset_paths, default_catalog, Weapon};
use crate::session::assets::{AssetError, AssetLoader, NoopAssetLoader};
use crate::session::clock::SessionClock;
use crate::session::store::SnapshotStore;
use crate::session::timer::ElapsedTimer;

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The actor has stopped.
    #[error("Session is closed")]
    Closed,

    /// Asset preloading failed; no board was built.
    #[error(transparent)]
    Assets(#[from] AssetError),

    /// Invalid board configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Snapshot could not be resumed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// How a session begins.
#[derive(Debug, Clone)]
pub enum SessionStart {
    /// A new board from a configuration
    Fresh(GameConfig),
    /// Resume a persisted game
    Resume(Snapshot),
}

/// Session wiring.
#[derive(Clone)]
pub struct SessionOptions {
    /// Weapons the board is drawn from
    pub catalog: Vec<Weapon>,
    /// Layout, timing and viewport
    pub settings: ManagerSettings,
    /// Command channel capacity
    pub command_capacity: usize,
    /// Event channel capacity
    pub event_capacity: usize,
    /// Texture preloader
    pub loader: Arc<dyn AssetLoader>,
    /// Where `game-save` snapshots go
    pub store: Option<Arc<dyn SnapshotStore>>,
    /// Time source; the system clock when unset
    pub clock: Option<SessionClock>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            settings: ManagerSettings::default(),
            command_capacity: 64,
            event_capacity: 256,
            loader: Arc::new(NoopAssetLoader),
            store: None,
            clock: None,
        }
    }
}

/// Point-in-time summary of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    /// Moves so far
    pub moves: u32,
    /// Selected card indices
    pub selection: Vec<usize>,
    /// A turn is being resolved
    pub is_busy: bool,
    /// Every pair is matched
    pub is_finished: bool,
    /// Board generation, bumped by new game and restore
    pub generation: u64,
}

enum Command {
    Click {
        index: usize,
        reply: oneshot::Sender<ClickOutcome>,
    },
    Resize {
        viewport: Viewport,
    },
    NewGame {
        config: GameConfig,
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    Restore {
        snapshot: Box<Snapshot>,
        reply: oneshot::Sender<Result<(), SnapshotError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
    Views {
        reply: oneshot::Sender<Vec<CardView>>,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    WaitIdle {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Handle to a running session.
pub struct GameSession {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<GameEvent>,
    elapsed: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl GameSession {
    /// Preload assets, build the board and spawn the actor.
    pub async fn start(start: SessionStart, options: SessionOptions) -> Result<Self, SessionError> {
        let paths = asset_paths(&options.catalog);
        options.loader.load_all(&paths).await?;

        let clock = options.clock.unwrap_or_else(SessionClock::system);
        let now = clock.now_ms();
        let manager = match start {
            SessionStart::Fresh(config) => {
                GameManager::new(config, options.catalog, options.settings, now)?
            }
            SessionStart::Resume(snapshot) => {
                GameManager::from_snapshot(&snapshot, options.catalog, options.settings, now)?
            }
        };

        let mut timer = ElapsedTimer::new();
        if manager.is_finished() {
            timer.stop_at(manager.elapsed(now));
        } else {
            timer.start(manager.elapsed(now));
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(options.command_capacity.max(1));
        let (event_tx, _) = broadcast::channel(options.event_capacity.max(1));
        let elapsed = timer.subscribe();

        let actor = SessionActor {
            manager,
            clock,
            timer,
            events: event_tx.clone(),
            store: options.store,
            idle_waiters: Vec::new(),
        };
        let task = tokio::spawn(actor.run(cmd_rx));

        Ok(Self {
            commands: cmd_tx,
            events: event_tx,
            elapsed,
            task,
        })
    }

    /// Click the card at `index`.
    pub async fn click(&self, index: usize) -> Result<ClickOutcome, SessionError> {
        self.request(|reply| Command::Click { index, reply }).await
    }

    /// Report a viewport change.
    pub async fn resize(&self, viewport: Viewport) -> Result<(), SessionError> {
        self.commands
            .send(Command::Resize { viewport })
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Replace the board with a new game.
    pub async fn new_game(&self, config: GameConfig) -> Result<(), SessionError> {
        self.request(|reply| Command::NewGame { config, reply }).await??;
        Ok(())
    }

    /// Replace the board with a persisted game.
    pub async fn restore(&self, snapshot: Snapshot) -> Result<(), SessionError> {
        let snapshot = Box::new(snapshot);
        self.request(|reply| Command::Restore { snapshot, reply }).await??;
        Ok(())
    }

    /// Capture the current game.
    pub async fn snapshot(&self) -> Result<Snapshot, SessionError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Render descriptions of every card.
    pub async fn views(&self) -> Result<Vec<CardView>, SessionError> {
        self.request(|reply| Command::Views { reply }).await
    }

    /// Current session summary.
    pub async fn status(&self) -> Result<SessionStatus, SessionError> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Resolve once no turn is being resolved.
    pub async fn wait_idle(&self) -> Result<(), SessionError> {
        self.request(|reply| Command::WaitIdle { reply }).await
    }

    /// Subscribe to game events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    /// Watch the elapsed-time counter (milliseconds).
    pub fn elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.clone()
    }

    /// Stop the actor and wait for it to exit.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        // A closed channel means the actor is already gone
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await.map_err(|_| SessionError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }
}

struct SessionActor {
    manager: GameManager,
    clock: SessionClock,
    timer: ElapsedTimer,
    events: broadcast::Sender<GameEvent>,
    store: Option<Arc<dyn SnapshotStore>>,
    idle_waiters: Vec<oneshot::Sender<()>>,
}

impl SessionActor {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        info!(
            seed = %self.manager.config().seed,
            generation = self.manager.generation(),
            "Session started"
        );

        loop {
            let deadline = self.manager.next_deadline();
            let wake_at = self.clock.instant_at(deadline.unwrap_or(0));

            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                _ = sleep_until(wake_at), if deadline.is_some() => {
                    // Never sample before the deadline we slept for
                    let now = self.clock.now_ms().max(deadline.unwrap_or(0));
                    self.advance(now);
                }
            }

            if !self.manager.is_busy() {
                for waiter in self.idle_waiters.drain(..) {
                    let _ = waiter.send(());
                }
            }
        }

        self.timer.stop();
        info!(moves = self.manager.moves(), "Session stopped");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Click { index, reply } => {
                let now = self.clock.now_ms();
                let outcome = self.manager.on_card_click(index, now);
                // Zero-length flips resolve immediately
                self.advance(now);
                let _ = reply.send(outcome);
            }
            Command::Resize { viewport } => {
                self.manager.resize(viewport);
            }
            Command::NewGame { config, reply } => {
                let now = self.clock.now_ms();
                let result = self.manager.new_game(config, now);
                if result.is_ok() {
                    self.timer.start(0);
                }
                let _ = reply.send(result);
            }
            Command::Restore { snapshot, reply } => {
                let now = self.clock.now_ms();
                let result = self.manager.restore(&snapshot, now);
                if result.is_ok() {
                    let elapsed = self.manager.elapsed(now);
                    if self.manager.is_finished() {
                        self.timer.stop_at(elapsed);
                    } else {
                        self.timer.start(elapsed);
                    }
                }
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.manager.serialize());
            }
            Command::Views { reply } => {
                let _ = reply.send(self.manager.views());
            }
            Command::Status { reply } => {
                let _ = reply.send(SessionStatus {
                    moves: self.manager.moves(),
                    selection: self.manager.selection().to_vec(),
                    is_busy: self.manager.is_busy(),
                    is_finished: self.manager.is_finished(),
                    generation: self.manager.generation(),
                });
            }
            Command::WaitIdle { reply } => {
                if self.manager.is_busy() {
                    self.idle_waiters.push(reply);
                } else {
                    let _ = reply.send(());
                }
            }
            // Handled by the run loop
            Command::Shutdown => {}
        }
    }

    fn advance(&mut self, now: u64) {
        for event in self.manager.advance(now) {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: GameEvent) {
        match &event {
            GameEvent::GameSave => self.persist(),
            GameEvent::GameFinished { moves, elapsed } => {
                self.timer.stop_at(*elapsed);
                info!(moves, elapsed_ms = elapsed, "Game finished");
            }
            _ => {}
        }
        debug!(event = event.name(), "Broadcasting event");
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.manager.serialize()) {
            warn!(error = %e, "Failed to persist snapshot");
        }
    }
}
