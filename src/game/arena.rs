//! Arena task and authoritative tick loop
//!
//! One task owns the [`Simulation`]. Joins, leaves and commands reach it
//! through a queue that is drained at the start of every tick, so a command
//! is always applied whole, between two ticks.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::ws::protocol::ServerMsg;
use crate::ws::registry::ConnectionRegistry;

use super::router::{Command, CommandRouter};
use super::simulation::{Simulation, SimulationError};
use super::snapshot::PlayerView;
use super::PlayerId;

/// Inbound queue depth shared by all connections
const INPUT_QUEUE: usize = 1024;

/// Work handed to the arena task
#[derive(Debug)]
pub enum ArenaInput {
    Join {
        id: PlayerId,
        reply: oneshot::Sender<Result<PlayerView, SimulationError>>,
    },
    Leave {
        id: PlayerId,
    },
    Command {
        id: PlayerId,
        command: Command,
        /// Unix millis at which the transport read the message
        received_at: u64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Arena is not running")]
    Closed,

    #[error(transparent)]
    Rejected(#[from] SimulationError),
}

/// Cloneable handle to the running arena
#[derive(Clone)]
pub struct ArenaHandle {
    input_tx: mpsc::Sender<ArenaInput>,
    player_count: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
    shutdown: Arc<Notify>,
}

impl ArenaHandle {
    /// Add a player and wait for the arena to place them.
    pub async fn join(&self, id: PlayerId) -> Result<PlayerView, ArenaError> {
        let (reply, rx) = oneshot::channel();
        self.input_tx
            .send(ArenaInput::Join { id, reply })
            .await
            .map_err(|_| ArenaError::Closed)?;
        Ok(rx.await.map_err(|_| ArenaError::Closed)??)
    }

    pub async fn leave(&self, id: PlayerId) -> Result<(), ArenaError> {
        self.input_tx
            .send(ArenaInput::Leave { id })
            .await
            .map_err(|_| ArenaError::Closed)
    }

    pub async fn command(&self, id: PlayerId, command: Command, received_at: u64) -> Result<(), ArenaError> {
        self.input_tx
            .send(ArenaInput::Command {
                id,
                command,
                received_at,
            })
            .await
            .map_err(|_| ArenaError::Closed)
    }

    pub fn player_count(&self) -> usize {
        self.player_count.load(Ordering::Relaxed)
    }

    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }

    /// Stop the tick loop. Queued inputs are dropped.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// The arena task
pub struct Arena {
    sim: Simulation,
    input_rx: mpsc::Receiver<ArenaInput>,
    registry: Arc<ConnectionRegistry>,
    tick_rate: u32,
    player_count: Arc<AtomicUsize>,
    tick: Arc<AtomicU64>,
    shutdown: Arc<Notify>,
}

impl Arena {
    pub fn new(sim: Simulation, registry: Arc<ConnectionRegistry>, tick_rate: u32) -> (Self, ArenaHandle) {
        let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE);
        let player_count = Arc::new(AtomicUsize::new(sim.player_count()));
        let tick = Arc::new(AtomicU64::new(sim.tick_count()));
        let shutdown = Arc::new(Notify::new());

        let handle = ArenaHandle {
            input_tx,
            player_count: player_count.clone(),
            tick: tick.clone(),
            shutdown: shutdown.clone(),
        };

        let arena = Self {
            sim,
            input_rx,
            registry,
            tick_rate: tick_rate.max(1),
            player_count,
            tick,
            shutdown,
        };

        (arena, handle)
    }

    /// Run the tick loop until shut down
    pub async fn run(mut self) {
        info!(tick_rate = self.tick_rate, "Arena started");

        let tick_duration = Duration::from_micros(1_000_000 / self.tick_rate as u64);
        let dt = 1.0 / self.tick_rate as f32;
        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => break,
                _ = tick_interval.tick() => {}
            }

            self.process_inputs();
            self.step(dt);
        }

        info!(tick = self.sim.tick_count(), "Arena stopped");
    }

    /// Apply everything queued since the last tick
    fn process_inputs(&mut self) {
        while let Ok(input) = self.input_rx.try_recv() {
            self.handle_input(input);
        }
    }

    fn handle_input(&mut self, input: ArenaInput) {
        match input {
            ArenaInput::Join { id, reply } => {
                let result = self.sim.add_player(id.clone());
                if let Err(e) = &result {
                    warn!(player_id = %id, error = %e, "Join rejected");
                }
                self.player_count.store(self.sim.player_count(), Ordering::Relaxed);

                if reply.send(result).is_err() {
                    // Connection went away while waiting
                    debug!(player_id = %id, "Join reply dropped");
                    self.sim.remove_player(&id);
                    self.player_count.store(self.sim.player_count(), Ordering::Relaxed);
                }
            }
            ArenaInput::Leave { id } => {
                self.sim.remove_player(&id);
                self.player_count.store(self.sim.player_count(), Ordering::Relaxed);
            }
            ArenaInput::Command {
                id,
                command,
                received_at,
            } => {
                CommandRouter::apply(&mut self.sim, &id, command, received_at);
            }
        }
    }

    /// One tick followed by one full-state broadcast
    fn step(&mut self, dt: f32) {
        for outbound in self.sim.tick(dt) {
            self.registry.deliver(outbound);
        }
        self.tick.store(self.sim.tick_count(), Ordering::Relaxed);

        self.registry.broadcast(&ServerMsg::Update {
            game_state: self.sim.snapshot(),
        });
    }
}
