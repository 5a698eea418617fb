//! Authoritative arena state and the per-tick advance
//!
//! The simulation never talks to the network. Everything that must reach a
//! client comes back from [`Simulation::tick`] as a list of [`Outbound`]
//! events for the caller to deliver.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::combat::{CombatSystem, Projectile};
use super::geometry::circle_intersects_rect;
use super::level::{Level, LevelMeta, Zone};
use super::snapshot::{GameStateView, PlayerView};
use super::spawn::{SpawnError, SpawnPlacer};
use super::{Color, Direction, GameConfig, PlayerId};

/// Text sent to a player when they are knocked out
pub const ELIMINATED_MESSAGE: &str = "You have been eliminated";

/// Where a player is in their life in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Alive,
    /// Hit by a projectile; stays connected but no longer moves, shoots or collides
    Eliminated,
}

/// Authoritative player state
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    /// Last non-`None` direction, used as the aim heading
    pub aim: Direction,
    pub speed: f32,
    pub radius: f32,
    pub color: Color,
    pub lifecycle: Lifecycle,
    pub last_shot_at: Option<u64>,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    fn eliminate(&mut self) {
        self.lifecycle = Lifecycle::Eliminated;
        self.direction = Direction::None;
        self.speed = 0.0;
        self.radius = 0.0;
    }
}

/// Notices produced by the simulation for delivery to clients
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Sent only to the player who was hit
    Eliminated { message: String },
    /// Tells everyone else who was hit
    PlayerDestroyed { id: PlayerId },
}

/// Who should receive an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Only(PlayerId),
    AllExcept(PlayerId),
}

/// An event addressed to its audience
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub audience: Audience,
    pub event: GameEvent,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("Player {0} is already in the arena")]
    DuplicatePlayer(PlayerId),

    #[error("Arena is full: {0}")]
    ArenaSaturated(#[from] SpawnError),
}

/// Owns players, projectiles and the static level
pub struct Simulation {
    config: GameConfig,
    zones: Arc<[Zone]>,
    meta: Arc<LevelMeta>,
    /// Ordered so hit resolution is deterministic
    players: BTreeMap<PlayerId, Player>,
    projectiles: Vec<Projectile>,
    placer: SpawnPlacer,
    next_projectile_id: u64,
    tick: u64,
}

impl Simulation {
    pub fn new(config: GameConfig, level: Level, seed: u64) -> Self {
        let placer = SpawnPlacer::new(seed, config.anchored_spawns, config.max_spawn_attempts);
        Self {
            config,
            zones: level.zones,
            meta: level.meta,
            players: BTreeMap::new(),
            projectiles: Vec::new(),
            placer,
            next_projectile_id: 1,
            tick: 0,
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[cfg(test)]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    #[cfg(test)]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Place a new player in the arena.
    pub fn add_player(&mut self, id: PlayerId) -> Result<PlayerView, SimulationError> {
        if self.players.contains_key(&id) {
            return Err(SimulationError::DuplicatePlayer(id));
        }

        let taken: Vec<Color> = self.players.values().map(|p| p.color).collect();
        let color = self.placer.choose_color(&taken);

        let occupants: Vec<(f32, f32, f32)> = self.players.values().map(|p| (p.x, p.y, p.radius)).collect();
        let (x, y) = self
            .placer
            .choose_position(color, self.config.player_radius, &occupants, &self.zones)?;

        let player = Player {
            id: id.clone(),
            x,
            y,
            direction: Direction::None,
            aim: Direction::Down,
            speed: self.config.player_speed,
            radius: self.config.player_radius,
            color,
            lifecycle: Lifecycle::Alive,
            last_shot_at: None,
        };
        let view = PlayerView::from(&player);
        self.players.insert(id, player);

        info!(player_id = %view.id, color = ?color, x, y, "Player spawned");
        Ok(view)
    }

    /// Remove a player. Their projectiles keep flying unless configured otherwise.
    pub fn remove_player(&mut self, id: &PlayerId) -> bool {
        if self.players.remove(id).is_none() {
            return false;
        }
        if self.config.purge_projectiles_on_leave {
            self.projectiles.retain(|p| &p.owner_id != id);
        }
        info!(player_id = %id, "Player removed");
        true
    }

    /// Set movement direction; any direction but `None` also becomes the aim.
    pub fn set_direction(&mut self, id: &PlayerId, direction: Direction) {
        let Some(player) = self.players.get_mut(id) else {
            debug!(player_id = %id, "Direction for unknown player ignored");
            return;
        };
        if !player.is_alive() {
            return;
        }

        player.direction = direction;
        if direction != Direction::None {
            player.aim = direction;
        }
    }

    /// Fire along the aim heading if the cooldown has elapsed. Returns whether a projectile spawned.
    pub fn shoot(&mut self, id: &PlayerId, now_ms: u64) -> bool {
        let Some(player) = self.players.get_mut(id) else {
            debug!(player_id = %id, "Shot from unknown player ignored");
            return false;
        };
        if !player.is_alive() {
            return false;
        }
        if !CombatSystem::can_fire(player.last_shot_at, now_ms, self.config.shot_cooldown_ms) {
            return false;
        }
        if player.aim.vector() == (0.0, 0.0) {
            return false;
        }

        let projectile = Projectile::new(
            self.next_projectile_id,
            player.id.clone(),
            player.x,
            player.y,
            player.aim,
            &self.config,
        );
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        player.last_shot_at = Some(now_ms);
        self.projectiles.push(projectile);
        true
    }

    /// Advance the arena by `dt` seconds.
    ///
    /// Projectiles move and resolve first (walls, then players, then bounds),
    /// then players move. Returns the notices raised by this step.
    pub fn tick(&mut self, dt: f32) -> Vec<Outbound> {
        self.tick += 1;
        let mut events = Vec::new();

        // 1. Move projectiles
        for projectile in &mut self.projectiles {
            projectile.advance(dt);
        }

        // 2. Wall impacts
        let mut removed: Vec<bool> = self.projectiles.iter().map(|p| p.hits_wall(&self.zones)).collect();

        // 3. Player hits, first victim only
        for (projectile, removed) in self.projectiles.iter().zip(removed.iter_mut()) {
            if *removed {
                continue;
            }

            let victim = self.players.values_mut().find(|player| {
                player.is_alive()
                    && player.id != projectile.owner_id
                    && projectile.check_hit(player.x, player.y, player.radius)
            });

            if let Some(victim) = victim {
                victim.eliminate();
                *removed = true;

                info!(
                    tick = self.tick,
                    victim_id = %victim.id,
                    shooter_id = %projectile.owner_id,
                    projectile_id = projectile.id,
                    "Player eliminated"
                );

                events.push(Outbound {
                    audience: Audience::Only(victim.id.clone()),
                    event: GameEvent::Eliminated {
                        message: ELIMINATED_MESSAGE.to_string(),
                    },
                });
                events.push(Outbound {
                    audience: Audience::AllExcept(victim.id.clone()),
                    event: GameEvent::PlayerDestroyed { id: victim.id.clone() },
                });
            }
        }

        // 4. Drop spent and escaped projectiles
        let mut removed = removed.into_iter();
        self.projectiles
            .retain(|p| !removed.next().unwrap_or(false) && p.in_bounds());

        // 5. Move players; a move into a wall is rejected outright
        for player in self.players.values_mut() {
            if !player.is_alive() {
                continue;
            }

            let (dx, dy) = player.direction.vector();
            let next_x = player.x + dx * player.speed * dt;
            let next_y = player.y + dy * player.speed * dt;

            let blocked = self
                .zones
                .iter()
                .any(|z| circle_intersects_rect(next_x, next_y, player.radius, z.x, z.y, z.width, z.height));

            if !blocked {
                player.x = next_x.clamp(0.0, 1.0);
                player.y = next_y.clamp(0.0, 1.0);
            }
        }

        events
    }

    /// Read-only copy of the current state
    pub fn snapshot(&self) -> GameStateView {
        GameStateView::build(
            self.tick,
            self.players.values(),
            &self.projectiles,
            &self.zones,
            &self.meta,
        )
    }
}
