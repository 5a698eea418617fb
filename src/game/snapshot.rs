//! Serializable views of the simulation state

use serde::Serialize;
use std::sync::Arc;

use super::combat::Projectile;
use super::level::{LevelMeta, Zone};
use super::simulation::Player;
use super::{Color, Direction, PlayerId};

/// Player state as clients see it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub direction: Direction,
    pub last_direction: Direction,
    pub color: Color,
    pub radius: f32,
    pub alive: bool,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            x: p.x,
            y: p.y,
            speed: p.speed,
            direction: p.direction,
            last_direction: p.aim,
            color: p.color,
            radius: p.radius,
            alive: p.is_alive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileView {
    pub id: u64,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
    pub radius: f32,
}

impl From<&Projectile> for ProjectileView {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id.clone(),
            x: p.x,
            y: p.y,
            dx: p.dx,
            dy: p.dy,
            speed: p.speed,
            radius: p.radius,
        }
    }
}

/// Full arena state after a tick.
///
/// Zones and level metadata are shared with the simulation, which never
/// mutates them after load.
#[derive(Debug, Clone, Serialize)]
pub struct GameStateView {
    pub tick: u64,
    pub players: Vec<PlayerView>,
    pub projectiles: Vec<ProjectileView>,
    pub zones: Arc<[Zone]>,
    #[serde(flatten)]
    pub meta: Arc<LevelMeta>,
}

impl GameStateView {
    pub fn build<'a>(
        tick: u64,
        players: impl IntoIterator<Item = &'a Player>,
        projectiles: &[Projectile],
        zones: &Arc<[Zone]>,
        meta: &Arc<LevelMeta>,
    ) -> Self {
        Self {
            tick,
            players: players.into_iter().map(PlayerView::from).collect(),
            projectiles: projectiles.iter().map(ProjectileView::from).collect(),
            zones: Arc::clone(zones),
            meta: Arc::clone(meta),
        }
    }
}
