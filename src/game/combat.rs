//! Combat system - projectiles, cooldowns, hit detection

use super::geometry::{circle_intersects_circle, circle_intersects_rect, in_unit_bounds};
use super::level::Zone;
use super::{Direction, GameConfig, PlayerId};

/// Projectile in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u64,
    pub owner_id: PlayerId,
    pub x: f32,
    pub y: f32,
    /// Unit heading
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
    pub radius: f32,
}

impl Projectile {
    /// Spawn a projectile at `(x, y)` heading along `heading`
    pub fn new(id: u64, owner_id: PlayerId, x: f32, y: f32, heading: Direction, config: &GameConfig) -> Self {
        let (dx, dy) = heading.vector();
        Self {
            id,
            owner_id,
            x,
            y,
            dx,
            dy,
            speed: config.projectile_speed,
            radius: config.projectile_radius,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.x += self.dx * self.speed * dt;
        self.y += self.dy * self.speed * dt;
    }

    /// Check collision with a circular target
    pub fn check_hit(&self, target_x: f32, target_y: f32, target_radius: f32) -> bool {
        circle_intersects_circle(self.x, self.y, self.radius, target_x, target_y, target_radius)
    }

    pub fn hits_wall(&self, zones: &[Zone]) -> bool {
        zones
            .iter()
            .any(|z| circle_intersects_rect(self.x, self.y, self.radius, z.x, z.y, z.width, z.height))
    }

    pub fn in_bounds(&self) -> bool {
        in_unit_bounds(self.x, self.y)
    }
}

/// Combat rules that do not need simulation state
pub struct CombatSystem;

impl CombatSystem {
    /// Check if enough time has passed since the last accepted shot.
    ///
    /// A player who never fired can always fire. A clock that went backwards
    /// counts as no time elapsed.
    pub fn can_fire(last_shot_at: Option<u64>, now: u64, cooldown_ms: u64) -> bool {
        match last_shot_at {
            None => true,
            Some(last) => now.saturating_sub(last) >= cooldown_ms,
        }
    }
}
