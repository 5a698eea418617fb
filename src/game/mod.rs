//! Game simulation modules

pub mod arena;
pub mod combat;
pub mod geometry;
pub mod level;
pub mod router;
pub mod simulation;
pub mod snapshot;
pub mod spawn;

pub use arena::{Arena, ArenaError, ArenaHandle};
pub use level::Level;
pub use simulation::Simulation;
pub use snapshot::GameStateView;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque player identifier issued by the transport
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Movement direction, also used as the aim heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::None,
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// Unit vector for this direction (y grows downward)
    pub fn vector(self) -> (f32, f32) {
        use std::f32::consts::FRAC_1_SQRT_2 as D;
        match self {
            Direction::None => (0.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::UpLeft => (-D, -D),
            Direction::UpRight => (D, -D),
            Direction::DownLeft => (-D, D),
            Direction::DownRight => (D, D),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::None => "none",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::UpLeft => "upLeft",
            Direction::UpRight => "upRight",
            Direction::DownLeft => "downLeft",
            Direction::DownRight => "downRight",
        }
    }
}

/// Returned when a direction name is not one of the known values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown direction: {0}")]
pub struct UnknownDirection(pub String);

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| UnknownDirection(s.to_string()))
    }
}

/// Player color, doubling as the team/home-base marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Brown,
    Blue,
    Yellow,
    Green,
}

impl Color {
    /// The full palette, in assignment order
    pub const PALETTE: [Color; 4] = [Color::Brown, Color::Blue, Color::Yellow, Color::Green];
}

/// Gameplay tuning shared by the simulation and its helpers
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Player movement speed (arena widths per second)
    pub player_speed: f32,
    /// Player hitbox radius
    pub player_radius: f32,
    /// Projectile speed (arena widths per second)
    pub projectile_speed: f32,
    /// Projectile hitbox radius
    pub projectile_radius: f32,
    /// Minimum time between two accepted shots
    pub shot_cooldown_ms: u64,
    /// Spawn at per-color home bases instead of random positions
    pub anchored_spawns: bool,
    /// Give up searching for a free spawn point after this many draws
    pub max_spawn_attempts: u32,
    /// Drop a player's projectiles when they disconnect
    pub purge_projectiles_on_leave: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_speed: 0.2,
            player_radius: 0.03,
            projectile_speed: 1.5,
            projectile_radius: 0.01,
            shot_cooldown_ms: 2000,
            anchored_spawns: true,
            max_spawn_attempts: 10_000,
            purge_projectiles_on_leave: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_names_round_trip() {
        for dir in Direction::ALL {
            assert_eq!(dir.name().parse::<Direction>(), Ok(dir));
        }
        assert!("north".parse::<Direction>().is_err());
        assert!("Up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_direction_vectors_are_unit_or_zero() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.vector();
            let len_sq = dx * dx + dy * dy;
            if dir == Direction::None {
                assert_eq!(len_sq, 0.0);
            } else {
                assert!((len_sq - 1.0).abs() < 1e-6, "{:?}", dir);
            }
        }
    }

    #[test]
    fn test_direction_serializes_like_its_name() {
        for dir in Direction::ALL {
            let json = serde_json::to_string(&dir).unwrap();
            assert_eq!(json, format!("\"{}\"", dir.name()));
        }
    }
}
