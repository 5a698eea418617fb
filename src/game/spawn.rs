//! Color assignment and spawn placement for new players

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::geometry::{circle_intersects_circle, circle_intersects_rect};
use super::level::Zone;
use super::Color;

/// Home-base spawn points, in pixels of a 512px level
const ANCHOR_PIXELS: [(Color, f32, f32); 4] = [
    (Color::Brown, 64.0, 250.0),
    (Color::Blue, 240.0, 64.0),
    (Color::Yellow, 416.0, 240.0),
    (Color::Green, 240.0, 400.0),
];

const ANCHOR_LEVEL_SIZE: f32 = 512.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpawnError {
    #[error("No free spawn position after {0} attempts")]
    Saturated(u32),
}

/// Picks colors and starting positions for joining players
pub struct SpawnPlacer {
    rng: ChaCha8Rng,
    anchored: bool,
    max_attempts: u32,
}

impl SpawnPlacer {
    pub fn new(seed: u64, anchored: bool, max_attempts: u32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            anchored,
            max_attempts,
        }
    }

    /// First palette color nobody is using, or any palette color once all are taken.
    pub fn choose_color(&mut self, connected: &[Color]) -> Color {
        match Color::PALETTE.into_iter().find(|c| !connected.contains(c)) {
            Some(color) => color,
            None => Color::PALETTE[self.rng.gen_range(0..Color::PALETTE.len())],
        }
    }

    /// Fixed home base for a color, normalized to the unit square
    pub fn anchor(color: Color) -> Option<(f32, f32)> {
        ANCHOR_PIXELS
            .iter()
            .find(|(c, _, _)| *c == color)
            .map(|(_, x, y)| (x / ANCHOR_LEVEL_SIZE, y / ANCHOR_LEVEL_SIZE))
    }

    /// Choose where a player of `color` with `radius` enters the arena.
    ///
    /// Anchored colors always get their home base. Otherwise points are drawn
    /// uniformly until one clears every occupant `(x, y, r)` and every zone.
    pub fn choose_position(
        &mut self,
        color: Color,
        radius: f32,
        occupants: &[(f32, f32, f32)],
        zones: &[Zone],
    ) -> Result<(f32, f32), SpawnError> {
        if self.anchored {
            if let Some(anchor) = Self::anchor(color) {
                return Ok(anchor);
            }
        }

        for _ in 0..self.max_attempts {
            let x: f32 = self.rng.gen();
            let y: f32 = self.rng.gen();

            let hits_player = occupants
                .iter()
                .any(|&(px, py, pr)| circle_intersects_circle(x, y, radius, px, py, pr));
            if hits_player {
                continue;
            }

            let hits_zone = zones
                .iter()
                .any(|z| circle_intersects_rect(x, y, radius, z.x, z.y, z.width, z.height));
            if hits_zone {
                continue;
            }

            return Ok((x, y));
        }

        Err(SpawnError::Saturated(self.max_attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_unique_until_palette_exhausted() {
        let mut placer = SpawnPlacer::new(7, false, 100);
        let mut taken = Vec::new();
        for _ in 0..Color::PALETTE.len() {
            let color = placer.choose_color(&taken);
            assert!(!taken.contains(&color));
            taken.push(color);
        }
        assert_eq!(taken, Color::PALETTE.to_vec());

        // Fifth player gets some palette color
        let extra = placer.choose_color(&taken);
        assert!(Color::PALETTE.contains(&extra));
    }

    #[test]
    fn test_color_fills_gap() {
        let mut placer = SpawnPlacer::new(7, false, 100);
        let color = placer.choose_color(&[Color::Brown, Color::Yellow]);
        assert_eq!(color, Color::Blue);
    }

    #[test]
    fn test_anchored_spawn_ignores_occupants() {
        let mut placer = SpawnPlacer::new(1, true, 100);
        let anchor = SpawnPlacer::anchor(Color::Blue).unwrap();
        let occupants = [(anchor.0, anchor.1, 0.5)];

        let pos = placer.choose_position(Color::Blue, 0.03, &occupants, &[]).unwrap();
        assert_eq!(pos, (240.0 / 512.0, 64.0 / 512.0));
    }

    #[test]
    fn test_random_spawn_avoids_obstacles() {
        let mut placer = SpawnPlacer::new(42, false, 10_000);
        // Wall over the left half, a player parked in the bottom right
        let zones = [Zone::new(0.0, 0.0, 0.5, 1.0)];
        let occupants = [(0.75, 0.75, 0.2)];
        let radius = 0.03;

        for _ in 0..50 {
            let (x, y) = placer.choose_position(Color::Green, radius, &occupants, &zones).unwrap();
            assert!(!circle_intersects_rect(x, y, radius, 0.0, 0.0, 0.5, 1.0));
            assert!(!circle_intersects_circle(x, y, radius, 0.75, 0.75, 0.2));
            assert!((0.0..1.0).contains(&x) && (0.0..1.0).contains(&y));
        }
    }

    #[test]
    fn test_saturated_arena_reports_error() {
        let mut placer = SpawnPlacer::new(3, false, 25);
        let zones = [Zone::new(0.0, 0.0, 1.0, 1.0)];

        let err = placer.choose_position(Color::Brown, 0.03, &[], &zones).unwrap_err();
        assert_eq!(err, SpawnError::Saturated(25));
    }

    #[test]
    fn test_same_seed_same_positions() {
        let mut a = SpawnPlacer::new(99, false, 100);
        let mut b = SpawnPlacer::new(99, false, 100);
        for _ in 0..5 {
            assert_eq!(
                a.choose_position(Color::Brown, 0.03, &[], &[]),
                b.choose_position(Color::Brown, 0.03, &[], &[])
            );
        }
    }
}
