//! Collision predicates over normalized [0,1]² coordinates
//!
//! All tests compare squared distances; nothing here takes a square root.

/// Check whether a circle touches an axis-aligned rectangle.
///
/// The circle center is clamped onto the rectangle to find the closest point,
/// then the squared distance to that point is compared against `r²`.
#[inline]
pub fn circle_intersects_rect(cx: f32, cy: f32, r: f32, rx: f32, ry: f32, rw: f32, rh: f32) -> bool {
    let closest_x = cx.min(rx + rw).max(rx);
    let closest_y = cy.min(ry + rh).max(ry);
    let dx = cx - closest_x;
    let dy = cy - closest_y;
    dx * dx + dy * dy <= r * r
}

/// Check whether two circles touch or overlap.
#[inline]
pub fn circle_intersects_circle(x1: f32, y1: f32, r1: f32, x2: f32, y2: f32, r2: f32) -> bool {
    let dx = x1 - x2;
    let dy = y1 - y2;
    let combined_radius = r1 + r2;
    dx * dx + dy * dy <= combined_radius * combined_radius
}

/// Check if a point lies inside the unit square (edges included).
#[inline]
pub fn in_unit_bounds(x: f32, y: f32) -> bool {
    (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_circle_rect_overlap() {
        // Circle just left of a rect, reaching past its edge
        assert!(circle_intersects_rect(0.2, 0.5, 0.11, 0.3, 0.4, 0.2, 0.2));
        // Same circle moved away
        assert!(!circle_intersects_rect(0.1, 0.5, 0.1, 0.3, 0.4, 0.2, 0.2));
        // Center inside the rect
        assert!(circle_intersects_rect(0.4, 0.5, 0.0, 0.3, 0.4, 0.2, 0.2));
    }

    #[test]
    fn test_circle_rect_corner() {
        // Near the corner the closest point is the corner itself
        let r = 0.05;
        assert!(!circle_intersects_rect(0.26, 0.36, r, 0.3, 0.4, 0.2, 0.2));
        assert!(circle_intersects_rect(0.27, 0.37, r, 0.3, 0.4, 0.2, 0.2));
    }

    #[test]
    fn test_circle_circle_overlap() {
        assert!(circle_intersects_circle(0.0, 0.0, 0.3, 0.5, 0.0, 0.3));
        assert!(!circle_intersects_circle(0.0, 0.0, 0.2, 0.5, 0.0, 0.2));
    }

    #[test]
    fn test_unit_bounds_edges() {
        assert!(in_unit_bounds(0.0, 1.0));
        assert!(!in_unit_bounds(-0.001, 0.5));
        assert!(!in_unit_bounds(0.5, 1.001));
    }

    fn coord() -> impl Strategy<Value = f32> {
        0.0f32..1.0
    }

    fn radius() -> impl Strategy<Value = f32> {
        0.0f32..0.2
    }

    // Multiples of 1/1024 so sums and squares stay exact in f32
    fn grid() -> impl Strategy<Value = f32> {
        (0u32..1024).prop_map(|v| v as f32 / 1024.0)
    }

    fn grid_extent() -> impl Strategy<Value = f32> {
        (0u32..256).prop_map(|v| v as f32 / 1024.0)
    }

    proptest! {
        #[test]
        fn circle_circle_is_symmetric(
            x1 in coord(), y1 in coord(), r1 in radius(),
            x2 in coord(), y2 in coord(), r2 in radius(),
        ) {
            prop_assert_eq!(
                circle_intersects_circle(x1, y1, r1, x2, y2, r2),
                circle_intersects_circle(x2, y2, r2, x1, y1, r1)
            );
        }

        #[test]
        fn circle_rect_hit_survives_larger_radius(
            cx in coord(), cy in coord(), r in radius(), grow in 0.0f32..0.2,
            rx in coord(), ry in coord(), rw in 0.0f32..0.3, rh in 0.0f32..0.3,
        ) {
            if circle_intersects_rect(cx, cy, r, rx, ry, rw, rh) {
                prop_assert!(circle_intersects_rect(cx, cy, r + grow, rx, ry, rw, rh));
            }
        }

        #[test]
        fn circle_circle_hit_survives_larger_radius(
            x1 in coord(), y1 in coord(), r1 in radius(),
            x2 in coord(), y2 in coord(), r2 in radius(), grow in 0.0f32..0.2,
        ) {
            if circle_intersects_circle(x1, y1, r1, x2, y2, r2) {
                prop_assert!(circle_intersects_circle(x1, y1, r1 + grow, x2, y2, r2));
            }
        }

        #[test]
        fn circle_rect_translation_invariant(
            cx in grid(), cy in grid(), r in grid_extent(),
            rx in grid(), ry in grid(), rw in grid_extent(), rh in grid_extent(),
        ) {
            let t = 0.5;
            prop_assert_eq!(
                circle_intersects_rect(cx, cy, r, rx, ry, rw, rh),
                circle_intersects_rect(cx + t, cy + t, r, rx + t, ry + t, rw, rh)
            );
        }

        #[test]
        fn circle_circle_translation_invariant(
            x1 in grid(), y1 in grid(), r1 in grid_extent(),
            x2 in grid(), y2 in grid(), r2 in grid_extent(),
            tx in grid(), ty in grid(),
        ) {
            prop_assert_eq!(
                circle_intersects_circle(x1, y1, r1, x2, y2, r2),
                circle_intersects_circle(x1 + tx, y1 + ty, r1, x2 + tx, y2 + ty, r2)
            );
        }
    }
}
