//! Screen-wrap motion and box overlap
//!
//! Every mobile entity owns a [`Body`]: a centre, a constant velocity and an
//! axis-aligned half-extent. Each tick the body integrates once and then
//! wraps toroidally at the screen edges.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Kinematic body with an axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre position (pixels, y grows downward)
    pub pos: Vec2,
    /// Velocity (pixels/tick)
    pub vel: Vec2,
    /// Half width / half height of the bounding box
    pub half_extent: Vec2,
    /// Facing in degrees, 0 = up, clockwise positive
    pub angle: f32,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, half_extent: Vec2) -> Self {
        Self {
            pos,
            vel,
            half_extent,
            angle: 0.0,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.half_extent.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.half_extent.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.half_extent.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.half_extent.y
    }

    /// Advance one tick at constant velocity
    #[inline]
    pub fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Wrap at the screen edges.
    ///
    /// An edge crossing its boundary moves the opposite edge onto the
    /// opposite boundary: leaving on the right puts the left edge at 0,
    /// leaving through the top puts the bottom edge at `height`. Each of
    /// the four edges is checked independently. Afterwards the centre lies
    /// within `[0, width) x [0, height)` as long as the box is non-empty
    /// and smaller than the screen.
    pub fn wrap(&mut self, width: f32, height: f32) {
        if self.right() > width {
            self.pos.x = self.half_extent.x;
        }
        if self.left() < 0.0 {
            self.pos.x = width - self.half_extent.x;
        }
        if self.bottom() > height {
            self.pos.y = self.half_extent.y;
        }
        if self.top() < 0.0 {
            self.pos.y = height - self.half_extent.y;
        }
    }

    /// Integrate then wrap
    pub fn step(&mut self, width: f32, height: f32) {
        self.integrate();
        self.wrap(width, height);
    }

    /// Clamp each velocity component to `[-max, max]`
    pub fn clamp_velocity(&mut self, max: f32) {
        self.vel = self.vel.clamp(Vec2::splat(-max), Vec2::splat(max));
    }

    /// Strict box overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Body) -> bool {
        let d = (self.pos - other.pos).abs();
        let reach = self.half_extent + other.half_extent;
        d.x < reach.x && d.y < reach.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const W: f32 = 640.0;
    const H: f32 = 480.0;

    #[test]
    fn test_right_edge_wraps_to_left() {
        let mut body = Body::new(Vec2::new(630.0, 200.0), Vec2::new(5.0, 0.0), Vec2::splat(10.0));
        body.step(W, H);
        assert_eq!(body.left(), 0.0);
        assert_eq!(body.pos.y, 200.0);
    }

    #[test]
    fn test_left_edge_wraps_to_right() {
        let mut body = Body::new(Vec2::new(12.0, 200.0), Vec2::new(-5.0, 0.0), Vec2::splat(10.0));
        body.step(W, H);
        assert_eq!(body.right(), W);
    }

    #[test]
    fn test_vertical_wrap() {
        let mut body = Body::new(Vec2::new(100.0, 5.0), Vec2::new(0.0, -3.0), Vec2::splat(4.0));
        body.step(W, H);
        assert_eq!(body.bottom(), H);

        let mut body = Body::new(Vec2::new(100.0, 478.0), Vec2::new(0.0, 3.0), Vec2::splat(4.0));
        body.step(W, H);
        assert_eq!(body.top(), 0.0);
    }

    #[test]
    fn test_inside_is_untouched() {
        let mut body = Body::new(Vec2::new(100.0, 100.0), Vec2::new(1.5, -2.0), Vec2::splat(10.0));
        body.step(W, H);
        assert_eq!(body.pos, Vec2::new(101.5, 98.0));
    }

    #[test]
    fn test_clamp_velocity() {
        let mut body = Body::new(Vec2::ZERO, Vec2::new(7.0, -9.0), Vec2::ONE);
        body.clamp_velocity(3.0);
        assert_eq!(body.vel, Vec2::new(3.0, -3.0));
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Body::new(Vec2::new(0.0, 0.0), Vec2::ZERO, Vec2::splat(5.0));
        let b = Body::new(Vec2::new(10.0, 0.0), Vec2::ZERO, Vec2::splat(5.0));
        assert!(!a.overlaps(&b));

        let c = Body::new(Vec2::new(9.0, 3.0), Vec2::ZERO, Vec2::splat(5.0));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    proptest! {
        #[test]
        fn prop_wrap_keeps_centre_on_screen(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            dx in -20.0f32..20.0,
            dy in -20.0f32..20.0,
            hx in 1.0f32..100.0,
            hy in 1.0f32..100.0,
        ) {
            let mut body = Body::new(Vec2::new(x, y), Vec2::new(dx, dy), Vec2::new(hx, hy));
            body.step(W, H);
            prop_assert!(body.pos.x >= 0.0 && body.pos.x < W);
            prop_assert!(body.pos.y >= 0.0 && body.pos.y < H);
        }
    }
}
