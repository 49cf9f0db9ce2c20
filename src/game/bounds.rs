//! Periodic world rectangle
//!
//! The playfield is a torus `[0, width) x [0, height)`. Wrapping bodies live
//! inside it; distances between them use the minimum image convention.

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Half-size of the square that covers the whole world
    #[inline]
    pub fn root_half_size(&self) -> f32 {
        self.width.max(self.height) * 0.5
    }

    /// Shortest displacement on the torus, each axis independently
    pub fn minimum_image(&self, mut dr: Vec2) -> Vec2 {
        let half_w = self.width * 0.5;
        let half_h = self.height * 0.5;

        // Far-away inputs (off-world black holes) can be more than one period out
        if dr.x.abs() > self.width {
            dr.x %= self.width;
        }
        if dr.y.abs() > self.height {
            dr.y %= self.height;
        }

        if dr.x > half_w {
            dr.x -= self.width;
        } else if dr.x < -half_w {
            dr.x += self.width;
        }
        if dr.y > half_h {
            dr.y -= self.height;
        } else if dr.y < -half_h {
            dr.y += self.height;
        }
        dr
    }

    /// Reduce a position into `[0, width) x [0, height)`
    pub fn wrap_position(&self, pos: Vec2) -> Vec2 {
        Vec2::new(wrap_axis(pos.x, self.width), wrap_axis(pos.y, self.height))
    }

    /// True when `pos` is further than `margin` outside the world
    pub fn is_outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -margin
            || pos.x > self.width + margin
            || pos.y < -margin
            || pos.y > self.height + margin
    }
}

#[inline]
fn wrap_axis(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to exactly `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds::new(800.0, 600.0)
    }

    #[test]
    fn test_center_and_root_half_size() {
        let b = bounds();
        assert_eq!(b.center(), Vec2::new(400.0, 300.0));
        assert_eq!(b.root_half_size(), 400.0);
    }

    #[test]
    fn test_wrap_position_always_in_range() {
        let b = bounds();
        let inputs = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(800.0, 600.0),
            Vec2::new(-12_345.6, 98_765.4),
            Vec2::new(1e7, -1e7),
            Vec2::new(-1e-7, -1e-7),
            Vec2::new(799.99, 0.0),
        ];
        for pos in inputs {
            let w = b.wrap_position(pos);
            assert!(w.x >= 0.0 && w.x < b.width, "x out of range for {:?}: {}", pos, w.x);
            assert!(w.y >= 0.0 && w.y < b.height, "y out of range for {:?}: {}", pos, w.y);
        }
    }

    #[test]
    fn test_wrap_position_identity_inside() {
        let b = bounds();
        let p = Vec2::new(123.0, 456.0);
        assert_eq!(b.wrap_position(p), p);
    }

    #[test]
    fn test_wrap_position_one_period() {
        let b = bounds();
        let w = b.wrap_position(Vec2::new(810.0, -10.0));
        assert!(w.approx_eq(Vec2::new(10.0, 590.0), 1e-3));
    }

    #[test]
    fn test_minimum_image_prefers_wrapped_path() {
        let b = bounds();
        let dr = b.minimum_image(Vec2::new(790.0, -590.0));
        assert!(dr.approx_eq(Vec2::new(-10.0, 10.0), 1e-3));
    }

    #[test]
    fn test_minimum_image_never_exceeds_half_extent() {
        let b = bounds();
        let inputs = [
            Vec2::new(401.0, 301.0),
            Vec2::new(-401.0, -301.0),
            Vec2::new(1599.0, 1199.0),
            Vec2::new(-2500.0, 3700.0),
            Vec2::new(400.0, -300.0),
            Vec2::new(0.0, 0.0),
        ];
        for dr in inputs {
            let m = b.minimum_image(dr);
            assert!(m.x.abs() <= b.width * 0.5 + 1e-3, "x too large for {:?}: {}", dr, m.x);
            assert!(m.y.abs() <= b.height * 0.5 + 1e-3, "y too large for {:?}: {}", dr, m.y);
        }
    }

    #[test]
    fn test_is_outside_margin() {
        let b = bounds();
        assert!(!b.is_outside(Vec2::new(-50.0, 300.0), 100.0));
        assert!(b.is_outside(Vec2::new(-101.0, 300.0), 100.0));
        assert!(b.is_outside(Vec2::new(400.0, 701.0), 100.0));
        assert!(!b.is_outside(Vec2::new(900.0, 700.0), 100.0));
    }
}
