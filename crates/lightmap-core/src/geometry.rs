//! Fixture geometry
//!
//! A [`FixtureBox`] describes where a row of fixtures sits on screen. It is
//! centred on `(x, y)` in frame pixel coordinates and may be rotated about
//! that centre. [`subdivide`] cuts the box into equal slices along its local
//! x axis, one [`Quad`] per fixture instance.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Bounding box of a group of fixtures, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureBox {
    /// Horizontal centre
    pub x: f32,
    /// Vertical centre
    pub y: f32,
    /// Width before rotation
    pub width: f32,
    /// Height before rotation
    pub height: f32,
    /// Clockwise rotation in degrees
    pub rotation: f32,
}

impl FixtureBox {
    /// Create a new unrotated box
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Return the same box rotated by `degrees`
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Centre point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A convex quadrilateral in frame pixel coordinates
///
/// Corners are stored in winding order: top-left, top-right, bottom-right,
/// bottom-left (before rotation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    /// The four corners
    pub corners: [Vec2; 4],
}

impl Quad {
    /// Axis-aligned quad from its top-left corner and size
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            corners: [
                Vec2::new(x, y),
                Vec2::new(x + width, y),
                Vec2::new(x + width, y + height),
                Vec2::new(x, y + height),
            ],
        }
    }

    /// Mean of the four corners
    pub fn center(&self) -> Vec2 {
        (self.corners[0] + self.corners[1] + self.corners[2] + self.corners[3]) * 0.25
    }

    /// Absolute area (shoelace formula)
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Axis-aligned bounds as `(min, max)`
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let mut min = self.corners[0];
        let mut max = self.corners[0];
        for corner in &self.corners[1..] {
            min = min.min(*corner);
            max = max.max(*corner);
        }
        (min, max)
    }

    /// Whether `point` lies inside the quad.
    ///
    /// Edges follow a top-left rule: a point exactly on the top or left edge
    /// (as seen with the quad's own winding) is inside, one on the bottom or
    /// right edge is not. Quads that share an edge therefore never both
    /// contain a point on it. Only meaningful for non-degenerate convex quads.
    pub fn contains(&self, point: Vec2) -> bool {
        let winding = if self.signed_area() < 0.0 { -1.0 } else { 1.0 };
        (0..4).all(|i| {
            let a = self.corners[i];
            let edge = (self.corners[(i + 1) % 4] - a) * winding;
            let cross = edge.perp_dot(point - a);
            cross > 0.0 || (cross == 0.0 && is_top_left(edge))
        })
    }

    fn signed_area(&self) -> f32 {
        let mut twice = 0.0;
        for i in 0..4 {
            twice += self.corners[i].perp_dot(self.corners[(i + 1) % 4]);
        }
        twice * 0.5
    }
}

// With y pointing down and a positive winding, top edges run towards +x and
// left edges run towards -y
fn is_top_left(edge: Vec2) -> bool {
    edge.y < 0.0 || (edge.y == 0.0 && edge.x > 0.0)
}

/// Sampling quad for fixture `index` out of `count` inside `fixture_box`.
///
/// `count == 0` is treated as a single fixture and `index` is clamped to the
/// last slice, so the result is always defined.
pub fn subdivide(fixture_box: &FixtureBox, index: usize, count: usize) -> Quad {
    let count = count.max(1);
    let index = index.min(count - 1);

    let slice_width = fixture_box.width / count as f32;
    let half_height = fixture_box.height * 0.5;
    // Both sides come from the same expression so neighbours share an edge exactly
    let edge = |i: usize| -fixture_box.width * 0.5 + slice_width * i as f32;
    let (left, right) = (edge(index), edge(index + 1));

    // y grows downwards, so a positive angle turns the box clockwise on screen
    let (sin, cos) = fixture_box.rotation.to_radians().sin_cos();
    let axis_u = Vec2::new(cos, sin);
    let axis_v = Vec2::new(-sin, cos);
    let center = fixture_box.center();
    let to_frame = |lx: f32, ly: f32| center + axis_u * lx + axis_v * ly;

    Quad {
        corners: [
            to_frame(left, -half_height),
            to_frame(right, -half_height),
            to_frame(right, half_height),
            to_frame(left, half_height),
        ],
    }
}
