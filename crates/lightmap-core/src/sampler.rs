//! Average color sampling
//!
//! A pixel belongs to a quad when its centre `(x + 0.5, y + 0.5)` lies inside
//! it, so the slices of one box split its pixels without sharing any. Quads that cover no pixel centre (zero area, or entirely outside the
//! frame) fall back to the pixel nearest to the quad centre, clamped to the
//! frame. An empty frame samples as black.

use glam::Vec2;

use crate::frame::{Color, Frame};
use crate::geometry::Quad;

/// Mean color of the pixels inside `quad`, truncated per channel
pub fn average_color(frame: &Frame, quad: &Quad) -> Color {
    if frame.is_empty() {
        return Color::BLACK;
    }

    if quad.area() > f32::EPSILON {
        if let Some(color) = mean_inside(frame, quad) {
            return color;
        }
    }

    nearest_pixel(frame, quad.center())
}

fn mean_inside(frame: &Frame, quad: &Quad) -> Option<Color> {
    let (min, max) = quad.bounds();
    let x0 = clamp_coord(min.x.floor(), frame.width());
    let x1 = clamp_coord(max.x.ceil(), frame.width());
    let y0 = clamp_coord(min.y.floor(), frame.height());
    let y1 = clamp_coord(max.y.ceil(), frame.height());

    let mut sum = [0u64; 3];
    let mut count = 0u64;
    for y in y0..y1 {
        for x in x0..x1 {
            let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if !quad.contains(centre) {
                continue;
            }
            if let Some(px) = frame.pixel(x, y) {
                sum[0] += u64::from(px.r);
                sum[1] += u64::from(px.g);
                sum[2] += u64::from(px.b);
                count += 1;
            }
        }
    }

    if count == 0 {
        return None;
    }

    // Each mean is bounded by the largest channel value, so it fits in a u8
    Some(Color::new(
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ))
}

fn nearest_pixel(frame: &Frame, point: Vec2) -> Color {
    let x = clamp_coord(point.x.floor(), frame.width() - 1);
    let y = clamp_coord(point.y.floor(), frame.height() - 1);
    frame.pixel(x, y).unwrap_or(Color::BLACK)
}

/// Clamp a pixel coordinate into `0..=limit`; NaN maps to 0.
fn clamp_coord(value: f32, limit: u32) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= limit as f32 {
        limit
    } else {
        value as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;
    use crate::geometry::{subdivide, FixtureBox};

    fn split_frame() -> Frame {
        // Left half red, right half blue
        Frame::from_fn(10, 4, PixelFormat::Bgra8, |x, _| {
            if x < 5 {
                Color::new(255, 0, 0)
            } else {
                Color::new(0, 0, 255)
            }
        })
    }

    #[test]
    fn test_solid_region() {
        let frame = split_frame();
        let quad = Quad::from_rect(0.0, 0.0, 5.0, 4.0);
        assert_eq!(average_color(&frame, &quad), Color::new(255, 0, 0));
    }

    #[test]
    fn test_mean_truncates() {
        let frame = split_frame();
        let quad = Quad::from_rect(0.0, 0.0, 10.0, 4.0);
        // 255 / 2 = 127.5 truncated
        assert_eq!(average_color(&frame, &quad), Color::new(127, 0, 127));
    }

    #[test]
    fn test_subdivided_slices() {
        let frame = split_frame();
        let b = FixtureBox::new(5.0, 2.0, 10.0, 4.0);
        assert_eq!(
            average_color(&frame, &subdivide(&b, 0, 2)),
            Color::new(255, 0, 0)
        );
        assert_eq!(
            average_color(&frame, &subdivide(&b, 1, 2)),
            Color::new(0, 0, 255)
        );
    }

    #[test]
    fn test_degenerate_quad_uses_nearest_pixel() {
        let frame = split_frame();
        let quad = subdivide(&FixtureBox::new(7.2, 1.0, 0.0, 0.0), 0, 1);
        assert_eq!(average_color(&frame, &quad), Color::new(0, 0, 255));
    }

    #[test]
    fn test_default_box_samples_origin() {
        let frame = split_frame();
        let quad = subdivide(&FixtureBox::default(), 0, 1);
        assert_eq!(average_color(&frame, &quad), Color::new(255, 0, 0));
    }

    #[test]
    fn test_off_frame_quad_is_clamped() {
        let frame = split_frame();
        let quad = Quad::from_rect(500.0, 500.0, 4.0, 4.0);
        assert_eq!(average_color(&frame, &quad), Color::new(0, 0, 255));
    }

    #[test]
    fn test_empty_frame_is_black() {
        let frame = Frame::solid(0, 0, PixelFormat::Rgba8, Color::WHITE);
        let quad = Quad::from_rect(0.0, 0.0, 4.0, 4.0);
        assert_eq!(average_color(&frame, &quad), Color::BLACK);
    }
}
