//! Test-pattern frame source
//!
//! Stands in for a video pipeline when running the output on its own.

use clap::ValueEnum;
use lightmap_core::{Color, Frame, PixelFormat};

/// Available test patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternKind {
    /// Whole frame in one color
    Solid,
    /// Horizontal hue sweep
    Gradient,
    /// Whole frame rotating through the hues
    Cycle,
}

/// Generates frames for a pattern at a fixed resolution
#[derive(Debug, Clone)]
pub struct TestPattern {
    kind: PatternKind,
    width: u32,
    height: u32,
    color: Color,
}

/// Hue rotation speed of [`PatternKind::Cycle`], degrees per second
const CYCLE_DEGREES_PER_SECOND: f64 = 60.0;

impl TestPattern {
    pub fn new(kind: PatternKind, width: u32, height: u32, color: Color) -> Self {
        Self {
            kind,
            width,
            height,
            color,
        }
    }

    /// Frame at `seconds` since start
    pub fn frame(&self, seconds: f64) -> Frame {
        match self.kind {
            PatternKind::Solid => {
                Frame::solid(self.width, self.height, PixelFormat::Bgra8, self.color)
            }
            PatternKind::Gradient => {
                let width = f64::from(self.width.max(1));
                Frame::from_fn(self.width, self.height, PixelFormat::Bgra8, |x, _| {
                    hue_to_rgb(f64::from(x) / width * 360.0)
                })
            }
            PatternKind::Cycle => {
                let color = hue_to_rgb(seconds * CYCLE_DEGREES_PER_SECOND);
                Frame::solid(self.width, self.height, PixelFormat::Bgra8, color)
            }
        }
    }
}

/// Fully saturated color for a hue in degrees
pub fn hue_to_rgb(hue: f64) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    let to_byte = |v: f64| (v * 255.0).round() as u8;
    Color::new(to_byte(r), to_byte(g), to_byte(b))
}

/// Parse `#rrggbb` or `r,g,b`
pub fn parse_color(s: &str) -> Result<Color, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #rrggbb, got '{s}'"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("'{s}': {e}"))
        };
        return Ok(Color::new(channel(0)?, channel(2)?, channel(4)?));
    }

    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [r, g, b] => {
            let channel = |v: &str| v.parse::<u8>().map_err(|e| format!("'{v}': {e}"));
            Ok(Color::new(channel(r)?, channel(g)?, channel(b)?))
        }
        _ => Err(format!("expected #rrggbb or r,g,b, got '{s}'")),
    }
}
