//! Video frame snapshots
//!
//! A [`Frame`] is an immutable, tightly packed 8-bit four channel image. The
//! host pipeline hands frames over as `Arc<Frame>` so that the same snapshot
//! can be shared between the producer and the lighting output without copies.

use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// Bytes per pixel for every supported format
pub const BYTES_PER_PIXEL: usize = 4;

/// Channel order of a frame's pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Blue, green, red, alpha (native layout of the mixer)
    #[default]
    Bgra8,
    /// Red, green, blue, alpha
    Rgba8,
}

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Black (all channels zero)
    pub const BLACK: Color = Color::new(0, 0, 0);
    /// White (all channels full)
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// An immutable video frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a packed pixel buffer.
    ///
    /// The buffer must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(CoreError::FrameSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Create a frame filled with a single opaque color
    pub fn solid(width: u32, height: u32, format: PixelFormat, color: Color) -> Self {
        let pixel = encode_pixel(format, color);
        let data = pixel.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel
    pub fn from_fn<F>(width: u32, height: u32, format: PixelFormat, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Color,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&encode_pixel(format, f(x, y)));
            }
        }
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout of the raw data
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw packed pixel data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True when the frame has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Color of the pixel at `(x, y)`, or `None` outside the frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.data[offset..offset + BYTES_PER_PIXEL];
        Some(match self.format {
            PixelFormat::Bgra8 => Color::new(px[2], px[1], px[0]),
            PixelFormat::Rgba8 => Color::new(px[0], px[1], px[2]),
        })
    }
}

fn encode_pixel(format: PixelFormat, color: Color) -> [u8; BYTES_PER_PIXEL] {
    match format {
        PixelFormat::Bgra8 => [color.b, color.g, color.r, 255],
        PixelFormat::Rgba8 => [color.r, color.g, color.b, 255],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_mismatch() {
        let err = Frame::new(2, 2, PixelFormat::Rgba8, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::FrameSizeMismatch {
                expected: 16,
                actual: 15
            }
        ));
    }

    #[test]
    fn test_bgra_channel_order() {
        let frame = Frame::new(1, 1, PixelFormat::Bgra8, vec![10, 20, 30, 255]).unwrap();
        assert_eq!(frame.pixel(0, 0), Some(Color::new(30, 20, 10)));
    }

    #[test]
    fn test_rgba_channel_order() {
        let frame = Frame::new(1, 1, PixelFormat::Rgba8, vec![10, 20, 30, 255]).unwrap();
        assert_eq!(frame.pixel(0, 0), Some(Color::new(10, 20, 30)));
    }

    #[test]
    fn test_solid_frame() {
        let red = Color::new(255, 0, 0);
        let frame = Frame::solid(4, 3, PixelFormat::Bgra8, red);
        assert_eq!(frame.data().len(), 4 * 3 * 4);
        assert_eq!(frame.pixel(3, 2), Some(red));
        assert_eq!(frame.pixel(4, 0), None);
    }

    #[test]
    fn test_from_fn() {
        let frame = Frame::from_fn(2, 1, PixelFormat::Rgba8, |x, _| {
            if x == 0 {
                Color::BLACK
            } else {
                Color::WHITE
            }
        });
        assert_eq!(frame.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(frame.pixel(1, 0), Some(Color::WHITE));
    }
}
