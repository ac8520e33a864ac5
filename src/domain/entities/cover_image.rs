//! Domain types for cover images.

use std::sync::Arc;

use reqwest::Url;

/// Cache key for a cover image: the normalized absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey(Url);

impl ImageKey {
    /// Parses and normalizes a URL string.
    ///
    /// Returns `None` for relative or otherwise unparsable input.
    #[must_use]
    pub fn parse(url: &str) -> Option<Self> {
        Url::parse(url.trim()).ok().map(Self)
    }

    /// Normalized URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.0
    }

    /// URL as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ImageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decoded cover ready for display.
///
/// Cloning is cheap; pixel data is shared.
#[derive(Debug, Clone)]
pub struct CoverImage {
    pixels: Arc<image::DynamicImage>,
    scale: f32,
}

impl CoverImage {
    /// Wraps decoded pixels meant to be drawn at `scale`.
    #[must_use]
    pub fn new(pixels: image::DynamicImage, scale: f32) -> Self {
        Self {
            pixels: Arc::new(pixels),
            scale,
        }
    }

    /// Shared decoded pixels.
    #[must_use]
    pub fn pixels(&self) -> &Arc<image::DynamicImage> {
        &self.pixels
    }

    /// Display scale requested when the image was decoded.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Pixel width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Pixel height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Size on screen after applying the display scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn display_size(&self) -> (u32, u32) {
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        };
        (
            (self.width() as f32 * scale).round() as u32,
            (self.height() as f32 * scale).round() as u32,
        )
    }

    /// Approximate memory footprint in bytes of the decoded pixel buffer.
    #[must_use]
    pub fn cost(&self) -> usize {
        self.pixels.as_bytes().len()
    }

    /// Returns true if both handles share the same pixel buffer.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

/// Desired on-screen size of a cover slot, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSize {
    /// Slot width in points.
    pub width: f32,
    /// Slot height in points.
    pub height: f32,
}

impl TargetSize {
    /// Slot of `width` by `height` points.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Scale that maps a source of `source_height` pixels onto this slot.
    /// Unknown or zero heights fall back to a divisor of 1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scale_for(&self, source_height: Option<u32>) -> f32 {
        let divisor = source_height.filter(|h| *h > 0).unwrap_or(1);
        self.height / divisor as f32
    }
}
