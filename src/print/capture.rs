//! Rasterizing card markup.
//!
//! Capture is the one step that turns vector markup into pixels. It is behind
//! the [`FaceRasterizer`] trait so composition can be exercised without a
//! renderer, and so a failed capture is an ordinary value the compositor can
//! skip. Background transparency is a capture option, never a change to the
//! markup being captured.

use crate::card::Markup;
use resvg::{tiny_skia, usvg};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("markup could not be parsed: {0}")]
    Parse(String),
    #[error("capture produced an empty {width}x{height} raster")]
    EmptyRaster { width: u32, height: u32 },
    #[error("raster data has {actual} bytes, expected {expected}")]
    BadLength { expected: usize, actual: usize },
}

/// An 8-bit RGBA raster with straight (non-premultiplied) alpha.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<RasterImage, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptyRaster { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CaptureError::BadLength {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(RasterImage {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Split into packed RGB and alpha planes.
    pub fn split_alpha(&self) -> (Vec<u8>, Vec<u8>) {
        let pixels = self.rgba.len() / 4;
        let mut rgb = Vec::with_capacity(pixels * 3);
        let mut alpha = Vec::with_capacity(pixels);
        for px in self.rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        (rgb, alpha)
    }

    pub fn is_opaque(&self) -> bool {
        self.rgba.chunks_exact(4).all(|px| px[3] == 255)
    }
}

/// Capture-time options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Output pixels per markup unit
    pub pixel_density: f32,
    /// Size of the captured area in markup units
    pub exact_width: u32,
    pub exact_height: u32,
    /// Leave uncovered pixels transparent instead of white
    pub transparent_background: bool,
}

impl CaptureOptions {
    pub fn for_markup(markup: &Markup, pixel_density: f32) -> CaptureOptions {
        CaptureOptions {
            pixel_density,
            exact_width: markup.width,
            exact_height: markup.height,
            transparent_background: true,
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.exact_width as f32 * self.pixel_density).round() as u32,
            (self.exact_height as f32 * self.pixel_density).round() as u32,
        )
    }
}

pub trait FaceRasterizer {
    fn capture(&self, markup: &Markup, options: &CaptureOptions)
        -> Result<RasterImage, CaptureError>;
}

/// Rasterizes SVG markup with `resvg`, using the system's fonts.
pub struct SvgRasterizer {
    options: usvg::Options<'static>,
}

impl SvgRasterizer {
    pub fn new() -> SvgRasterizer {
        let mut options = usvg::Options {
            resources_dir: std::env::current_dir().ok(),
            ..usvg::Options::default()
        };
        options.fontdb_mut().load_system_fonts();
        log::debug!("loaded {} font faces", options.fontdb.len());
        SvgRasterizer { options }
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        SvgRasterizer::new()
    }
}

impl FaceRasterizer for SvgRasterizer {
    fn capture(
        &self,
        markup: &Markup,
        options: &CaptureOptions,
    ) -> Result<RasterImage, CaptureError> {
        let tree = usvg::Tree::from_str(&markup.svg, &self.options)
            .map_err(|e| CaptureError::Parse(e.to_string()))?;

        let (width, height) = options.pixel_size();
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(CaptureError::EmptyRaster { width, height })?;
        if !options.transparent_background {
            pixmap.fill(tiny_skia::Color::WHITE);
        }

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let rgba = pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RasterImage::new(width, height, rgba)
    }
}
