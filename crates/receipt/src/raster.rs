//! Rasterization of a form view

use crate::font::EmbeddedFont;
use crate::form::{FormView, Rect, TextStyle};
use crate::RasterError;
use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::debug;

/// Options passed to a [`Rasterizer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Device pixels per CSS pixel
    pub scale: f32,
    /// Cross-origin images are requested with CORS
    pub use_cors: bool,
    /// Leave uncovered pixels transparent instead of white
    pub transparent_background: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            use_cors: true,
            transparent_background: false,
        }
    }
}

/// Renders a form view into pixels
pub trait Rasterizer {
    fn rasterize(&self, view: &FormView, options: &RasterOptions) -> Result<RgbaImage, RasterError>;
}

/// Largest canvas accepted, in bytes of RGBA samples
pub const MAX_CANVAS_BYTES: u64 = 1 << 30;

/// Rasterizer drawing the background with `image` and text with `imageproc`
#[derive(Default)]
pub struct SoftwareRasterizer {
    regular: Option<FontVec>,
    bold: Option<FontVec>,
}

impl SoftwareRasterizer {
    /// Rasterizer without fonts; fails on views that show any text
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: &EmbeddedFont) -> Result<Self, RasterError> {
        let parse = |bytes: &Vec<u8>| {
            FontVec::try_from_vec(bytes.clone()).map_err(|e| RasterError::InvalidFont(e.to_string()))
        };

        Ok(Self {
            regular: Some(parse(&font.regular)?),
            bold: font.bold.as_ref().map(parse).transpose()?,
        })
    }

    fn font(&self, bold: bool) -> Option<&FontVec> {
        if bold {
            self.bold.as_ref().or(self.regular.as_ref())
        } else {
            self.regular.as_ref()
        }
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, view: &FormView, options: &RasterOptions) -> Result<RgbaImage, RasterError> {
        let (width, height) = canvas_size(view, options.scale)?;

        let fill = if options.transparent_background {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([255, 255, 255, 255])
        };
        let mut canvas = RgbaImage::from_pixel(width, height, fill);

        if let Some(background) = view.background.as_ref().filter(|b| b.visible) {
            if background.cross_origin && !options.use_cors {
                return Err(RasterError::TaintedCanvas(background.source.clone()));
            }
            match &background.image {
                Some(bytes) => {
                    let decoded = image::load_from_memory(bytes)
                        .map_err(|e| RasterError::BackgroundDecode(e.to_string()))?;
                    let resized = imageops::resize(
                        &decoded.to_rgba8(),
                        width,
                        height,
                        imageops::FilterType::Triangle,
                    );
                    imageops::overlay(&mut canvas, &resized, 0, 0);
                }
                None => debug!(source = %background.source, "background not loaded, skipped"),
            }
        }

        let texts = view
            .elements
            .iter()
            .filter(|e| e.visible)
            .map(|e| (e.rect, e.style, e.value.as_str()))
            .chain(
                view.duplicates()
                    .iter()
                    .map(|d| (d.rect, d.style, d.text.as_str())),
            )
            .filter(|(_, _, text)| !text.is_empty());

        for (rect, style, text) in texts {
            let font = self.font(style.bold).ok_or(RasterError::MissingFont)?;
            draw_text(&mut canvas, font, text, rect, style, options.scale);
        }

        Ok(canvas)
    }
}

/// Pixel size of the canvas for `view` at `scale`
fn canvas_size(view: &FormView, scale: f32) -> Result<(u32, u32), RasterError> {
    let width = (view.width as f64 * scale as f64).round();
    let height = (view.height as f64 * scale as f64).round();
    let too_large = || RasterError::CanvasTooLarge(width, height);

    if !(width.is_finite() && height.is_finite()) {
        return Err(too_large());
    }
    if width < 1.0 || height < 1.0 {
        return Err(RasterError::EmptyCanvas(width.max(0.0) as u32, height.max(0.0) as u32));
    }
    if width > u32::MAX as f64 || height > u32::MAX as f64 {
        return Err(too_large());
    }

    let (w, h) = (width as u32, height as u32);
    match (w as u64).checked_mul(h as u64).and_then(|px| px.checked_mul(4)) {
        Some(bytes) if bytes <= MAX_CANVAS_BYTES => Ok((w, h)),
        _ => Err(too_large()),
    }
}

/// Draw one line of text vertically centred in `rect`, starting at its left edge
fn draw_text(
    canvas: &mut RgbaImage,
    font: &FontVec,
    text: &str,
    rect: Rect,
    style: TextStyle,
    scale: f32,
) {
    let px_scale = PxScale::from(style.font_size * scale);
    let scaled = font.as_scaled(px_scale);
    let line_height = scaled.ascent() - scaled.descent();
    let top = rect.y * scale + (rect.height * scale - line_height) / 2.0;

    let [r, g, b] = style.color;
    draw_text_mut(
        canvas,
        Rgba([r, g, b, 255]),
        (rect.x * scale).round() as i32,
        top.round() as i32,
        px_scale,
        font,
        text,
    );
}
