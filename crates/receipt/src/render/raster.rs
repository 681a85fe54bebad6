//! Rasterized overlay capture and raster export

use crate::config::ImageOutputFormat;
use crate::form::FormView;
use crate::overlay::OverlayGuard;
use crate::raster::{RasterOptions, Rasterizer};
use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use pdf_core::{ImageScaleMode, PageSize, PdfDocument};
use std::io::Cursor;
use tracing::{debug, warn};

/// Captures the form with overlay inputs swapped for text duplicates
pub struct RasterOverlayRenderer<'a> {
    rasterizer: &'a dyn Rasterizer,
    options: RasterOptions,
    selector: &'a str,
    date_format: &'a str,
    hide_background: bool,
}

impl<'a> RasterOverlayRenderer<'a> {
    pub fn new(rasterizer: &'a dyn Rasterizer, selector: &'a str, date_format: &'a str) -> Self {
        Self {
            rasterizer,
            options: RasterOptions::default(),
            selector,
            date_format,
            hide_background: false,
        }
    }

    pub fn with_options(mut self, options: RasterOptions) -> Self {
        self.options = options;
        self
    }

    /// Leave the background out of the capture
    pub fn hide_background(mut self, hide: bool) -> Self {
        self.hide_background = hide;
        self
    }

    /// Rasterize the view; it is restored before this returns, whatever the result
    pub fn capture(&self, view: &mut FormView) -> Result<RgbaImage> {
        let guard = OverlayGuard::acquire(view, self.selector, self.date_format, self.hide_background);
        let raster = self.rasterizer.rasterize(&guard, &self.options)?;
        debug!(
            width = raster.width(),
            height = raster.height(),
            scale = self.options.scale,
            "form rasterized"
        );
        Ok(raster)
    }
}

/// Encode a raster for direct download
pub fn encode_raster(raster: &RgbaImage, format: ImageOutputFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        ImageOutputFormat::Png => {
            raster.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        }
        ImageOutputFormat::Jpeg { quality } => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)?;
        }
    }
    Ok(bytes)
}

/// Pages needed for content of `content_height` at a page height of `page_height`
pub fn pages_needed(content_height: f64, page_height: f64) -> usize {
    if content_height <= 0.0 || page_height <= 0.0 {
        return 1;
    }
    // Tolerance keeps float noise from adding an empty page
    ((content_height / page_height) - 1e-6).ceil().max(1.0) as usize
}

/// Place a raster on pages of `page` size, scaled to the page width
///
/// `background`, when given and decodable, is drawn first on page 1, fitted to
/// the page width. Content taller than one page continues on further pages,
/// each showing the next slice of the same image.
pub fn raster_to_pdf(
    raster: &RgbaImage,
    page: PageSize,
    background: Option<&[u8]>,
) -> Result<PdfDocument> {
    let mut doc = PdfDocument::new(page);

    if let Some(bytes) = background {
        if let Err(e) =
            doc.insert_image_scaled(bytes, 1, 0.0, 0.0, page.width, 0.0, ImageScaleMode::FitWidth)
        {
            warn!(error = %e, "background unusable, composing without it");
        }
    }

    let mut png = Vec::new();
    raster.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

    let content_height = page.width * raster.height() as f64 / raster.width() as f64;
    let pages = pages_needed(content_height, page.height);

    for k in 0..pages {
        let number = if k == 0 { 1 } else { doc.add_page() };
        let offset = -(k as f64) * page.height;
        doc.insert_image(&png, number, 0.0, offset, page.width, content_height)?;
    }
    debug!(pages, content_height, "raster placed");

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormElement, InputKind, Rect};
    use crate::RasterError;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    const CLASS: &str = "form-input-overlay";

    /// Records what it saw and returns a fixed raster
    struct RecordingRasterizer {
        duplicates_seen: Cell<usize>,
        fail: bool,
    }

    impl Rasterizer for RecordingRasterizer {
        fn rasterize(&self, view: &FormView, _: &RasterOptions) -> std::result::Result<RgbaImage, RasterError> {
            self.duplicates_seen.set(view.duplicates().len());
            if self.fail {
                return Err(RasterError::TaintedCanvas("bg.png".into()));
            }
            Ok(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])))
        }
    }

    fn view() -> FormView {
        let mut view = FormView::new(100, 100);
        view.push(
            FormElement::new("ownerName", InputKind::Text, Rect::new(0.0, 0.0, 50.0, 10.0))
                .with_class(CLASS)
                .with_value("Ramesh"),
        );
        view
    }

    #[test]
    fn test_capture_sees_duplicates_and_restores() {
        let recorder = RecordingRasterizer {
            duplicates_seen: Cell::new(0),
            fail: false,
        };
        let mut view = view();

        let raster = RasterOverlayRenderer::new(&recorder, CLASS, "%d/%m/%Y")
            .capture(&mut view)
            .unwrap();

        assert_eq!(raster.dimensions(), (4, 4));
        assert_eq!(recorder.duplicates_seen.get(), 1);
        assert!(view.is_pristine());
    }

    #[test]
    fn test_capture_failure_restores() {
        let recorder = RecordingRasterizer {
            duplicates_seen: Cell::new(0),
            fail: true,
        };
        let mut view = view();

        let result = RasterOverlayRenderer::new(&recorder, CLASS, "%d/%m/%Y").capture(&mut view);

        assert!(result.is_err());
        assert_eq!(recorder.duplicates_seen.get(), 1);
        assert!(view.is_pristine());
    }

    #[test]
    fn test_pages_needed() {
        assert_eq!(pages_needed(100.0, 842.0), 1);
        assert_eq!(pages_needed(842.0, 842.0), 1);
        assert_eq!(pages_needed(842.5, 842.0), 2);
        assert_eq!(pages_needed(3.0 * 842.0, 842.0), 3);
        assert_eq!(pages_needed(0.0, 842.0), 1);
    }

    #[test]
    fn test_encode_png_and_jpeg() {
        let raster = RgbaImage::from_pixel(8, 4, Rgba([200, 10, 10, 128]));

        let png = encode_raster(&raster, ImageOutputFormat::Png).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 128);

        let jpeg = encode_raster(&raster, ImageOutputFormat::Jpeg { quality: 90 }).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn test_raster_to_pdf_single_page() {
        let raster = RgbaImage::from_pixel(210, 297, Rgba([255, 255, 255, 255]));
        let doc = raster_to_pdf(&raster, PageSize::A4, None).unwrap();
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_raster_to_pdf_paginates() {
        // 2.5 pages tall at page width
        let raster = RgbaImage::from_pixel(210, 742, Rgba([0, 0, 0, 255]));
        let doc = raster_to_pdf(&raster, PageSize::A4, None).unwrap();
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn test_undecodable_background_still_exports() {
        let raster = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let doc = raster_to_pdf(&raster, PageSize::A4, Some(b"garbage")).unwrap();
        assert_eq!(doc.page_count(), 1);
    }
}
