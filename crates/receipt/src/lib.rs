//! Receipt overlay - fill form fields onto a pre-printed receipt template
//!
//! This crate provides:
//! - Field collection from a form view, with date formatting
//! - Position maps (field id to millimetre coordinate and font)
//! - Direct text rendering onto an A4 PDF page
//! - Rasterized overlay capture with scoped form restoration
//! - Export sinks, status notices and the export pipeline tying them together
//!
//! # Example
//!
//! ```ignore
//! use receipt::{ExportConfig, ExportPipeline, FileSink, FormView, NoticeBoard, PositionMap};
//!
//! let config = ExportConfig::from_json(config_json)?;
//! let mut pipeline = ExportPipeline::from_config(config, PositionMap::land_rent_receipt())?;
//! let mut view = FormView::from_json(form_json)?;
//!
//! let outcome = pipeline.run(&mut view, &mut FileSink::new("out"), &mut NoticeBoard::new());
//! ```

mod config;
mod export;
mod field;
mod font;
mod form;
mod notice;
mod overlay;
mod pipeline;
mod position;
mod raster;
pub mod render;

pub use config::{
    CaptureStrategy, ExportConfig, FontConfig, ImageOutputFormat, NoticeConfig, RasterOutput,
    RasterizeConfig, DEFAULT_DATE_FORMAT, DEFAULT_SELECTOR, MAX_RASTER_SCALE,
};
pub use export::{Artifact, ArtifactKind, ExportSink, FileSink, MemorySink};
pub use field::{collect_fields, display_value, format_date, FieldValues};
pub use font::EmbeddedFont;
pub use form::{Background, FormElement, FormView, InputKind, Rect, TextDuplicate, TextStyle};
pub use notice::{
    Notice, NoticeBoard, NoticeId, NoticeLevel, ProgressNotice, StatusSurface,
    ERROR_NOTICE_DURATION,
};
pub use overlay::OverlayGuard;
pub use pipeline::{ExportOutcome, ExportPipeline, ExportState};
pub use position::{FieldPosition, FontSpec, FontStyle, PageSpec, PositionMap, TextColor};
pub use raster::{RasterOptions, Rasterizer, SoftwareRasterizer, MAX_CANVAS_BYTES};
pub use render::{pages_needed, DirectTextRenderer, RasterOverlayRenderer};

use thiserror::Error;

/// Errors that can occur while collecting, rendering or exporting a receipt
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to load {0}")]
    LoadError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Export failed: {0}")]
    ExportError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("Rasterization failed: {0}")]
    RasterError(#[from] RasterError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<image::ImageError> for ReceiptError {
    fn from(err: image::ImageError) -> Self {
        ReceiptError::ImageError(err.to_string())
    }
}

/// Faults reported by a [`Rasterizer`]
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Tainted canvas: cross-origin image '{0}' loaded without CORS")]
    TaintedCanvas(String),

    #[error("No font loaded to draw text")]
    MissingFont,

    #[error("Invalid font: {0}")]
    InvalidFont(String),

    #[error("Failed to decode background image: {0}")]
    BackgroundDecode(String),

    #[error("Canvas has zero size ({0}x{1})")]
    EmptyCanvas(u32, u32),

    #[error("Canvas too large ({0}x{1} pixels)")]
    CanvasTooLarge(f64, f64),
}

/// Result type for receipt operations
pub type Result<T> = std::result::Result<T, ReceiptError>;
