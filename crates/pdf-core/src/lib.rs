//! PDF Core - Low-level PDF authoring
//!
//! This crate provides functionality for:
//! - Creating documents with fixed-size pages (A4 by default)
//! - Placing raster images (JPEG, PNG with alpha) at physical coordinates
//! - Drawing text runs with the standard PDF fonts or an embedded TrueType family
//! - Appending pages and serializing the result
//!
//! All coordinates are in points, measured from the top-left corner of the page.
//! Use [`mm_to_pt`] to convert from millimetres.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{mm_to_pt, FontWeight, PageSize, PdfDocument};
//!
//! let mut doc = PdfDocument::new(PageSize::A4);
//! doc.insert_image(&background_png, 1, 0.0, 0.0, doc.page_size().width, doc.page_size().height)?;
//! doc.set_font("helvetica", 12.0)?;
//! doc.set_font_weight(FontWeight::Bold)?;
//! doc.insert_text("Hello, World!", 1, mm_to_pt(95.0), mm_to_pt(83.0))?;
//! let bytes = doc.into_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod page;
mod text;

pub use document::{Color, PdfDocument};
pub use font::{FontData, FontFamily, FontFamilyBuilder, FontStyle, FontWeight, StandardFont};
pub use image::{calculate_scaled_dimensions, ImageScaleMode};
pub use page::{mm_to_pt, pt_to_mm, PageSize};
pub use text::{encode_literal, generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF structure error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;
