//! Overlay renderers

mod direct;
mod raster;

pub use direct::DirectTextRenderer;
pub use raster::{encode_raster, pages_needed, raster_to_pdf, RasterOverlayRenderer};
