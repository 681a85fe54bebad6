//! Export configuration

use crate::export::ArtifactKind;
use crate::raster::RasterOptions;
use crate::{ReceiptError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Class name marking overlay inputs
pub const DEFAULT_SELECTOR: &str = "form-input-overlay";

/// Day/month/year
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Upper bound on the rasterization scale
pub const MAX_RASTER_SCALE: f32 = 8.0;

/// Encoding of a directly downloaded raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageOutputFormat {
    Png,
    Jpeg { quality: u8 },
}

/// What happens to the captured raster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RasterOutput {
    /// Download the raster itself
    Image { format: ImageOutputFormat },
    /// Embed the raster in an A4 PDF
    Pdf {
        /// Draw the configured background under the raster
        #[serde(default, rename = "compositeBackground")]
        composite_background: bool,
    },
}

impl Default for RasterOutput {
    fn default() -> Self {
        RasterOutput::Pdf {
            composite_background: false,
        }
    }
}

/// Settings of the rasterized overlay strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RasterizeConfig {
    pub scale: f32,
    pub use_cors: bool,
    pub transparent_background: bool,
    pub hide_background: bool,
    pub output: RasterOutput,
}

impl Default for RasterizeConfig {
    fn default() -> Self {
        let options = RasterOptions::default();
        Self {
            scale: options.scale,
            use_cors: options.use_cors,
            transparent_background: options.transparent_background,
            hide_background: false,
            output: RasterOutput::default(),
        }
    }
}

impl RasterizeConfig {
    pub fn options(&self) -> RasterOptions {
        RasterOptions {
            scale: self.scale,
            use_cors: self.use_cors,
            transparent_background: self.transparent_background,
        }
    }
}

/// How field values reach the output
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CaptureStrategy {
    /// Draw text onto a PDF page over the template raster
    #[default]
    DirectText,
    /// Rasterize the form with overlay duplicates
    Rasterize(RasterizeConfig),
}

/// Notice texts and timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoticeConfig {
    pub progress_message: String,
    pub error_message: String,
    pub error_dismiss_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            progress_message: "Generating your PDF...".to_string(),
            error_message: "Failed to generate PDF. Please try again.".to_string(),
            error_dismiss_ms: 3000,
        }
    }
}

/// One embedded TrueType family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    pub family: String,
    pub regular: PathBuf,
    #[serde(default)]
    pub bold: Option<PathBuf>,
}

/// Complete configuration of an export pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Name of the downloaded file
    pub filename: String,
    /// Class name of the overlay inputs
    pub selector: String,
    /// chrono format for date inputs
    pub date_format: String,
    pub strategy: CaptureStrategy,
    pub notices: NoticeConfig,
    /// Template raster drawn under direct text
    pub template_path: Option<PathBuf>,
    /// Background composited under a rasterized PDF, or loaded into the form view
    pub background_path: Option<PathBuf>,
    pub font: Option<FontConfig>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: "receipt.pdf".to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            strategy: CaptureStrategy::default(),
            notices: NoticeConfig::default(),
            template_path: None,
            background_path: None,
            font: None,
        }
    }
}

impl ExportConfig {
    /// Parse and validate a configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Land rent receipt: direct text over `recipet-min.png`, saved as `keerai.pdf`
    pub fn land_rent() -> Self {
        Self {
            filename: "keerai.pdf".to_string(),
            template_path: Some(PathBuf::from("recipet-min.png")),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(ReceiptError::ConfigError("filename is empty".to_string()));
        }
        if self.selector.trim().is_empty() {
            return Err(ReceiptError::ConfigError("selector is empty".to_string()));
        }
        if let CaptureStrategy::Rasterize(raster) = &self.strategy {
            if !(raster.scale > 0.0 && raster.scale <= MAX_RASTER_SCALE) {
                return Err(ReceiptError::ConfigError(format!(
                    "scale must be in (0, {MAX_RASTER_SCALE}], got {}",
                    raster.scale
                )));
            }
            if let RasterOutput::Image {
                format: ImageOutputFormat::Jpeg { quality },
            } = raster.output
            {
                if !(1..=100).contains(&quality) {
                    return Err(ReceiptError::ConfigError(format!(
                        "JPEG quality must be 1-100, got {quality}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Kind of file this configuration produces
    pub fn artifact_kind(&self) -> ArtifactKind {
        match &self.strategy {
            CaptureStrategy::DirectText => ArtifactKind::Pdf,
            CaptureStrategy::Rasterize(raster) => match raster.output {
                RasterOutput::Pdf { .. } => ArtifactKind::Pdf,
                RasterOutput::Image {
                    format: ImageOutputFormat::Png,
                } => ArtifactKind::Png,
                RasterOutput::Image {
                    format: ImageOutputFormat::Jpeg { .. },
                } => ArtifactKind::Jpeg,
            },
        }
    }
}
