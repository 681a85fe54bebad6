//! Embedded font family shared by the PDF writer and the rasterizer

use crate::config::FontConfig;
use crate::{ReceiptError, Result};
use pdf_core::FontFamilyBuilder;

/// TrueType bytes of one font family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFont {
    pub family: String,
    pub regular: Vec<u8>,
    pub bold: Option<Vec<u8>>,
}

impl EmbeddedFont {
    pub fn new(family: &str, regular: Vec<u8>) -> Self {
        Self {
            family: family.to_string(),
            regular,
            bold: None,
        }
    }

    pub fn with_bold(mut self, bold: Vec<u8>) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Read the family's files
    pub fn load(config: &FontConfig) -> Result<Self> {
        let read = |path: &std::path::Path| {
            std::fs::read(path).map_err(|e| {
                ReceiptError::LoadError(format!("font {}: {}", path.display(), e))
            })
        };

        let mut font = Self::new(&config.family, read(&config.regular)?);
        if let Some(bold) = &config.bold {
            font = font.with_bold(read(bold)?);
        }
        Ok(font)
    }

    /// Builder registering this family on a PDF document
    pub fn family_builder(&self) -> FontFamilyBuilder {
        let builder = FontFamilyBuilder::new().regular(self.regular.clone());
        match &self.bold {
            Some(bold) => builder.bold(bold.clone()),
            None => builder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_missing_file() {
        let config = FontConfig {
            family: "sarabun".to_string(),
            regular: PathBuf::from("/nonexistent/Sarabun-Regular.ttf"),
            bold: None,
        };

        match EmbeddedFont::load(&config) {
            Err(ReceiptError::LoadError(msg)) => assert!(msg.contains("Sarabun-Regular.ttf")),
            other => panic!("expected LoadError, got {other:?}"),
        }
    }

    #[test]
    fn test_load_regular_and_bold() {
        let fonts = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fonts");
        let config = FontConfig {
            family: "dejavu".to_string(),
            regular: fonts.join("DejaVuSans.ttf"),
            bold: Some(fonts.join("DejaVuSans-Bold.ttf")),
        };

        let font = EmbeddedFont::load(&config).unwrap();
        assert_eq!(font.family, "dejavu");
        assert!(font.bold.is_some());

        let mut doc = pdf_core::PdfDocument::new(pdf_core::PageSize::A4);
        doc.register_font_family(&font.family, font.family_builder())
            .unwrap();
        assert!(doc.has_font_family("dejavu"));
    }

    #[test]
    fn test_family_builder_rejects_garbage() {
        let font = EmbeddedFont::new("broken", vec![0, 1, 2, 3]);
        let mut doc = pdf_core::PdfDocument::new(pdf_core::PageSize::A4);
        assert!(doc
            .register_font_family(&font.family, font.family_builder())
            .is_err());
    }
}
