//! Direct text rendering: field values drawn onto a PDF page

use crate::field::FieldValues;
use crate::font::EmbeddedFont;
use crate::position::{FontSpec, PositionMap};
use crate::Result;
use pdf_core::{mm_to_pt, PdfDocument};
use tracing::{debug, warn};

/// Draws every mapped field onto one page over the template raster
pub struct DirectTextRenderer<'a> {
    positions: &'a PositionMap,
    font: Option<&'a EmbeddedFont>,
}

impl<'a> DirectTextRenderer<'a> {
    pub fn new(positions: &'a PositionMap) -> Self {
        Self {
            positions,
            font: None,
        }
    }

    /// Register an embedded family, usable by name in the position map
    pub fn with_font(mut self, font: Option<&'a EmbeddedFont>) -> Self {
        self.font = font;
        self
    }

    /// Render the page
    ///
    /// A template that is missing or fails to decode is logged and the page is
    /// produced without background. Fields with an empty value draw nothing.
    pub fn render(&self, template: Option<&[u8]>, values: &FieldValues) -> Result<PdfDocument> {
        let page = self.positions.page_size();
        let mut doc = PdfDocument::new(page);

        if let Some(font) = self.font {
            doc.register_font_family(&font.family, font.family_builder())?;
        }

        match template {
            Some(bytes) => {
                if let Err(e) = doc.insert_image(bytes, 1, 0.0, 0.0, page.width, page.height) {
                    warn!(error = %e, "template raster unusable, rendering without background");
                }
            }
            None => warn!("template raster not loaded, rendering without background"),
        }

        for field in &self.positions.fields {
            let text = values.get(&field.id);
            if text.is_empty() {
                continue;
            }

            apply_font(&mut doc, self.positions.font_for(field))?;
            doc.insert_text(text, 1, mm_to_pt(field.x), mm_to_pt(field.y))?;
            debug!(field = %field.id, x_mm = field.x, y_mm = field.y, "field drawn");
        }

        Ok(doc)
    }
}

fn apply_font(doc: &mut PdfDocument, font: &FontSpec) -> Result<()> {
    let (weight, style) = font.style.to_pdf();
    doc.set_font(&font.family, font.size)?;
    doc.set_font_weight(weight)?;
    doc.set_font_style(style)?;
    doc.set_text_color(font.color.into());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{FieldPosition, FontStyle};
    use crate::ReceiptError;
    use pretty_assertions::assert_eq;

    fn content(doc: PdfDocument) -> String {
        let bytes = doc.into_bytes().unwrap();
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        let page_id = parsed.get_pages()[&1];
        String::from_utf8(parsed.get_page_content(page_id).unwrap()).unwrap()
    }

    #[test]
    fn test_render_skips_empty_values() {
        let map = PositionMap::land_rent_receipt();
        let values: FieldValues = [("ownerName", "Ramesh"), ("village", "")]
            .into_iter()
            .collect();

        let text = content(DirectTextRenderer::new(&map).render(None, &values).unwrap());

        assert!(text.contains("(Ramesh) Tj"));
        assert_eq!(text.matches(" Tj").count(), 1);
    }

    #[test]
    fn test_per_field_font() {
        let map = PositionMap {
            fields: vec![
                FieldPosition::new("name", 20.0, 60.0),
                FieldPosition::new("total", 150.0, 240.0)
                    .with_font(FontSpec::new("times", 16.0, FontStyle::Bold)),
            ],
            ..Default::default()
        };
        let values: FieldValues = [("name", "A"), ("total", "1,500")].into_iter().collect();

        let text = content(DirectTextRenderer::new(&map).render(None, &values).unwrap());

        assert!(text.contains("/F1 12 Tf"));
        assert!(text.contains("/F2 16 Tf"));
    }

    #[test]
    fn test_unknown_font_family_is_an_error() {
        let map = PositionMap {
            font: FontSpec::new("sarabun", 12.0, FontStyle::Regular),
            fields: vec![FieldPosition::new("name", 20.0, 60.0)],
            ..Default::default()
        };
        let values: FieldValues = [("name", "A")].into_iter().collect();

        let result = DirectTextRenderer::new(&map).render(None, &values);
        assert!(matches!(result, Err(ReceiptError::PdfError(_))));
    }

    #[test]
    fn test_embedded_font_draws_glyph_ids() {
        let fonts = concat!(env!("CARGO_MANIFEST_DIR"), "/../../fonts");
        let font = EmbeddedFont::new("dejavu", std::fs::read(format!("{fonts}/DejaVuSans.ttf")).unwrap())
            .with_bold(std::fs::read(format!("{fonts}/DejaVuSans-Bold.ttf")).unwrap());
        let map = PositionMap {
            font: FontSpec::new("dejavu", 12.0, FontStyle::Bold),
            fields: vec![FieldPosition::new("ownerName", 95.0, 95.5)],
            ..Default::default()
        };
        let values: FieldValues = [("ownerName", "Ramesh")].into_iter().collect();

        let doc = DirectTextRenderer::new(&map)
            .with_font(Some(&font))
            .render(None, &values)
            .unwrap();
        let bytes = doc.into_bytes().unwrap();

        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        let base_fonts: Vec<&[u8]> = parsed
            .objects
            .values()
            .filter_map(|obj| obj.as_dict().ok())
            .filter(|d| d.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(&b"Type0"[..]))
            .filter_map(|d| d.get(b"BaseFont").and_then(|v| v.as_name()).ok())
            .collect();
        assert_eq!(base_fonts, vec![&b"dejavu-bold"[..]]);

        let page_id = parsed.get_pages()[&1];
        let text = String::from_utf8(parsed.get_page_content(page_id).unwrap()).unwrap();
        assert!(text.contains("/F1 12 Tf"));
        assert!(!text.contains("(Ramesh)"));
        // Six glyph ids in an Identity-H hex string
        let start = text.find('<').unwrap();
        let end = text.find("> Tj").unwrap();
        assert_eq!(end - start - 1, 24);
    }

    #[test]
    fn test_undecodable_template_degrades() {
        let map = PositionMap::land_rent_receipt();
        let values: FieldValues = [("Number", "7")].into_iter().collect();

        let doc = DirectTextRenderer::new(&map)
            .render(Some(b"<html>404</html>"), &values)
            .unwrap();
        let text = content(doc);

        assert!(!text.contains(" Do"));
        assert!(text.contains("(7) Tj"));
    }
}
