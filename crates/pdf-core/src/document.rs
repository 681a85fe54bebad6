//! PDF Document builder

use crate::font::FontData;
use crate::image::{calculate_scaled_dimensions, generate_image_operators, ImageXObject};
use crate::text::{encode_literal, generate_text_operators, TextRenderContext};
use crate::{
    FontFamily, FontFamilyBuilder, FontStyle, FontWeight, ImageScaleMode, PageSize, PdfError,
    Result, StandardFont,
};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// A registered font family
enum FontSource {
    Standard(StandardFont),
    Embedded(FontFamily),
}

/// A concrete font variant that ends up as one PDF font object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ResolvedFont {
    /// Standard font by PostScript name
    Standard(&'static str),
    /// Embedded TrueType variant
    Embedded { family: String, variant: String },
}

/// An image XObject already added to the document
#[derive(Debug, Clone)]
struct EmbeddedImage {
    resource_name: String,
    object_id: ObjectId,
    width: u32,
    height: u32,
}

/// Content and resources of one page, written out at save time
#[derive(Debug, Default)]
struct PageState {
    content: Vec<u8>,
    fonts: BTreeSet<ResolvedFont>,
    images: BTreeMap<String, ObjectId>,
}

/// PDF document under construction
///
/// Pages share one physical size. Content is buffered per page and written
/// when the document is serialized with [`PdfDocument::into_bytes`] or
/// [`PdfDocument::save`], so the output only depends on the sequence of calls.
pub struct PdfDocument {
    inner: Document,
    page_size: PageSize,
    /// Reserved ID of the page tree root
    pages_id: ObjectId,
    pages: Vec<PageState>,
    families: BTreeMap<String, FontSource>,
    current_family: Option<String>,
    current_weight: FontWeight,
    current_style: FontStyle,
    current_font_size: f32,
    current_text_color: Color,
    /// Resource name of every font variant used so far ("F1", "F2", ...)
    font_resources: BTreeMap<ResolvedFont, String>,
    /// Embedded images keyed by a hash of their source bytes
    images: BTreeMap<u64, EmbeddedImage>,
}

impl PdfDocument {
    /// Create a document with one blank page
    ///
    /// The standard families `helvetica`, `times` and `courier` are registered.
    pub fn new(page_size: PageSize) -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();
        let catalog_id = inner.add_object(Dictionary::from_iter(vec![
            ("Type", Object::from("Catalog")),
            ("Pages", Object::Reference(pages_id)),
        ]));
        inner.trailer.set("Root", Object::Reference(catalog_id));

        let families = StandardFont::ALL
            .iter()
            .map(|(name, font)| (name.to_string(), FontSource::Standard(*font)))
            .collect();

        Self {
            inner,
            page_size,
            pages_id,
            pages: vec![PageState::default()],
            families,
            current_family: None,
            current_weight: FontWeight::default(),
            current_style: FontStyle::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_resources: BTreeMap::new(),
            images: BTreeMap::new(),
        }
    }

    /// Physical size shared by every page
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a blank page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self) -> usize {
        self.pages.push(PageState::default());
        self.pages.len()
    }

    /// Register a TrueType font family with its variants
    ///
    /// # Example
    /// ```ignore
    /// doc.register_font_family("noto",
    ///     FontFamilyBuilder::new()
    ///         .regular(std::fs::read("NotoSans-Regular.ttf")?)
    ///         .bold(std::fs::read("NotoSans-Bold.ttf")?)
    /// )?;
    /// ```
    pub fn register_font_family(&mut self, name: &str, builder: FontFamilyBuilder) -> Result<()> {
        if self.families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        let family = builder.build(name)?;
        self.families
            .insert(name.to_string(), FontSource::Embedded(family));
        Ok(())
    }

    /// Check whether a family name is registered
    pub fn has_font_family(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    /// Set the current font family and size
    ///
    /// Weight and style are kept; set them with [`set_font_weight`](Self::set_font_weight)
    /// and [`set_font_style`](Self::set_font_style).
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;
        Ok(())
    }

    /// Set only the font size (keeps current family/weight/style)
    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        self.require_family()?;
        self.current_font_size = size;
        Ok(())
    }

    /// Set the font weight (keeps current family/size/style)
    pub fn set_font_weight(&mut self, weight: FontWeight) -> Result<()> {
        self.require_family()?;
        self.current_weight = weight;
        Ok(())
    }

    /// Set the font style (keeps current family/size/weight)
    pub fn set_font_style(&mut self, style: FontStyle) -> Result<()> {
        self.require_family()?;
        self.current_style = style;
        Ok(())
    }

    /// Set the text color for subsequent text
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    fn require_family(&self) -> Result<&str> {
        self.current_family
            .as_deref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(())
    }

    /// Resolve the current family, weight and style to one font variant
    fn resolve_current_font(&self) -> Result<ResolvedFont> {
        let family_name = self.require_family()?;
        match self.families.get(family_name) {
            Some(FontSource::Standard(font)) => Ok(ResolvedFont::Standard(
                font.base_font(self.current_weight, self.current_style),
            )),
            Some(FontSource::Embedded(family)) => Ok(ResolvedFont::Embedded {
                family: family_name.to_string(),
                variant: family
                    .get_variant(self.current_weight, self.current_style)
                    .name
                    .clone(),
            }),
            None => Err(PdfError::FontNotFound(family_name.to_string())),
        }
    }

    fn embedded_variant_mut(&mut self, family: &str, variant: &str) -> Result<&mut FontData> {
        match self.families.get_mut(family) {
            Some(FontSource::Embedded(f)) => f
                .variant_by_name_mut(variant)
                .ok_or_else(|| PdfError::FontNotFound(variant.to_string())),
            _ => Err(PdfError::FontNotFound(family.to_string())),
        }
    }

    /// Insert text with its baseline at a position
    ///
    /// # Arguments
    /// * `text` - Text to insert (empty text draws nothing)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Baseline Y coordinate in points (from top)
    pub fn insert_text(&mut self, text: &str, page: usize, x: f64, y: f64) -> Result<()> {
        self.check_page(page)?;
        if text.is_empty() {
            return Ok(());
        }

        let font = self.resolve_current_font()?;
        let encoded = match &font {
            ResolvedFont::Standard(_) => encode_literal(text),
            ResolvedFont::Embedded { family, variant } => {
                let data = self.embedded_variant_mut(family, variant)?;
                data.add_chars(text);
                data.encode_text_hex(text)
            }
        };

        let next_resource = format!("F{}", self.font_resources.len() + 1);
        let resource_name = self
            .font_resources
            .entry(font.clone())
            .or_insert(next_resource)
            .clone();

        let ctx = TextRenderContext {
            font_name: resource_name,
            font_size: self.current_font_size,
            color: self.current_text_color,
        };
        let pdf_y = self.page_size.height - y;
        let operators = generate_text_operators(&encoded, x, pdf_y, &ctx);

        let state = &mut self.pages[page - 1];
        state.fonts.insert(font);
        state.content.extend_from_slice(&operators);
        Ok(())
    }

    /// Insert an image stretched to a rectangle
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate in points (from top)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(f64, f64)> {
        self.insert_image_scaled(data, page, x, y, width, height, ImageScaleMode::Stretch)
    }

    /// Insert an image with scaling mode
    ///
    /// Parts of the image outside the page are clipped by the viewer, so a
    /// negative `y` shows a lower slice of a tall image.
    ///
    /// # Returns
    /// The placed (width, height) in points
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<(f64, f64)> {
        self.check_page(page)?;

        let image = self.get_or_create_image(data)?;
        let (actual_width, actual_height) =
            calculate_scaled_dimensions(image.width, image.height, width, height, mode);

        let pdf_y = self.page_size.height - y - actual_height;
        let operators =
            generate_image_operators(&image.resource_name, x, pdf_y, actual_width, actual_height);

        let state = &mut self.pages[page - 1];
        state
            .images
            .insert(image.resource_name.clone(), image.object_id);
        state.content.extend_from_slice(&operators);

        Ok((actual_width, actual_height))
    }

    /// Add the image XObject once per distinct source
    fn get_or_create_image(&mut self, data: &[u8]) -> Result<EmbeddedImage> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let key = hasher.finish();

        if let Some(existing) = self.images.get(&key) {
            return Ok(existing.clone());
        }

        let xobject = ImageXObject::from_bytes(data)?;
        let smask_id = xobject
            .to_smask_stream()
            .map(|stream| self.inner.add_object(stream));
        let object_id = self.inner.add_object(xobject.to_pdf_stream(smask_id));

        let image = EmbeddedImage {
            resource_name: format!("Im{}", self.images.len() + 1),
            object_id,
            width: xobject.width,
            height: xobject.height,
        };
        self.images.insert(key, image.clone());
        Ok(image)
    }

    /// Serialize the document to bytes
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.finalize()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Serialize the document to a file
    pub fn save<P: AsRef<Path>>(mut self, path: P) -> Result<()> {
        self.finalize()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Write fonts, pages and the page tree into the lopdf document
    fn finalize(&mut self) -> Result<()> {
        let mut font_ids: BTreeMap<ResolvedFont, ObjectId> = BTreeMap::new();
        for font in self.font_resources.keys() {
            let id = match font {
                ResolvedFont::Standard(base_font) => self
                    .inner
                    .add_object(StandardFont::font_dictionary(base_font)),
                ResolvedFont::Embedded { family, variant } => {
                    let data = match self.families.get(family) {
                        Some(FontSource::Embedded(f)) => f
                            .variants()
                            .find(|v| &v.name == variant)
                            .ok_or_else(|| PdfError::FontNotFound(variant.clone()))?,
                        _ => return Err(PdfError::FontNotFound(family.clone())),
                    };
                    embed_font(&mut self.inner, data)?
                }
            };
            font_ids.insert(font.clone(), id);
        }

        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.page_size.width as f32),
            Object::Real(self.page_size.height as f32),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for state in std::mem::take(&mut self.pages) {
            let mut font_dict = Dictionary::new();
            for font in &state.fonts {
                let resource = &self.font_resources[font];
                font_dict.set(resource.as_bytes(), Object::Reference(font_ids[font]));
            }

            let mut xobject_dict = Dictionary::new();
            for (name, id) in &state.images {
                xobject_dict.set(name.as_bytes(), Object::Reference(*id));
            }

            let mut resources = Dictionary::new();
            if !font_dict.is_empty() {
                resources.set("Font", font_dict);
            }
            if !xobject_dict.is_empty() {
                resources.set("XObject", xobject_dict);
            }

            let contents_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), state.content));

            let page_id = self.inner.add_object(Dictionary::from_iter(vec![
                ("Type", Object::from("Page")),
                ("Parent", Object::Reference(self.pages_id)),
                ("MediaBox", Object::Array(media_box.clone())),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::Reference(contents_id)),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.inner.objects.insert(
            self.pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::from("Pages")),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
            ])),
        );

        Ok(())
    }
}

/// Add the font program and dictionaries of one TrueType variant
fn embed_font(inner: &mut Document, font: &FontData) -> Result<ObjectId> {
    let objects = font.to_pdf_objects()?;

    let font_file_id = inner.add_object(objects.font_file_stream);

    let mut font_descriptor = objects.font_descriptor;
    font_descriptor.set("FontFile2", Object::Reference(font_file_id));
    let font_descriptor_id = inner.add_object(font_descriptor);

    let mut cid_font = objects.cid_font;
    cid_font.set("FontDescriptor", Object::Reference(font_descriptor_id));
    let cid_font_id = inner.add_object(cid_font);

    let tounicode_id = inner.add_object(objects.tounicode_stream);

    let mut type0_font = objects.type0_font;
    type0_font.set(
        "DescendantFonts",
        Object::Array(vec![Object::Reference(cid_font_id)]),
    );
    type0_font.set("ToUnicode", Object::Reference(tounicode_id));

    Ok(inner.add_object(type0_font))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_has_one_page() {
        let doc = PdfDocument::new(PageSize::A4);
        assert_eq!(doc.page_count(), 1);
        assert!(doc.has_font_family("helvetica"));
        assert!(!doc.has_font_family("sarabun"));
    }

    #[test]
    fn test_add_page_numbers() {
        let mut doc = PdfDocument::new(PageSize::A4);
        assert_eq!(doc.add_page(), 2);
        assert_eq!(doc.add_page(), 3);
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn test_insert_text_requires_font() {
        let mut doc = PdfDocument::new(PageSize::A4);
        let result = doc.insert_text("Hello", 1, 10.0, 10.0);
        assert!(matches!(result, Err(PdfError::FontNotFound(_))));
    }

    #[test]
    fn test_insert_text_invalid_page() {
        let mut doc = PdfDocument::new(PageSize::A4);
        doc.set_font("helvetica", 12.0).unwrap();
        let result = doc.insert_text("Hello", 2, 10.0, 10.0);
        assert!(matches!(result, Err(PdfError::InvalidPage(2, 1))));
    }

    #[test]
    fn test_unknown_family() {
        let mut doc = PdfDocument::new(PageSize::A4);
        assert!(matches!(
            doc.set_font("comic", 12.0),
            Err(PdfError::FontNotFound(_))
        ));
        assert!(doc.set_font_weight(FontWeight::Bold).is_err());
    }

    #[test]
    fn test_font_resources_are_shared_between_pages() {
        let mut doc = PdfDocument::new(PageSize::A4);
        doc.add_page();
        doc.set_font("helvetica", 12.0).unwrap();
        doc.insert_text("one", 1, 0.0, 10.0).unwrap();
        doc.insert_text("two", 2, 0.0, 10.0).unwrap();
        doc.set_font_weight(FontWeight::Bold).unwrap();
        doc.insert_text("three", 2, 0.0, 20.0).unwrap();

        assert_eq!(doc.font_resources.len(), 2);
        assert_eq!(
            doc.font_resources[&ResolvedFont::Standard("Helvetica")],
            "F1"
        );
        assert_eq!(
            doc.font_resources[&ResolvedFont::Standard("Helvetica-Bold")],
            "F2"
        );
        assert_eq!(doc.pages[1].fonts.len(), 2);
    }

    #[test]
    fn test_color_from_rgb() {
        let color = Color::from_rgb(255, 0, 51);
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.2));
        assert_eq!(Color::default(), Color::black());
    }
}
