//! Position map: field id to physical page coordinate and font

use crate::Result;
use pdf_core::{Color, FontStyle as PdfFontStyle, FontWeight, PageSize};
use serde::{Deserialize, Serialize};

/// Font style variants
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    #[serde(rename = "bolditalic")]
    BoldItalic,
}

impl FontStyle {
    /// Weight and slant for the PDF writer
    pub fn to_pdf(self) -> (FontWeight, PdfFontStyle) {
        match self {
            FontStyle::Regular => (FontWeight::Regular, PdfFontStyle::Normal),
            FontStyle::Bold => (FontWeight::Bold, PdfFontStyle::Normal),
            FontStyle::Italic => (FontWeight::Regular, PdfFontStyle::Italic),
            FontStyle::BoldItalic => (FontWeight::Bold, PdfFontStyle::Italic),
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }
}

/// RGB text colour (components 0.0 - 1.0)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TextColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl TextColor {
    pub fn black() -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

impl Default for TextColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<TextColor> for Color {
    fn from(color: TextColor) -> Self {
        Color::rgb(color.r, color.g, color.b)
    }
}

/// Font used to draw a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    /// Family name: a standard family (`helvetica`, `times`, `courier`) or a loaded one
    pub family: String,
    /// Size in points
    pub size: f32,
    #[serde(default)]
    pub style: FontStyle,
    #[serde(default)]
    pub color: TextColor,
}

impl FontSpec {
    pub fn new(family: &str, size: f32, style: FontStyle) -> Self {
        Self {
            family: family.to_string(),
            size,
            style,
            color: TextColor::default(),
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("helvetica", 12.0, FontStyle::Regular)
    }
}

/// Physical page size in millimetres
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSpec {
    pub fn a4() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
        }
    }

    pub fn to_page_size(self) -> PageSize {
        PageSize::from_mm(self.width_mm, self.height_mm)
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::a4()
    }
}

/// One entry of the position map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldPosition {
    /// Id of the form input
    pub id: String,
    /// Distance from the left page edge in millimetres
    pub x: f64,
    /// Baseline distance from the top page edge in millimetres
    pub y: f64,
    /// Overrides the map's default font
    #[serde(default)]
    pub font: Option<FontSpec>,
    /// The input holds a date
    #[serde(default)]
    pub date: bool,
}

impl FieldPosition {
    pub fn new(id: &str, x: f64, y: f64) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            font: None,
            date: false,
        }
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = Some(font);
        self
    }

    fn date(mut self) -> Self {
        self.date = true;
        self
    }
}

/// Field id to page coordinate table, immutable once built
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PositionMap {
    #[serde(default)]
    pub page: PageSpec,
    /// Default font for entries without their own
    #[serde(default)]
    pub font: FontSpec,
    pub fields: Vec<FieldPosition>,
}

impl PositionMap {
    /// Parse a position map from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Coordinates calibrated against the land rent receipt template (A4, helvetica bold 12pt)
    pub fn land_rent_receipt() -> Self {
        let field = FieldPosition::new;
        Self {
            page: PageSpec::a4(),
            font: FontSpec::new("helvetica", 12.0, FontStyle::Bold),
            fields: vec![
                field("Number", 18.9, 57.0),
                field("rajashriInput", 21.0, 62.5),
                field("dateInput", 173.25, 57.0).date(),
                field("paymentNumber", 95.0, 83.0),
                field("ownerName", 95.0, 95.5),
                field("village", 95.0, 107.7),
                field("ownerFatherName", 95.0, 120.2),
                field("ownerAddress", 95.0, 132.0),
                field("totalLand", 95.0, 144.3),
                field("totalWeight", 95.0, 156.8),
                field("cropType", 95.0, 169.0),
                field("landNumber", 95.0, 181.5),
                field("ownerNameAgain", 95.0, 193.6),
                field("brokerName", 95.0, 206.8),
                field("totalRent", 95.0, 218.5),
                field("advance", 95.0, 230.75),
                field("remainingRent", 95.0, 243.6),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&FieldPosition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Font of an entry: its own, or the map default
    pub fn font_for<'a>(&'a self, field: &'a FieldPosition) -> &'a FontSpec {
        field.font.as_ref().unwrap_or(&self.font)
    }

    pub fn page_size(&self) -> PageSize {
        self.page.to_page_size()
    }
}
