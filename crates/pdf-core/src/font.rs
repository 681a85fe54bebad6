//! Font handling for PDF documents
//!
//! Two kinds of font are supported:
//! - the standard Type1 families every PDF viewer ships (Helvetica, Times, Courier),
//!   written with WinAnsiEncoding and no embedded program
//! - TrueType families registered from bytes, embedded as Type0/CIDFontType2 with
//!   Identity-H encoding so any glyph in the font can be drawn

use crate::{PdfError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::collections::BTreeSet;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// The standard 14 font families usable without embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    Times,
    Courier,
}

impl StandardFont {
    /// All families registered on every new document, with their lookup names
    pub const ALL: [(&'static str, StandardFont); 3] = [
        ("helvetica", StandardFont::Helvetica),
        ("times", StandardFont::Times),
        ("courier", StandardFont::Courier),
    ];

    /// PostScript name of the variant for the given weight and style
    pub fn base_font(self, weight: FontWeight, style: FontStyle) -> &'static str {
        use FontStyle::*;
        use FontWeight::*;
        match (self, weight, style) {
            (StandardFont::Helvetica, Regular, Normal) => "Helvetica",
            (StandardFont::Helvetica, Bold, Normal) => "Helvetica-Bold",
            (StandardFont::Helvetica, Regular, Italic) => "Helvetica-Oblique",
            (StandardFont::Helvetica, Bold, Italic) => "Helvetica-BoldOblique",
            (StandardFont::Times, Regular, Normal) => "Times-Roman",
            (StandardFont::Times, Bold, Normal) => "Times-Bold",
            (StandardFont::Times, Regular, Italic) => "Times-Italic",
            (StandardFont::Times, Bold, Italic) => "Times-BoldItalic",
            (StandardFont::Courier, Regular, Normal) => "Courier",
            (StandardFont::Courier, Bold, Normal) => "Courier-Bold",
            (StandardFont::Courier, Regular, Italic) => "Courier-Oblique",
            (StandardFont::Courier, Bold, Italic) => "Courier-BoldOblique",
        }
    }

    /// Simple font dictionary for a standard font given its PostScript name
    pub fn font_dictionary(base_font: &str) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", Object::from("Font")),
            ("Subtype", "Type1".into()),
            ("BaseFont", Object::Name(base_font.into())),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// A parsed TrueType font and the characters drawn with it
#[derive(Debug, Clone)]
pub struct FontData {
    /// Variant name, unique within a document (e.g. "sarabun-bold")
    pub name: String,
    /// Raw TTF data
    pub ttf_data: Vec<u8>,
    /// Characters drawn with this font, ordered for stable output
    pub used_chars: BTreeSet<char>,
}

/// PDF objects generated for font embedding
///
/// References between the objects are filled in by the document when it adds them.
pub struct FontObjects {
    /// Type0 font dictionary
    pub type0_font: Dictionary,
    /// CIDFont Type2 dictionary
    pub cid_font: Dictionary,
    /// Font descriptor dictionary
    pub font_descriptor: Dictionary,
    /// Font file stream (TTF data)
    pub font_file_stream: Stream,
    /// ToUnicode CMap stream
    pub tounicode_stream: Stream,
}

/// TrueType font family with variants
#[derive(Debug, Clone)]
pub struct FontFamily {
    pub regular: FontData,
    pub bold: Option<FontData>,
    pub italic: Option<FontData>,
    pub bold_italic: Option<FontData>,
}

impl FontFamily {
    /// Font data for the requested weight and style, falling back towards regular
    pub fn get_variant(&self, weight: FontWeight, style: FontStyle) -> &FontData {
        let preferred = match (weight, style) {
            (FontWeight::Bold, FontStyle::Italic) => self
                .bold_italic
                .as_ref()
                .or(self.bold.as_ref())
                .or(self.italic.as_ref()),
            (FontWeight::Bold, FontStyle::Normal) => self.bold.as_ref(),
            (FontWeight::Regular, FontStyle::Italic) => self.italic.as_ref(),
            (FontWeight::Regular, FontStyle::Normal) => None,
        };
        preferred.unwrap_or(&self.regular)
    }

    /// Iterate over every loaded variant
    pub fn variants(&self) -> impl Iterator<Item = &FontData> {
        std::iter::once(&self.regular)
            .chain(self.bold.as_ref())
            .chain(self.italic.as_ref())
            .chain(self.bold_italic.as_ref())
    }

    /// Find a loaded variant by its name
    pub fn variant_by_name_mut(&mut self, name: &str) -> Option<&mut FontData> {
        std::iter::once(&mut self.regular)
            .chain(self.bold.as_mut())
            .chain(self.italic.as_mut())
            .chain(self.bold_italic.as_mut())
            .find(|variant| variant.name == name)
    }
}

/// Builder for registering TrueType font families
#[derive(Default)]
pub struct FontFamilyBuilder {
    regular: Option<Vec<u8>>,
    bold: Option<Vec<u8>>,
    italic: Option<Vec<u8>>,
    bold_italic: Option<Vec<u8>>,
}

impl FontFamilyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular(mut self, ttf_data: Vec<u8>) -> Self {
        self.regular = Some(ttf_data);
        self
    }

    pub fn bold(mut self, ttf_data: Vec<u8>) -> Self {
        self.bold = Some(ttf_data);
        self
    }

    pub fn italic(mut self, ttf_data: Vec<u8>) -> Self {
        self.italic = Some(ttf_data);
        self
    }

    pub fn bold_italic(mut self, ttf_data: Vec<u8>) -> Self {
        self.bold_italic = Some(ttf_data);
        self
    }

    /// Parse every supplied variant; the regular variant is mandatory
    pub fn build(self, family_name: &str) -> Result<FontFamily> {
        let regular_data = self.regular.ok_or_else(|| {
            PdfError::FontParseError(format!(
                "Font family '{family_name}' must have a regular variant"
            ))
        })?;

        let variant = |suffix: &str, data: Option<Vec<u8>>| {
            data.map(|bytes| FontData::from_ttf(&format!("{family_name}-{suffix}"), bytes))
                .transpose()
        };

        Ok(FontFamily {
            regular: FontData::from_ttf(&format!("{family_name}-regular"), regular_data)?,
            bold: variant("bold", self.bold)?,
            italic: variant("italic", self.italic)?,
            bold_italic: variant("bold-italic", self.bold_italic)?,
        })
    }
}

impl FontData {
    /// Create font data from TTF bytes, validating that the font parses
    pub fn from_ttf(name: &str, ttf_data: Vec<u8>) -> Result<Self> {
        ttf_parser::Face::parse(&ttf_data, 0)
            .map_err(|e| PdfError::FontParseError(format!("{name}: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            ttf_data,
            used_chars: BTreeSet::new(),
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Record characters for the width and ToUnicode tables
    pub fn add_chars(&mut self, text: &str) {
        self.used_chars.extend(text.chars());
    }

    /// Encode text as a hex string of glyph IDs for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let face = self.face();
        let glyphs: String = text
            .chars()
            .map(|c| {
                let gid = face
                    .as_ref()
                    .and_then(|f| f.glyph_index(c))
                    .map(|id| id.0)
                    .unwrap_or(0);
                format!("{gid:04X}")
            })
            .collect();
        format!("<{glyphs}>")
    }

    /// Generate all PDF objects needed to embed this font
    pub fn to_pdf_objects(&self) -> Result<FontObjects> {
        let face = self
            .face()
            .ok_or_else(|| PdfError::FontParseError(self.name.clone()))?;
        let font_name = Object::Name(self.name.clone().into_bytes());
        let scale = 1000.0 / face.units_per_em() as f64;
        let to_glyph_space = |v: i16| ((v as f64) * scale).round() as i64;

        let bbox = face.global_bounding_box();
        let font_descriptor = Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 4.into()),
            (
                "FontBBox",
                vec![
                    to_glyph_space(bbox.x_min).into(),
                    to_glyph_space(bbox.y_min).into(),
                    to_glyph_space(bbox.x_max).into(),
                    to_glyph_space(bbox.y_max).into(),
                ]
                .into(),
            ),
            ("ItalicAngle", 0.into()),
            ("Ascent", to_glyph_space(face.ascender()).into()),
            ("Descent", to_glyph_space(face.descender()).into()),
            ("CapHeight", to_glyph_space(face.ascender()).into()),
            ("StemV", 80.into()),
        ]);

        let cid_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            (
                "CIDSystemInfo",
                Dictionary::from_iter(vec![
                    ("Registry", Object::string_literal("Adobe")),
                    ("Ordering", Object::string_literal("Identity")),
                    ("Supplement", 0.into()),
                ])
                .into(),
            ),
            ("CIDToGIDMap", "Identity".into()),
            ("W", self.generate_widths_array(&face, scale).into()),
            ("DW", 1000.into()),
        ]);

        let type0_font = Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
        ]);

        let font_file_stream = Stream::new(
            Dictionary::from_iter(vec![("Length1", (self.ttf_data.len() as i64).into())]),
            self.ttf_data.clone(),
        );

        let tounicode_stream = Stream::new(
            Dictionary::new(),
            self.generate_tounicode_cmap(&face).into_bytes(),
        );

        Ok(FontObjects {
            type0_font,
            cid_font,
            font_descriptor,
            font_file_stream,
            tounicode_stream,
        })
    }

    /// /W array in glyph space: `gid [width] gid [width] ...`
    fn generate_widths_array(&self, face: &ttf_parser::Face<'_>, scale: f64) -> Vec<Object> {
        let gids: BTreeSet<ttf_parser::GlyphId> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c))
            .collect();

        let mut widths = Vec::with_capacity(gids.len() * 2);
        for gid in gids {
            let advance = face.glyph_hor_advance(gid).unwrap_or(0) as f64 * scale;
            widths.push(Object::Integer(gid.0 as i64));
            widths.push(vec![Object::Integer(advance.round() as i64)].into());
        }
        widths
    }

    /// ToUnicode CMap mapping glyph IDs back to the drawn characters
    fn generate_tounicode_cmap(&self, face: &ttf_parser::Face<'_>) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n\
             12 dict begin\n\
             begincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n\
             /CMapType 2 def\n\
             1 begincodespacerange\n\
             <0000> <FFFF>\n\
             endcodespacerange\n",
        );

        let mapped: Vec<(u16, char)> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c).map(|gid| (gid.0, c)))
            .collect();

        // bfchar sections hold at most 100 entries
        for chunk in mapped.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, c) in chunk {
                let mut utf16 = [0u16; 2];
                let hex: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str(
            "endcmap\n\
             CMapName currentdict /CMap defineresource pop\n\
             end\n\
             end\n",
        );
        cmap
    }
}
