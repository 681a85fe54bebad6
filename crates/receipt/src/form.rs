//! In-memory form view: the container holding overlay inputs and the template

use crate::position::PositionMap;
use crate::Result;
use serde::{Deserialize, Serialize};

/// CSS pixels per millimetre at 96 dpi
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// Box in CSS pixels, relative to the container's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Input element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    /// Value is an ISO `YYYY-MM-DD` date
    Date,
}

/// Computed text style of an input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    /// Font size in CSS pixels
    pub font_size: f32,
    pub bold: bool,
    pub color: [u8; 3],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            bold: false,
            color: [0, 0, 0],
        }
    }
}

fn visible() -> bool {
    true
}

/// An input element of the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub id: String,
    #[serde(default)]
    pub kind: InputKind,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default = "visible")]
    pub visible: bool,
}

impl FormElement {
    pub fn new(id: &str, kind: InputKind, rect: Rect) -> Self {
        Self {
            id: id.to_string(),
            kind,
            classes: Vec::new(),
            value: String::new(),
            rect,
            style: TextStyle::default(),
            visible: true,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether the element carries a class name
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Background template raster of the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    /// Path or URL the image was loaded from
    pub source: String,
    /// Served from another origin than the form
    #[serde(default)]
    pub cross_origin: bool,
    #[serde(default = "visible")]
    pub visible: bool,
    /// Encoded image bytes, once loaded
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl Background {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            cross_origin: false,
            visible: true,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }
}

/// Non-interactive text element standing in for a hidden input during capture
#[derive(Debug, Clone, PartialEq)]
pub struct TextDuplicate {
    /// Id of the input it replaces
    pub source_id: String,
    pub rect: Rect,
    pub style: TextStyle,
    pub text: String,
}

/// The form container: its size, inputs, background and any inserted duplicates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    /// Container width in CSS pixels
    pub width: u32,
    /// Container height in CSS pixels
    pub height: u32,
    #[serde(default)]
    pub background: Option<Background>,
    #[serde(default)]
    pub elements: Vec<FormElement>,
    #[serde(skip)]
    duplicates: Vec<TextDuplicate>,
}

impl FormView {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Parse a form layout from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lay out one overlay input per position map entry on a container of the page's size
    ///
    /// Each input's box sits on the entry's baseline and runs to the right page edge.
    pub fn from_position_map(map: &PositionMap, class: &str) -> Self {
        let (page_w, page_h) = (map.page.width_mm as f32, map.page.height_mm as f32);
        let mut view = Self::new(
            (page_w * PX_PER_MM).round() as u32,
            (page_h * PX_PER_MM).round() as u32,
        );

        for field in &map.fields {
            let font = map.font_for(field);
            let font_px = font.size * 96.0 / 72.0;
            let height = font_px * 1.5;
            let x = field.x as f32 * PX_PER_MM;
            // Baseline at the mapped y, text vertically centred in the box
            let y = field.y as f32 * PX_PER_MM - height * 0.75;
            let kind = if field.date {
                InputKind::Date
            } else {
                InputKind::Text
            };
            let style = TextStyle {
                font_size: font_px,
                bold: font.style.is_bold(),
                color: font.color.to_rgb8(),
            };

            view.push(
                FormElement::new(&field.id, kind, Rect::new(x, y, page_w * PX_PER_MM - x, height))
                    .with_class(class)
                    .with_style(style),
            );
        }
        view
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background = Some(background);
        self
    }

    pub fn push(&mut self, element: FormElement) {
        self.elements.push(element);
    }

    pub fn element(&self, id: &str) -> Option<&FormElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut FormElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Set an input's value; returns false when no input has that id
    pub fn set_value(&mut self, id: &str, value: &str) -> bool {
        match self.element_mut(id) {
            Some(element) => {
                element.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Inputs carrying a class name, in document order
    pub fn inputs<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a FormElement> + 'a {
        self.elements.iter().filter(move |e| e.has_class(class))
    }

    /// Attach the loaded template raster to the background
    pub fn set_background_image(&mut self, image: Vec<u8>) {
        if let Some(background) = self.background.as_mut() {
            background.image = Some(image);
        }
    }

    pub fn duplicates(&self) -> &[TextDuplicate] {
        &self.duplicates
    }

    pub(crate) fn insert_duplicate(&mut self, duplicate: TextDuplicate) {
        self.duplicates.push(duplicate);
    }

    pub(crate) fn remove_duplicates(&mut self) {
        self.duplicates.clear();
    }

    /// Every input is visible and no duplicate is attached
    pub fn is_pristine(&self) -> bool {
        self.duplicates.is_empty() && self.elements.iter().all(|e| e.visible)
    }
}
