//! Image handling for PDF documents

use crate::{PdfError, Result};
use flate2::{write::ZlibEncoder, Compression};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Image scaling mode for insert_image_scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageScaleMode {
    /// Stretch to exact dimensions
    #[default]
    Stretch,
    /// Scale proportionally based on width, auto-calculate height
    FitWidth,
    /// Scale proportionally based on height, auto-calculate width
    FitHeight,
    /// Fit within bounding box, preserving aspect ratio
    FitBox,
}

/// Calculate display dimensions (points) of an image of `original_*` pixels
pub fn calculate_scaled_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: f64,
    target_height: f64,
    mode: ImageScaleMode,
) -> (f64, f64) {
    let (w, h) = (original_width as f64, original_height as f64);
    match mode {
        ImageScaleMode::Stretch => (target_width, target_height),
        ImageScaleMode::FitWidth => (target_width, target_width * h / w),
        ImageScaleMode::FitHeight => (target_height * w / h, target_height),
        ImageScaleMode::FitBox => {
            let scale = (target_width / w).min(target_height / h);
            (w * scale, h * scale)
        }
    }
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Ok(ImageFormat::Jpeg)
    } else if data.starts_with(&PNG_SIGNATURE) {
        Ok(ImageFormat::Png)
    } else {
        Err(PdfError::ImageError("Unknown image format".to_string()))
    }
}

/// Colour component count from the first SOF segment of a JPEG
fn jpeg_components(data: &[u8]) -> Option<u8> {
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        // SOF0..SOF15 except DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            return Some(data[i + 9]);
        }
        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            return None;
        }
        i += 2 + length;
    }
    None
}

/// Image XObject ready for embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB" or "DeviceGray"; CMYK sources are converted to RGB
    pub color_space: &'static str,
    /// "DCTDecode" for JPEG passthrough, "FlateDecode" for decoded PNG samples
    pub filter: &'static str,
    /// Encoded sample data
    pub data: Vec<u8>,
    /// Zlib-compressed 8-bit alpha channel, when the source had one
    pub alpha: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Build an XObject from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// JPEG data is embedded unchanged; only the header is decoded
    ///
    /// Four-component (CMYK) JPEGs are decoded to RGB and re-embedded as
    /// Flate samples instead.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        if jpeg_components(data) == Some(4) {
            let image = ImageReader::new(Cursor::new(data))
                .with_guessed_format()?
                .decode()?;
            return Self::from_image(&image);
        }

        let decoder = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_space = match decoder.color_type() {
            image::ColorType::L8 | image::ColorType::L16 => "DeviceGray",
            _ => "DeviceRGB",
        };

        Ok(Self {
            width,
            height,
            color_space,
            filter: "DCTDecode",
            data: data.to_vec(),
            alpha: None,
        })
    }

    /// PNG data is decoded; colour and alpha become separate Flate streams
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;
        Self::from_image(&image)
    }

    /// Build an XObject from decoded pixels
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let color = image.color();
        let (samples, color_space) = if color.has_color() {
            (image.to_rgb8().into_raw(), "DeviceRGB")
        } else {
            (image.to_luma8().into_raw(), "DeviceGray")
        };

        let alpha = if color.has_alpha() {
            let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p[3]).collect();
            // Fully opaque masks are dropped
            if alpha.iter().all(|&a| a == u8::MAX) {
                None
            } else {
                Some(deflate(&alpha)?)
            }
        } else {
            None
        };

        Ok(Self {
            width: image.width(),
            height: image.height(),
            color_space,
            filter: "FlateDecode",
            data: deflate(&samples)?,
            alpha,
        })
    }

    /// Soft mask stream for the alpha channel, if any
    pub fn to_smask_stream(&self) -> Option<Stream> {
        self.alpha.as_ref().map(|alpha| {
            Stream::new(
                self.image_dictionary("DeviceGray", "FlateDecode"),
                alpha.clone(),
            )
        })
    }

    /// Image stream, referencing an already-added soft mask
    pub fn to_pdf_stream(&self, smask: Option<ObjectId>) -> Stream {
        let mut dict = self.image_dictionary(self.color_space, self.filter);
        if let Some(id) = smask {
            dict.set("SMask", Object::Reference(id));
        }
        Stream::new(dict, self.data.clone())
    }

    fn image_dictionary(&self, color_space: &str, filter: &str) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", Object::from("XObject")),
            ("Subtype", "Image".into()),
            ("Width", (self.width as i64).into()),
            ("Height", (self.height as i64).into()),
            ("ColorSpace", color_space.into()),
            ("BitsPerComponent", 8.into()),
            ("Filter", filter.into()),
        ])
    }
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

/// Operators drawing an image resource into a rectangle
///
/// `x`/`y` are PDF coordinates of the lower-left corner.
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
