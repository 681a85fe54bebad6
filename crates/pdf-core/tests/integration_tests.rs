//! Integration tests for pdf-core
//!
//! Documents are serialized to bytes and parsed back with lopdf.

use image::{DynamicImage, ImageBuffer, Luma, Rgba, RgbaImage};
use pdf_core::{
    mm_to_pt, Color, FontStyle, FontWeight, ImageScaleMode, PageSize, PdfDocument, PdfError,
};
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn encode(image: DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

/// 16x16 grey PNG
fn create_test_png() -> Vec<u8> {
    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(16, 16, Luma([200]));
    encode(DynamicImage::ImageLuma8(img), image::ImageFormat::Png)
}

/// 20x10 RGB JPEG
fn create_test_jpeg() -> Vec<u8> {
    let img = RgbaImage::from_pixel(20, 10, Rgba([10, 120, 200, 255]));
    encode(
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()),
        image::ImageFormat::Jpeg,
    )
}

/// DejaVu Sans shipped with the workspace
fn test_font_data() -> Vec<u8> {
    std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/../../fonts/DejaVuSans.ttf"))
        .expect("Failed to read test font file")
}

fn page_contents(bytes: &[u8]) -> Vec<String> {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|id| String::from_utf8(doc.get_page_content(*id).unwrap()).unwrap())
        .collect()
}

#[test]
fn test_blank_document_round_trip() {
    let bytes = PdfDocument::new(PageSize::A4).into_bytes().unwrap();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();

    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);

    let page = doc.get_object(pages[&1]).unwrap().as_dict().unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    match (&media_box[2], &media_box[3]) {
        (lopdf::Object::Real(w), lopdf::Object::Real(h)) => {
            assert!((*w as f64 - PageSize::A4.width).abs() < 0.01);
            assert!((*h as f64 - PageSize::A4.height).abs() < 0.01);
        }
        other => panic!("unexpected MediaBox entries: {other:?}"),
    }
}

#[test]
fn test_text_is_placed_at_top_origin_coordinates() {
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.set_font("helvetica", 12.0).unwrap();
    doc.set_font_weight(FontWeight::Bold).unwrap();
    doc.insert_text("Ramesh", 1, 100.0, 200.0).unwrap();

    let contents = page_contents(&doc.into_bytes().unwrap());
    let expected_y = PageSize::A4.height - 200.0;

    assert!(contents[0].contains("/F1 12 Tf"));
    assert!(contents[0].contains(&format!("100 {expected_y} Td")));
    assert!(contents[0].contains("(Ramesh) Tj"));
}

#[test]
fn test_standard_font_resources() {
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.set_font("times", 10.0).unwrap();
    doc.set_font_style(FontStyle::Italic).unwrap();
    doc.insert_text("note", 1, 10.0, 10.0).unwrap();

    let bytes = doc.into_bytes().unwrap();
    let parsed = lopdf::Document::load_mem(&bytes).unwrap();
    let base_fonts: Vec<&[u8]> = parsed
        .objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .filter(|d| d.get(b"Type").and_then(|v| v.as_name()).ok() == Some(&b"Font"[..]))
        .filter_map(|d| d.get(b"BaseFont").and_then(|v| v.as_name()).ok())
        .collect();

    assert_eq!(base_fonts, vec![&b"Times-Italic"[..]]);
}

#[test]
fn test_text_color() {
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.set_font("helvetica", 12.0).unwrap();
    doc.set_text_color(Color::rgb(1.0, 0.0, 0.0));
    doc.insert_text("overdue", 1, 10.0, 10.0).unwrap();

    let contents = page_contents(&doc.into_bytes().unwrap());
    assert!(contents[0].contains("1 0 0 rg"));
}

#[test]
fn test_empty_text_draws_nothing() {
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.set_font("helvetica", 12.0).unwrap();
    doc.insert_text("", 1, 10.0, 10.0).unwrap();

    let contents = page_contents(&doc.into_bytes().unwrap());
    assert_eq!(contents[0], "");
}

#[test]
fn test_full_page_background_image() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let size = doc.page_size();
    let placed = doc
        .insert_image(&create_test_png(), 1, 0.0, 0.0, size.width, size.height)
        .unwrap();
    assert_eq!(placed, (size.width, size.height));

    let bytes = doc.into_bytes().unwrap();
    let contents = page_contents(&bytes);
    assert!(contents[0].contains(&format!("{} 0 0 {} 0 0 cm", size.width, size.height)));
    assert!(contents[0].contains("/Im1 Do"));
}

#[test]
fn test_jpeg_passthrough() {
    let jpeg = create_test_jpeg();
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.insert_image(&jpeg, 1, 0.0, 0.0, 100.0, 50.0).unwrap();

    let bytes = doc.into_bytes().unwrap();
    let parsed = lopdf::Document::load_mem(&bytes).unwrap();
    let image_stream = parsed
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .find(|s| s.dict.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(&b"Image"[..]))
        .expect("image stream present");

    assert_eq!(
        image_stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
        b"DCTDecode"
    );
    assert_eq!(image_stream.content, jpeg);
}

#[test]
fn test_fit_width_keeps_aspect_ratio() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let (w, h) = doc
        .insert_image_scaled(
            &create_test_jpeg(),
            1,
            0.0,
            0.0,
            mm_to_pt(210.0),
            0.0,
            ImageScaleMode::FitWidth,
        )
        .unwrap();
    assert!((w - mm_to_pt(210.0)).abs() < 1e-9);
    assert!((h - mm_to_pt(105.0)).abs() < 1e-9);
}

#[test]
fn test_same_image_embedded_once() {
    let png = create_test_png();
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.add_page();
    doc.insert_image(&png, 1, 0.0, 0.0, 10.0, 10.0).unwrap();
    doc.insert_image(&png, 2, 0.0, 0.0, 10.0, 10.0).unwrap();

    let bytes = doc.into_bytes().unwrap();
    let parsed = lopdf::Document::load_mem(&bytes).unwrap();
    let image_count = parsed
        .objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .filter(|s| s.dict.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(&b"Image"[..]))
        .count();
    assert_eq!(image_count, 1);

    let contents = page_contents(&bytes);
    assert!(contents.iter().all(|c| c.contains("/Im1 Do")));
}

#[test]
fn test_tall_image_offset_on_second_page() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let size = doc.page_size();
    doc.add_page();
    doc.insert_image(&create_test_png(), 2, 0.0, -size.height, size.width, 2.0 * size.height)
        .unwrap();

    let contents = page_contents(&doc.into_bytes().unwrap());
    assert_eq!(contents[0], "");
    // Lower half of a two-page-tall image starts at the page's lower edge
    assert!(contents[1].contains(&format!(
        "{} 0 0 {} 0 0 cm",
        size.width,
        2.0 * size.height
    )));
}

#[test]
fn test_invalid_image_data() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let result = doc.insert_image(b"not an image", 1, 0.0, 0.0, 10.0, 10.0);
    assert!(matches!(result, Err(PdfError::ImageError(_))));
}

#[test]
fn test_output_is_deterministic() {
    let render = || {
        let mut doc = PdfDocument::new(PageSize::A4);
        doc.insert_image(&create_test_png(), 1, 0.0, 0.0, 100.0, 100.0)
            .unwrap();
        doc.set_font("helvetica", 12.0).unwrap();
        doc.insert_text("20/08/2025", 1, 490.0, 161.0).unwrap();
        doc.set_font("courier", 9.0).unwrap();
        doc.insert_text("R-0042", 1, 53.0, 161.0).unwrap();
        doc.into_bytes().unwrap()
    };

    assert_eq!(render(), render());
}

#[test]
fn test_register_font_family_rejects_invalid_data() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let result = doc.register_font_family(
        "noto",
        pdf_core::FontFamilyBuilder::new().regular(vec![1, 2, 3]),
    );
    assert!(matches!(result, Err(PdfError::FontParseError(_))));
    assert!(!doc.has_font_family("noto"));
}

#[test]
fn test_standard_family_names_are_reserved() {
    let mut doc = PdfDocument::new(PageSize::A4);
    let result = doc.register_font_family(
        "helvetica",
        pdf_core::FontFamilyBuilder::new().regular(vec![1, 2, 3]),
    );
    assert!(matches!(result, Err(PdfError::FontAlreadyExists(_))));
}

#[test]
fn test_embedded_font_round_trip() {
    let font_data = test_font_data();
    let mut doc = PdfDocument::new(PageSize::A4);
    doc.register_font_family(
        "dejavu",
        pdf_core::FontFamilyBuilder::new().regular(font_data.clone()),
    )
    .unwrap();
    doc.set_font("dejavu", 14.0).unwrap();
    doc.insert_text("Receipt", 1, 50.0, 100.0).unwrap();

    let bytes = doc.into_bytes().unwrap();
    let parsed = lopdf::Document::load_mem(&bytes).unwrap();

    let type0 = parsed
        .objects
        .values()
        .filter_map(|obj| obj.as_dict().ok())
        .find(|d| d.get(b"Subtype").and_then(|v| v.as_name()).ok() == Some(&b"Type0"[..]))
        .expect("no Type0 font");
    assert_eq!(
        type0.get(b"Encoding").unwrap().as_name().unwrap(),
        b"Identity-H"
    );
    assert_eq!(
        type0.get(b"BaseFont").unwrap().as_name().unwrap(),
        b"dejavu-regular"
    );

    let descendants = type0.get(b"DescendantFonts").unwrap().as_array().unwrap();
    let cid_font = parsed
        .get_dictionary(descendants[0].as_reference().unwrap())
        .unwrap();
    assert_eq!(
        cid_font.get(b"Subtype").unwrap().as_name().unwrap(),
        b"CIDFontType2"
    );
    // R e c i p t: one gid and one width array per distinct glyph
    let widths = cid_font.get(b"W").unwrap().as_array().unwrap();
    assert_eq!(widths.len(), 12);

    let descriptor = parsed
        .get_dictionary(cid_font.get(b"FontDescriptor").unwrap().as_reference().unwrap())
        .unwrap();
    let font_file = parsed
        .get_object(descriptor.get(b"FontFile2").unwrap().as_reference().unwrap())
        .unwrap()
        .as_stream()
        .unwrap();
    assert_eq!(
        font_file.dict.get(b"Length1").unwrap().as_i64().unwrap(),
        font_data.len() as i64
    );

    let tounicode = parsed
        .get_object(type0.get(b"ToUnicode").unwrap().as_reference().unwrap())
        .unwrap()
        .as_stream()
        .unwrap();
    let cmap = String::from_utf8(tounicode.content.clone()).unwrap();
    assert!(cmap.contains("6 beginbfchar"));
    assert!(cmap.contains("<0052>"));

    let contents = page_contents(&bytes);
    let hex_run = contents[0]
        .split('<')
        .nth(1)
        .and_then(|rest| rest.split_once("> Tj"))
        .map(|(hex, _)| hex)
        .expect("no hex Tj operand");
    // Seven glyph ids, none of them .notdef
    assert_eq!(hex_run.len(), 28);
    assert!(!hex_run.as_bytes().chunks(4).any(|gid| gid == b"0000"));
}
