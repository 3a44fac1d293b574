use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};
use numerologija_server::pdf::{
    assemble_pdf, OverlayPlacement, PageArtist, Title, PAGE_H, PAGE_W,
};
use std::io::Write;

fn jpeg_slide() -> Vec<u8> {
    let img = RgbImage::from_pixel(640, 360, Rgb([30, 90, 60]));
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, 85);
    encoder
        .write_image(img.as_raw(), 640, 360, ExtendedColorType::Rgb8)
        .unwrap();
    out
}

fn png_overlay() -> Vec<u8> {
    let img = RgbaImage::from_pixel(300, 200, Rgba([200, 200, 0, 180]));
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(img.as_raw(), 300, 200, ExtendedColorType::Rgba8)
        .unwrap();
    out
}

#[test]
fn pages_are_rendered_at_slide_resolution() {
    let artist = PageArtist::without_font();
    let page = artist.full_bleed(&jpeg_slide(), None).unwrap();
    assert_eq!((page.width(), page.height()), (PAGE_W, PAGE_H));
}

#[test]
fn overlay_page_keeps_background_and_placement() {
    let artist = PageArtist::without_font();
    let placement = OverlayPlacement::Centered {
        max_w: 0.85,
        max_h: 0.75,
        x_shift: 0,
        y_shift: 40,
    };
    let title = Title::new("FINANSES UN REALIZĀCIJA\nTRIJSTŪRIS", 46.0, 120.0);
    let page = artist
        .overlay(Some(&jpeg_slide()), &png_overlay(), &placement, Some(&title))
        .unwrap();
    assert_eq!((page.width(), page.height()), (PAGE_W, PAGE_H));
}

#[test]
fn assembled_pdf_has_one_page_per_slide() {
    let artist = PageArtist::without_font();
    let pages = vec![
        artist.full_bleed(&jpeg_slide(), None).unwrap(),
        artist.watermarked(&jpeg_slide(), "PARAUGS").unwrap(),
    ];
    let pdf = assemble_pdf(&pages).unwrap();
    assert_eq!(&pdf[..5], b"%PDF-");

    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[test]
fn assembled_pdf_survives_a_write_read_cycle() {
    let artist = PageArtist::without_font();
    let pdf = assemble_pdf(&[artist.full_bleed(&jpeg_slide(), None).unwrap()]).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&pdf).unwrap();
    let doc = lopdf::Document::load(file.path()).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}
