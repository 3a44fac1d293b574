//! Raster page composition and PDF assembly.
//!
//! Every slide becomes a 1920x1080 bitmap: dark background, the slide
//! image stretched full-bleed or an overlay fitted into its layout box,
//! titles rasterized on top. Each finished bitmap is JPEG-encoded and
//! embedded one-image-per-page into the PDF (DCTDecode pass-through),
//! which keeps the writer a thin wrapper around `lopdf`.

use image::imageops::{self, FilterType};
use image::{codecs::jpeg::JpegEncoder, Rgba, RgbaImage, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rusttype::{point, Font, Scale};
use thiserror::Error;

pub const PAGE_W: u32 = 1920;
pub const PAGE_H: u32 = 1080;

/// Page background, #0b1f1c.
const PAGE_BG: Rgba<u8> = Rgba([11, 31, 28, 255]);
const TITLE_COLOR: [u8; 3] = [255, 255, 255];
const WATERMARK_COLOR: [u8; 3] = [255, 76, 76];

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("image decode/encode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid font data")]
    Font,
    #[error("pdf assembly failed: {0}")]
    Lopdf(#[from] lopdf::Error),
    #[error("pdf io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Title text drawn over a page. `top` is the distance from the page top
/// to the first line; multi-line titles step down by `line_step`.
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub size: f32,
    pub top: f32,
    pub line_step: f32,
}

impl Title {
    pub fn new(text: &str, size: f32, top: f32) -> Self {
        Self {
            text: text.to_string(),
            size,
            top,
            line_step: 55.0,
        }
    }
}

/// Where an overlay image lands on the page. Shifts are in pixels with
/// positive y pointing down (raster convention).
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayPlacement {
    /// Stretch over the whole page, ignoring aspect.
    FullBleed,
    /// Fit into the given page-width/height fractions, centered, then
    /// shifted.
    Centered {
        max_w: f32,
        max_h: f32,
        x_shift: i64,
        y_shift: i64,
    },
    /// Fit into a box given as page fractions, anchored like the PDF
    /// coordinate system (x/y measured from the bottom-left corner).
    RelativeBox { x: f32, y: f32, w: f32, h: f32 },
    /// Fixed-width slot, `x`/`y` from the bottom-left corner.
    Slot { x: i64, y: i64, w: u32 },
}

/// Fit `(iw, ih)` into `(max_w, max_h)` preserving aspect ratio.
pub fn fit_within(iw: u32, ih: u32, max_w: f32, max_h: f32) -> (u32, u32) {
    let aspect = iw as f32 / ih as f32;
    let mut w = max_w;
    let mut h = w / aspect;
    if h > max_h {
        h = max_h;
        w = h * aspect;
    }
    (w.round().max(1.0) as u32, h.round().max(1.0) as u32)
}

/// Composes slide bitmaps. Holds the report font; without one, titles
/// are skipped with a warning (used by tests that only check geometry).
pub struct PageArtist {
    font: Option<Font<'static>>,
}

impl PageArtist {
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self, PdfError> {
        let font = Font::try_from_vec(bytes).ok_or(PdfError::Font)?;
        Ok(Self { font: Some(font) })
    }

    pub fn without_font() -> Self {
        Self { font: None }
    }

    fn blank_page(&self) -> RgbaImage {
        RgbaImage::from_pixel(PAGE_W, PAGE_H, PAGE_BG)
    }

    fn finish(&self, canvas: RgbaImage) -> RgbImage {
        image::DynamicImage::ImageRgba8(canvas).to_rgb8()
    }

    /// Slide image stretched over the whole page, optional title on top.
    pub fn full_bleed(&self, image: &[u8], title: Option<&Title>) -> Result<RgbImage, PdfError> {
        let mut canvas = self.blank_page();
        self.paint_stretched(&mut canvas, image)?;
        if let Some(t) = title {
            self.draw_title(&mut canvas, t);
        }
        Ok(self.finish(canvas))
    }

    /// Optional background (stretched), then an overlay image placed per
    /// `placement`, then an optional title.
    pub fn overlay(
        &self,
        background: Option<&[u8]>,
        overlay: &[u8],
        placement: &OverlayPlacement,
        title: Option<&Title>,
    ) -> Result<RgbImage, PdfError> {
        let mut canvas = self.blank_page();
        if let Some(bg) = background {
            self.paint_stretched(&mut canvas, bg)?;
        }
        self.paint_placed(&mut canvas, overlay, placement)?;
        if let Some(t) = title {
            self.draw_title(&mut canvas, t);
        }
        Ok(self.finish(canvas))
    }

    /// Full-bleed slide with a semi-transparent diagonal-style watermark.
    pub fn watermarked(&self, image: &[u8], text: &str) -> Result<RgbImage, PdfError> {
        let mut canvas = self.blank_page();
        self.paint_stretched(&mut canvas, image)?;
        self.draw_line(
            &mut canvas,
            text,
            150.0,
            PAGE_W as f32 / 2.0,
            PAGE_H as f32 / 2.0 - 75.0,
            WATERMARK_COLOR,
            0.25,
        );
        Ok(self.finish(canvas))
    }

    fn paint_stretched(&self, canvas: &mut RgbaImage, image: &[u8]) -> Result<(), PdfError> {
        let decoded = image::load_from_memory(image)?.to_rgba8();
        let resized = imageops::resize(&decoded, PAGE_W, PAGE_H, FilterType::Triangle);
        imageops::overlay(canvas, &resized, 0, 0);
        Ok(())
    }

    fn paint_placed(
        &self,
        canvas: &mut RgbaImage,
        image: &[u8],
        placement: &OverlayPlacement,
    ) -> Result<(), PdfError> {
        if *placement == OverlayPlacement::FullBleed {
            return self.paint_stretched(canvas, image);
        }
        let decoded = image::load_from_memory(image)?.to_rgba8();
        let (iw, ih) = (decoded.width(), decoded.height());
        let (w, h, x, y) = match placement {
            OverlayPlacement::FullBleed => unreachable!(),
            OverlayPlacement::Centered {
                max_w,
                max_h,
                x_shift,
                y_shift,
            } => {
                let (w, h) = fit_within(iw, ih, PAGE_W as f32 * max_w, PAGE_H as f32 * max_h);
                let x = (PAGE_W as i64 - w as i64) / 2 + x_shift;
                let y = (PAGE_H as i64 - h as i64) / 2 + y_shift;
                (w, h, x, y)
            }
            OverlayPlacement::RelativeBox { x, y, w, h } => {
                let box_x = PAGE_W as f32 * x;
                let box_y = PAGE_H as f32 * y; // from bottom
                let box_w = PAGE_W as f32 * w;
                let box_h = PAGE_H as f32 * h;
                let (tw, th) = fit_within(iw, ih, box_w, box_h);
                let px = box_x + (box_w - tw as f32) / 2.0;
                // bottom-anchored box centered vertically, flipped to raster
                let py = PAGE_H as f32 - box_y - (box_h + th as f32) / 2.0;
                (tw, th, px.round() as i64, py.round() as i64)
            }
            OverlayPlacement::Slot { x, y, w } => {
                let tw = *w;
                let th = (tw as f32 * ih as f32 / iw as f32).round() as u32;
                let py = PAGE_H as i64 - y - th as i64;
                (tw, th, *x, py)
            }
        };
        let resized = imageops::resize(&decoded, w, h, FilterType::Triangle);
        imageops::overlay(canvas, &resized, x, y);
        Ok(())
    }

    fn draw_title(&self, canvas: &mut RgbaImage, title: &Title) {
        for (i, line) in title.text.split('\n').enumerate() {
            let y = title.top + i as f32 * title.line_step;
            self.draw_line(
                canvas,
                line,
                title.size,
                PAGE_W as f32 / 2.0,
                y,
                TITLE_COLOR,
                1.0,
            );
        }
    }

    fn draw_line(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        size: f32,
        center_x: f32,
        top_y: f32,
        color: [u8; 3],
        alpha: f32,
    ) {
        let font = match &self.font {
            Some(f) => f,
            None => {
                log::warn!("no font configured, skipping text {:?}", text);
                return;
            }
        };
        let scale = Scale::uniform(size);
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<_> = font
            .layout(text, scale, point(0.0, v_metrics.ascent))
            .collect();
        let width = glyphs
            .iter()
            .rev()
            .filter_map(|g| g.pixel_bounding_box().map(|bb| bb.max.x))
            .next()
            .unwrap_or(0) as f32;
        let x0 = (center_x - width / 2.0).round() as i32;
        let y0 = top_y.round() as i32;

        for glyph in glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    let px = x0 + bb.min.x + gx as i32;
                    let py = y0 + bb.min.y + gy as i32;
                    if px < 0 || py < 0 || px >= PAGE_W as i32 || py >= PAGE_H as i32 {
                        return;
                    }
                    let a = coverage * alpha;
                    if a <= 0.0 {
                        return;
                    }
                    let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                    for c in 0..3 {
                        let base = pixel.0[c] as f32;
                        pixel.0[c] = (base + (color[c] as f32 - base) * a).round() as u8;
                    }
                });
            }
        }
    }
}

/// JPEG-encode each page bitmap and assemble the final document.
pub fn assemble_pdf(pages: &[RgbImage]) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for page in pages {
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, 88).encode_image(page)?;

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => PAGE_W as i64,
                "Height" => PAGE_H as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        (PAGE_W as i64).into(),
                        0.into(),
                        0.into(),
                        (PAGE_H as i64).into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), (PAGE_W as i64).into(), (PAGE_H as i64).into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Dictionary(dictionary! {
                "XObject" => Object::Dictionary(dictionary! {
                    "Im0" => Object::Reference(image_id),
                }),
            }),
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}
