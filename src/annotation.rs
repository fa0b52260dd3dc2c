use std::path::Path;
use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use crate::common::{LeafBox, LeafDetection};

const LABEL_FONT_SIZE: f32 = 18.0;
const LABEL_OFFSET: i32 = 10;
const LABEL_PADDING: i32 = 3;
const LINE_THICKNESS: u32 = 2;
const LABEL_TEXT_COLOUR: [u8; 3] = [0, 0, 0];

static EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Draws validated detections onto an image.
///
/// Each box is outlined in its class colour and captioned with
/// `"<class> <confidence>%"` on an opaque tag just above its top-left corner.
#[derive(Clone)]
pub struct Annotator {
    font: FontArc,
    font_size: f32,
    label_offset: i32,
    label_padding: i32,
    line_thickness: u32,
    text_colour: Rgb<u8>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self {
            font: FontArc::try_from_slice(EMBEDDED_FONT).expect("embedded DejaVuSans.ttf is a valid font"),
            font_size: LABEL_FONT_SIZE,
            label_offset: LABEL_OFFSET,
            label_padding: LABEL_PADDING,
            line_thickness: LINE_THICKNESS,
            text_colour: Rgb(LABEL_TEXT_COLOUR),
        }
    }
}

impl std::fmt::Debug for Annotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotator")
            .field("font_size", &self.font_size)
            .field("label_offset", &self.label_offset)
            .field("label_padding", &self.label_padding)
            .field("line_thickness", &self.line_thickness)
            .finish()
    }
}

impl Annotator {
    pub fn new(font: FontArc) -> Self {
        Self {
            font,
            ..Default::default()
        }
    }

    /// Replaces the embedded DejaVu Sans with a TrueType/OpenType font from disk.
    pub fn from_font_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.as_ref().display(), e))?;
        Ok(Self::new(font))
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_label_offset(mut self, offset: i32) -> Self {
        self.label_offset = offset;
        self
    }

    pub fn with_label_padding(mut self, padding: i32) -> Self {
        self.label_padding = padding.max(0);
        self
    }

    pub fn with_line_thickness(mut self, thickness: u32) -> Self {
        self.line_thickness = thickness.max(1);
        self
    }

    /// Returns a copy of `image` with every detection drawn in. `image` is left untouched.
    ///
    /// Boxes are clipped to the canvas first; a box entirely outside it is not drawn.
    pub fn annotate(&self, image: &RgbImage, detections: &[LeafDetection]) -> RgbImage {
        let mut canvas = image.clone();
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        for detection in detections {
            let bbox = detection.bbox.clamp_to(w, h);
            if !bbox.is_well_formed() {
                continue;
            }
            self.draw_box(&mut canvas, detection, &bbox);
            self.draw_label(&mut canvas, detection, &bbox);
        }
        canvas
    }

    fn draw_box(&self, canvas: &mut RgbImage, detection: &LeafDetection, bbox: &LeafBox) {
        let (x1, y1, x2, y2) = bbox.as_x1y1_x2y2_i32();
        let colour = detection.class.colour();

        for t in 0..self.line_thickness as i32 {
            let w = x2 - x1 - 2 * t;
            let h = y2 - y1 - 2 * t;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(x1 + t, y1 + t).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(canvas, rect, colour);
        }
    }

    /// Size of the caption text in pixels.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        text_size(PxScale::from(self.font_size), &self.font, text)
    }

    /// Tag rectangle for a caption of `text_w` x `text_h` above a box whose
    /// top-left corner is `(x1, y1)`, kept inside the canvas when possible.
    pub fn label_rect(&self, canvas_w: u32, canvas_h: u32, x1: i32, y1: i32, text_w: u32, text_h: u32) -> Rect {
        let pad = self.label_padding;
        let to_i32 = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        let rect_w = to_i32(text_w).saturating_add(pad.saturating_mul(2));
        let rect_h = to_i32(text_h).saturating_add(pad.saturating_mul(2));
        let (canvas_w, canvas_h) = (to_i32(canvas_w), to_i32(canvas_h));

        let mut x = x1;
        let mut y = y1.saturating_sub(self.label_offset).saturating_sub(rect_h);

        if x.saturating_add(rect_w) > canvas_w {
            x = canvas_w.saturating_sub(rect_w);
        }
        if y.saturating_add(rect_h) > canvas_h {
            y = canvas_h.saturating_sub(rect_h);
        }
        Rect::at(x.max(0), y.max(0)).of_size(rect_w.max(1) as u32, rect_h.max(1) as u32)
    }

    fn draw_label(&self, canvas: &mut RgbImage, detection: &LeafDetection, bbox: &LeafBox) {
        let caption = detection.caption();
        let (text_w, text_h) = self.measure(&caption);
        let (x1, y1, _, _) = bbox.as_x1y1_x2y2_i32();
        let rect = self.label_rect(canvas.width(), canvas.height(), x1, y1, text_w, text_h);

        draw_filled_rect_mut(canvas, rect, detection.class.colour());

        draw_text_mut(
            canvas,
            self.text_colour,
            rect.left() + self.label_padding,
            rect.top() + self.label_padding,
            PxScale::from(self.font_size),
            &self.font,
            &caption,
        );
    }
}
