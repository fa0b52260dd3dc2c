//! Letterbox preprocessing for the YOLO input tensor.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::{CroppedImageMut, Image as FirImage},
    pixels::PixelType,
    ResizeAlg, ResizeOptions, Resizer, FilterType,
};
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

const LETTERBOX_FILL: u8 = 114;

/// Model input plus what is needed to map boxes back to the source image.
#[derive(Debug, Clone)]
pub struct Letterboxed {
    pub tensor: Array4<f32>,
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub src_width: u32,
    pub src_height: u32,
}

impl Letterboxed {
    /// Maps a `(cx, cy, w, h)` box from model space back to source pixels as `(x1, y1, x2, y2)`.
    pub fn unmap_cxcywh(&self, cx: f32, cy: f32, w: f32, h: f32) -> (f32, f32, f32, f32) {
        let cx = (cx - self.pad_x) / self.scale;
        let cy = (cy - self.pad_y) / self.scale;
        let (w, h) = (w / self.scale, h / self.scale);
        let (sw, sh) = (self.src_width as f32, self.src_height as f32);
        (
            (cx - w / 2.).clamp(0., sw),
            (cy - h / 2.).clamp(0., sh),
            (cx + w / 2.).clamp(0., sw),
            (cy + h / 2.).clamp(0., sh),
        )
    }
}

pub fn to_fir_image<'a>(image: RgbImage) -> Result<FirImage<'a>> {
    let (width, height) = image.dimensions();
    Ok(FirImage::from_vec_u8(width, height, image.into_raw(), PixelType::U8x3)?)
}

/// Resizes `image` into a centered `target_w` x `target_h` letterbox and normalizes it to NCHW `[0, 1]`.
pub fn letterbox(image: &DynamicImage, target_h: u32, target_w: u32) -> Result<Letterboxed> {
    let (w0, h0) = (image.width(), image.height());
    if w0 == 0 || h0 == 0 {
        bail!("Cannot letterbox an empty image ({}x{})", w0, h0);
    }
    let src = to_fir_image(image.to_rgb8())?;

    let scale = (target_w as f32 / w0 as f32).min(target_h as f32 / h0 as f32);
    let new_w = ((w0 as f32 * scale).round() as u32).clamp(1, target_w);
    let new_h = ((h0 as f32 * scale).round() as u32).clamp(1, target_h);

    let mut padded = FirImage::from_vec_u8(
        target_w,
        target_h,
        vec![LETTERBOX_FILL; (target_w * target_h * 3) as usize],
        PixelType::U8x3,
    )?;

    let (left, top) = ((target_w - new_w) / 2, (target_h - new_h) / 2);
    {
        let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
        let mut resizer = Resizer::new();
        let mut cropped = CroppedImageMut::new(&mut padded, left, top, new_w, new_h)?;
        resizer.resize(&src, &mut cropped, &options)?;
    }

    Ok(Letterboxed {
        tensor: nchw_normalize(&padded)?,
        scale,
        pad_x: left as f32,
        pad_y: top as f32,
        src_width: w0,
        src_height: h0,
    })
}

fn nchw_normalize(img: &FirImage) -> Result<Array4<f32>> {
    let buf = img.buffer();
    let w = img.width() as usize;
    let h = img.height() as usize;

    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let hw = w * h;
    let mut out = vec![0.0f32; buf.len()];
    for i in 0..hw {
        out[i] = buf[3 * i] as f32 / 255.0;
        out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
        out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
    }

    Ok(Array4::from_shape_vec((1, 3, h, w), out)?)
}
