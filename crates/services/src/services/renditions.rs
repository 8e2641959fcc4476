//! Derived rendition generation.
//!
//! Thumbnails are cropped with an entropy-guided strategy so the busiest
//! part of the frame survives the fixed bounding box; previews keep the full
//! frame at a fixed height. Both respect the EXIF orientation of the source.

use std::path::Path;

use image::{DynamicImage, GenericImageView, GrayImage};
use thiserror::Error;

/// Thumbnail bounding box.
pub const THUMBNAIL_WIDTH: u32 = 300;
pub const THUMBNAIL_HEIGHT: u32 = 200;

/// Preview height; width follows the source proportions.
pub const PREVIEW_HEIGHT: u32 = 800;

/// Largest strip trimmed per entropy-crop step, in pixels.
const CROP_STEP: u32 = 16;

#[derive(Debug, Error)]
pub enum RenditionError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct RenditionGenerator {
    thumbnail_width: u32,
    thumbnail_height: u32,
    preview_height: u32,
}

impl Default for RenditionGenerator {
    fn default() -> Self {
        Self {
            thumbnail_width: THUMBNAIL_WIDTH,
            thumbnail_height: THUMBNAIL_HEIGHT,
            preview_height: PREVIEW_HEIGHT,
        }
    }
}

impl RenditionGenerator {
    /// Produce the thumbnail rendition. Blocking; run on a blocking thread.
    pub fn generate_thumbnail(
        &self,
        src: &Path,
        dst: &Path,
        orientation: Option<u32>,
    ) -> Result<(), RenditionError> {
        let img = orient(image::open(src)?, orientation);
        let (x, y, w, h) = entropy_crop_window(&img, self.thumbnail_width, self.thumbnail_height);
        let cropped = img.crop_imm(x, y, w, h);
        let thumb = cropped.resize_exact(
            self.thumbnail_width,
            self.thumbnail_height,
            image::imageops::FilterType::Lanczos3,
        );
        thumb.save(dst)?;
        Ok(())
    }

    /// Produce the preview rendition. Blocking; run on a blocking thread.
    pub fn generate_preview(
        &self,
        src: &Path,
        dst: &Path,
        orientation: Option<u32>,
    ) -> Result<(), RenditionError> {
        let img = orient(image::open(src)?, orientation);
        let (w, h) = img.dimensions();
        let preview = if h > self.preview_height {
            let scaled_w = ((w as u64 * self.preview_height as u64) / h as u64).max(1) as u32;
            img.resize_exact(
                scaled_w,
                self.preview_height,
                image::imageops::FilterType::Lanczos3,
            )
        } else {
            img
        };
        preview.save(dst)?;
        Ok(())
    }
}

/// Apply the transform implied by an EXIF orientation value (1..=8).
fn orient(img: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation.unwrap_or(1) {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Find a crop window with the target aspect ratio by repeatedly trimming
/// the edge strip carrying less entropy, so salient content is preserved.
fn entropy_crop_window(img: &DynamicImage, target_w: u32, target_h: u32) -> (u32, u32, u32, u32) {
    let (iw, ih) = img.dimensions();
    let scale = f64::min(iw as f64 / target_w as f64, ih as f64 / target_h as f64);
    let want_w = ((target_w as f64 * scale).round() as u32).clamp(1, iw);
    let want_h = ((target_h as f64 * scale).round() as u32).clamp(1, ih);

    let gray = img.to_luma8();
    let (mut x, mut y, mut w, mut h) = (0u32, 0u32, iw, ih);

    while w > want_w {
        let strip = (w - want_w).min(CROP_STEP);
        let left = strip_entropy(&gray, x, y, strip, h);
        let right = strip_entropy(&gray, x + w - strip, y, strip, h);
        if left < right {
            x += strip;
        }
        w -= strip;
    }

    while h > want_h {
        let strip = (h - want_h).min(CROP_STEP);
        let top = strip_entropy(&gray, x, y, w, strip);
        let bottom = strip_entropy(&gray, x, y + h - strip, w, strip);
        if top < bottom {
            y += strip;
        }
        h -= strip;
    }

    (x, y, w, h)
}

/// Shannon entropy of the greyscale histogram over a region.
fn strip_entropy(gray: &GrayImage, x: u32, y: u32, w: u32, h: u32) -> f64 {
    let mut hist = [0u32; 256];
    for py in y..y + h {
        for px in x..x + w {
            hist[gray.get_pixel(px, py).0[0] as usize] += 1;
        }
    }
    let total = (w as u64 * h as u64) as f64;
    hist.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}
