//! Fits source photos into a fixed canvas before they are uploaded.
//!
//! Images that already fit are passed through untouched. Larger images are
//! scaled down uniformly and centered on an opaque black canvas of exactly
//! the requested size, so projectors see no light outside the house.

use std::io::Cursor;

use image::{
    imageops, imageops::FilterType, DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage,
};

use crate::config::PreprocessConfig;
use crate::error::{Result, StudioError};
use crate::models::MediaFile;

/// Placement of the scaled source inside the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Letterbox {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Computes where a `src_w × src_h` image lands inside a `max_w × max_h` box.
///
/// Returns `None` when the source already fits.
pub fn letterbox(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> Result<Option<Letterbox>> {
    if src_w == 0 || src_h == 0 {
        return Err(StudioError::PreprocessError(format!(
            "source image has zero area ({}x{})",
            src_w, src_h
        )));
    }
    if max_w == 0 || max_h == 0 {
        return Err(StudioError::PreprocessError(format!(
            "target box has zero area ({}x{})",
            max_w, max_h
        )));
    }

    if src_w <= max_w && src_h <= max_h {
        return Ok(None);
    }

    // scale = min(max_w / src_w, max_h / src_h), kept in integers so the
    // limiting side lands exactly on the box edge.
    let (src_w64, src_h64, max_w64, max_h64) =
        (src_w as u64, src_h as u64, max_w as u64, max_h as u64);
    let (width, height) = if max_w64 * src_h64 <= max_h64 * src_w64 {
        (max_w64, src_h64 * max_w64 / src_w64)
    } else {
        (src_w64 * max_h64 / src_h64, max_h64)
    };
    let width = (width as u32).clamp(1, max_w);
    let height = (height as u32).clamp(1, max_h);

    Ok(Some(Letterbox {
        width,
        height,
        x: (max_w - width) / 2,
        y: (max_h - height) / 2,
    }))
}

/// Resizes and pads `file` to `max_width × max_height`.
pub fn preprocess_image(file: &MediaFile, max_width: u32, max_height: u32) -> Result<MediaFile> {
    let source = image::load_from_memory(&file.bytes).map_err(|e| {
        StudioError::PreprocessError(format!("could not decode {}: {}", file.name, e))
    })?;
    let (src_w, src_h) = source.dimensions();

    let placement = match letterbox(src_w, src_h, max_width, max_height)? {
        Some(placement) => placement,
        None => {
            log::debug!(
                "{} is {}x{}, within {}x{}; left unchanged",
                file.name,
                src_w,
                src_h,
                max_width,
                max_height
            );
            return Ok(file.clone());
        }
    };

    log::debug!(
        "Letterboxing {} from {}x{} to {}x{} inside {}x{}",
        file.name,
        src_w,
        src_h,
        placement.width,
        placement.height,
        max_width,
        max_height
    );

    let resized = source.resize_exact(placement.width, placement.height, FilterType::Lanczos3);
    let mut canvas = RgbaImage::from_pixel(max_width, max_height, Rgba([0, 0, 0, 255]));
    imageops::overlay(
        &mut canvas,
        &resized.to_rgba8(),
        placement.x as i64,
        placement.y as i64,
    );

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| StudioError::PreprocessError(format!("could not encode PNG: {}", e)))?;

    Ok(MediaFile::new(
        format!("processed-{}", file.name),
        "image/png",
        bytes,
    ))
}

pub fn preprocess_with(file: &MediaFile, config: &PreprocessConfig) -> Result<MediaFile> {
    preprocess_image(file, config.max_width, config.max_height)
}
