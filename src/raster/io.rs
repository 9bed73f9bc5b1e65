//! I/O helpers for the command-line tool: decoding, PNG export and JSON.
//!
//! - `load_rgba_image`: read a PNG/JPEG into an owned RGBA buffer.
//! - `save_gray_png`: write a grayscale raster or binary mask to a PNG.
//! - `save_f32_png`: write a float map to a PNG, normalized by its maximum.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{GrayImage, ImageF32, RasterView};
use image::{GrayImage as PngGray, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned RGBA buffer decoded from disk.
#[derive(Clone, Debug)]
pub struct RgbaBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RgbaBuffer {
    /// Borrow as a pipeline input.
    pub fn as_input(&self) -> super::InputImage<'_> {
        super::InputImage::rgba(self.width, self.height, &self.data)
    }
}

/// Load an image from disk and convert to 8-bit RGBA.
pub fn load_rgba_image(path: &Path) -> Result<RgbaBuffer, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgba8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(RgbaBuffer {
        width,
        height,
        data: img.into_raw(),
    })
}

/// Save an 8-bit raster to a grayscale PNG.
pub fn save_gray_png(raster: &GrayImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let out = PngGray::from_raw(raster.w as u32, raster.h as u32, raster.data.clone())
        .ok_or_else(|| format!("Failed to create image buffer for {}", path.display()))?;
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save a float map to a grayscale PNG, scaling its maximum to 255.
pub fn save_f32_png(map: &ImageF32, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let max = map.max_value();
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    let mut out = PngGray::new(map.w as u32, map.h as u32);
    for (y, row) in map.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let v = (px * scale).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
