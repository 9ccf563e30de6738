//! Image export (binary PPM and PNG)

use std::fs;
use std::path::Path;

use super::SceneError;
use crate::rasterizer::Framebuffer;

/// Binary PPM: `P6\n<width> <height>\n255\n` then RGB triples, top row first
pub fn encode_ppm(fb: &Framebuffer) -> Vec<u8> {
    let header = format!("P6\n{} {}\n255\n", fb.width, fb.height);
    let mut bytes = Vec::with_capacity(header.len() + fb.width * fb.height * 3);
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(&fb.to_rgb8());
    bytes
}

pub fn write_ppm<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), SceneError> {
    fs::write(path, encode_ppm(fb))?;
    Ok(())
}

pub fn save_png<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), SceneError> {
    let img = image::RgbaImage::from_raw(fb.width as u32, fb.height as u32, fb.to_rgba8())
        .ok_or_else(|| SceneError::Invalid("framebuffer size does not match its pixels".to_string()))?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Save by file extension: `.ppm` or `.png`
pub fn save_image<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), SceneError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "ppm" => write_ppm(fb, path),
        "png" => save_png(fb, path),
        _ => Err(SceneError::Invalid(format!(
            "unsupported image extension '{}' (use .ppm or .png)",
            ext
        ))),
    }
}
