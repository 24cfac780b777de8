use std::path::Path;

use anyhow::Context;

use crate::{
    assets::svg_raster::{RasterSize, VectorRasterizer},
    foundation::error::{TraitStackError, TraitStackResult},
};

/// `true` for layers handed to a [`VectorRasterizer`] instead of the raster decoder.
pub fn is_vector_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// Decode encoded raster bytes (format sniffed from content) into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> TraitStackResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| TraitStackError::decode(format!("decode image from memory: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Load one layer file as straight-alpha RGBA8.
///
/// Vector layers are rasterized at `vector_size`; external resources they reference are
/// resolved next to the file.
pub fn load_layer(
    path: &Path,
    vector_size: RasterSize,
    rasterizer: &dyn VectorRasterizer,
) -> TraitStackResult<image::RgbaImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read layer '{}'", path.display()))?;
    let decoded = if is_vector_path(path) {
        rasterizer.rasterize(&bytes, path.parent(), vector_size)
    } else {
        decode_image(&bytes)
    };
    decoded.map_err(|e| match e {
        TraitStackError::Decode(msg) => {
            TraitStackError::decode(format!("layer '{}': {msg}", path.display()))
        }
        other => other,
    })
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
