use std::{path::Path, sync::Arc};

use crate::{
    assets::decode::unpremultiply_rgba8_in_place,
    foundation::error::{TraitStackError, TraitStackResult},
};

/// Largest raster edge accepted for a vector layer.
const MAX_DIM: u32 = 16_384;

/// Pixel size a vector layer is rasterized at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RasterSize {
    /// Build a size, rejecting zero and oversized edges.
    pub fn new(width: u32, height: u32) -> TraitStackResult<Self> {
        if width == 0 || height == 0 {
            return Err(TraitStackError::config(format!(
                "raster size must be non-zero, got {width}x{height}"
            )));
        }
        if width > MAX_DIM || height > MAX_DIM {
            return Err(TraitStackError::config(format!(
                "raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for RasterSize {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

/// Capability turning vector layer bytes into pixels.
///
/// The compositor only knows this trait, so tests and embedders can swap the renderer.
pub trait VectorRasterizer: Send + Sync {
    /// Rasterize `bytes` into a straight-alpha RGBA8 image of exactly `size`.
    ///
    /// `resources_dir` is where relative references inside the document are looked up.
    fn rasterize(
        &self,
        bytes: &[u8],
        resources_dir: Option<&Path>,
        size: RasterSize,
    ) -> TraitStackResult<image::RgbaImage>;
}

/// [`VectorRasterizer`] backed by `usvg` + `resvg`.
#[derive(Clone)]
pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for ResvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResvgRasterizer")
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}

impl ResvgRasterizer {
    /// Rasterizer with the system fonts loaded, for SVG layers containing text.
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Rasterizer without any font; text nodes render as nothing.
    pub fn without_fonts() -> Self {
        Self {
            fontdb: Arc::new(usvg::fontdb::Database::new()),
        }
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorRasterizer for ResvgRasterizer {
    fn rasterize(
        &self,
        bytes: &[u8],
        resources_dir: Option<&Path>,
        size: RasterSize,
    ) -> TraitStackResult<image::RgbaImage> {
        let opts = usvg::Options {
            resources_dir: resources_dir.map(Path::to_path_buf),
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(bytes, &opts)
            .map_err(|e| TraitStackError::decode(format!("parse svg tree: {e}")))?;
        rasterize_tree(&tree, size)
    }
}

/// Render `tree` stretched to `size`, returning straight-alpha pixels.
fn rasterize_tree(tree: &usvg::Tree, size: RasterSize) -> TraitStackResult<image::RgbaImage> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width, size.height)
        .ok_or_else(|| TraitStackError::decode("failed to allocate svg pixmap"))?;

    let sx = (size.width as f32) / tree.size().width();
    let sy = (size.height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(tree, xform, &mut pixmap.as_mut());

    let mut data = pixmap.take();
    unpremultiply_rgba8_in_place(&mut data);
    image::RgbaImage::from_raw(size.width, size.height, data)
        .ok_or_else(|| TraitStackError::decode("svg pixmap has unexpected length"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
