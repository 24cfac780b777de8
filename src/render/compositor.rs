use std::path::{Path, PathBuf};

use crate::{
    assets::{
        decode::{is_vector_path, load_layer},
        svg_raster::{RasterSize, VectorRasterizer},
    },
    foundation::error::{TraitStackError, TraitStackResult},
    render::composite::overlay_top_left,
};

/// Settings of a [`LayerCompositor`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositorSettings {
    /// Size vector layers are rasterized at while no canvas exists yet.
    pub default_vector_size: RasterSize,
    /// Directory relative layer paths are resolved against.
    pub assets_root: PathBuf,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            default_vector_size: RasterSize::default(),
            assets_root: PathBuf::from("."),
        }
    }
}

/// Stacks the layers of one item into a single straight-alpha RGBA8 image.
///
/// The first drawn layer fixes the canvas size. Every later layer is aligned on the top-left
/// corner and composited with the "over" operator; vector layers are rasterized at the
/// canvas size.
pub struct LayerCompositor {
    settings: CompositorSettings,
    rasterizer: Box<dyn VectorRasterizer>,
}

impl std::fmt::Debug for LayerCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerCompositor")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl LayerCompositor {
    /// Build a compositor using `rasterizer` for vector layers.
    pub fn new(settings: CompositorSettings, rasterizer: Box<dyn VectorRasterizer>) -> Self {
        Self {
            settings,
            rasterizer,
        }
    }

    /// Settings this compositor was built with.
    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    /// Absolute (or root-relative) location of a declared layer path.
    pub fn layer_location(&self, layer: &Path) -> PathBuf {
        self.settings.assets_root.join(layer)
    }

    /// Composite `layers` bottom to top.
    ///
    /// Layers whose file does not exist are skipped with a warning. Fails with
    /// [`TraitStackError::NoLayers`] when nothing was drawn.
    pub fn composite(&self, layers: &[PathBuf]) -> TraitStackResult<image::RgbaImage> {
        let mut canvas: Option<image::RgbaImage> = None;

        for layer in layers {
            let path = self.layer_location(layer);
            if !path.is_file() {
                tracing::warn!(layer = %path.display(), "layer file not found, skipped");
                continue;
            }

            let vector_size = match &canvas {
                Some(c) if is_vector_path(&path) => RasterSize::new(c.width(), c.height())
                    .map_err(|e| {
                        TraitStackError::decode(format!(
                            "layer '{}': cannot rasterize at canvas size: {e}",
                            path.display()
                        ))
                    })?,
                _ => self.settings.default_vector_size,
            };
            let loaded = load_layer(&path, vector_size, self.rasterizer.as_ref())?;

            canvas = Some(match canvas.take() {
                None => loaded,
                Some(mut base) => {
                    overlay_top_left(&mut base, &loaded)?;
                    base
                }
            });
        }

        canvas.ok_or(TraitStackError::NoLayers)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
