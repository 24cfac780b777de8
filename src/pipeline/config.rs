use std::path::PathBuf;

use crate::{
    assets::svg_raster::RasterSize,
    foundation::error::{TraitStackError, TraitStackResult},
    render::compositor::CompositorSettings,
    resolve::model::ResolvedItem,
};

/// How the two output files of an item are named.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputNaming {
    /// `<index>.png` / `<index>.json`, using the 1-based table row.
    #[default]
    Index,
    /// `<name>.png` / `<name>.json`, using the item name.
    Name,
}

/// Immutable settings of one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Directory receiving the image/metadata pairs. Created when missing.
    pub out_dir: PathBuf,
    /// Directory relative layer paths are resolved against.
    pub assets_root: PathBuf,
    /// Size of a vector layer drawn before any canvas exists.
    pub default_vector_size: RasterSize,
    /// Prepend an `attribute-number` attribute to every metadata document.
    pub include_attribute_number: bool,
    /// Output file naming.
    pub naming: OutputNaming,
    /// Only generate the item at this 1-based row.
    pub only_item: Option<usize>,
    /// Worker threads; `None` lets rayon decide.
    pub threads: Option<usize>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            assets_root: PathBuf::from("."),
            default_vector_size: RasterSize::default(),
            include_attribute_number: false,
            naming: OutputNaming::Index,
            only_item: None,
            threads: None,
        }
    }
}

impl GenerateConfig {
    /// Reject settings that cannot drive a run.
    pub fn validate(&self) -> TraitStackResult<()> {
        if self.threads == Some(0) {
            return Err(TraitStackError::config("'threads' must be >= 1 when set"));
        }
        if self.only_item == Some(0) {
            return Err(TraitStackError::config("item rows are numbered from 1"));
        }
        Ok(())
    }

    /// Compositor settings derived from this configuration.
    pub fn compositor_settings(&self) -> CompositorSettings {
        CompositorSettings {
            default_vector_size: self.default_vector_size,
            assets_root: self.assets_root.clone(),
        }
    }
}

/// Base file name (no extension) shared by an item's image and metadata files.
pub fn output_base(item: &ResolvedItem, naming: OutputNaming) -> TraitStackResult<String> {
    match naming {
        OutputNaming::Index => Ok(item.index.to_string()),
        OutputNaming::Name => {
            let name = item.name.as_str();
            let unusable = name.trim().is_empty()
                || name == "."
                || name == ".."
                || name.contains(['/', '\\', '\0']);
            if unusable {
                return Err(TraitStackError::InvalidOutputName(name.to_string()));
            }
            Ok(name.to_string())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
