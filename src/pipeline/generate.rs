use std::{
    collections::BTreeMap,
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    assets::svg_raster::VectorRasterizer,
    catalog::model::Catalog,
    foundation::error::{ExclusionConflict, TraitStackError, TraitStackResult},
    metadata::{attributes::build_attributes, blueprint::Blueprint},
    pipeline::config::{GenerateConfig, OutputNaming, output_base},
    render::compositor::LayerCompositor,
    resolve::{
        model::{RawItemSelection, ResolvedItem},
        resolver::{Resolution, resolve_all},
    },
};

/// Image and metadata of one item, produced in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemArtifacts {
    /// Composited straight-alpha image.
    pub image: image::RgbaImage,
    /// Blueprint merged with the item's name and attributes.
    pub metadata: serde_json::Value,
}

/// Files written for one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemOutput {
    /// 1-based table row.
    pub index: usize,
    /// Item name.
    pub name: String,
    /// Written `<base>.png`.
    pub image_path: PathBuf,
    /// Written `<base>.json`.
    pub metadata_path: PathBuf,
}

/// An item that resolved but could not be generated.
#[derive(Debug)]
pub struct ItemFailure {
    /// 1-based table row.
    pub index: usize,
    /// Item name.
    pub name: String,
    /// What went wrong.
    pub error: TraitStackError,
}

/// An item left out in name mode because a later row of the same name takes its files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupersededItem {
    /// 1-based table row of the dropped item.
    pub index: usize,
    /// Shared item name.
    pub name: String,
    /// Row of the item that is rendered under that name instead.
    pub by_index: usize,
}

/// Outcome of [`Generator::generate`].
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Items considered by the run (after the single-item selector).
    pub requested: usize,
    /// Items whose image and metadata were both written, in input order.
    pub generated: Vec<ItemOutput>,
    /// Items vetoed by an exclusion rule.
    pub excluded: Vec<ExclusionConflict>,
    /// Items dropped in name mode in favour of the last row with the same name.
    pub superseded: Vec<SupersededItem>,
    /// Items that failed while compositing or writing.
    pub failures: Vec<ItemFailure>,
}

impl GenerationReport {
    /// Number of items written.
    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }

    /// `true` when every requested item was written or superseded by a same-named row.
    pub fn is_complete(&self) -> bool {
        self.generated.len() + self.superseded.len() == self.requested
    }
}

/// Drives a whole run: resolve every item, then composite and write them on a worker pool.
///
/// All inputs are read-only once the generator is built, so items are processed concurrently
/// without locking; each item writes only its own pair of files.
#[derive(Debug)]
pub struct Generator {
    config: GenerateConfig,
    catalog: Catalog,
    blueprint: Blueprint,
    compositor: LayerCompositor,
}

impl Generator {
    /// Build a generator. Fails on an unusable configuration.
    pub fn new(
        config: GenerateConfig,
        catalog: Catalog,
        blueprint: Blueprint,
        rasterizer: Box<dyn VectorRasterizer>,
    ) -> TraitStackResult<Self> {
        config.validate()?;
        let compositor = LayerCompositor::new(config.compositor_settings(), rasterizer);
        Ok(Self {
            config,
            catalog,
            blueprint,
            compositor,
        })
    }

    /// Configuration of this run.
    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// Generate every item of `raw_items` (or only the selected one).
    ///
    /// Item-level problems (exclusion conflicts, missing layers, decode or write failures) are
    /// logged and reported; only configuration problems and an unusable output directory
    /// abort the run.
    pub fn generate(
        &self,
        raw_items: &[RawItemSelection],
    ) -> TraitStackResult<GenerationReport> {
        let selected = self.select(raw_items)?;
        let Resolution { items, broken } = resolve_all(&self.catalog, selected);

        let excluded: Vec<ExclusionConflict> =
            broken.into_iter().filter_map(|item| item.broken).collect();
        for conflict in &excluded {
            tracing::warn!("skipping item: {conflict}");
        }
        let (items, superseded) = match self.config.naming {
            OutputNaming::Name => keep_last_per_name(items),
            OutputNaming::Index => (items, Vec::new()),
        };
        for dropped in &superseded {
            tracing::warn!(
                index = dropped.index,
                name = %dropped.name,
                by_index = dropped.by_index,
                "several items share a name; only the last row is written"
            );
        }

        std::fs::create_dir_all(&self.config.out_dir).with_context(|| {
            format!("create output dir '{}'", self.config.out_dir.display())
        })?;

        let pool = build_thread_pool(self.config.threads)?;
        let outcomes: Vec<Result<ItemOutput, ItemFailure>> = pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    self.render_item(item).map_err(|error| ItemFailure {
                        index: item.index,
                        name: item.name.clone(),
                        error,
                    })
                })
                .collect()
        });

        let mut report = GenerationReport {
            requested: selected.len(),
            excluded,
            superseded,
            ..GenerationReport::default()
        };
        for outcome in outcomes {
            match outcome {
                Ok(output) => report.generated.push(output),
                Err(failure) => {
                    tracing::error!(
                        index = failure.index,
                        name = %failure.name,
                        "item failed: {}",
                        failure.error
                    );
                    report.failures.push(failure);
                }
            }
        }

        tracing::info!(
            requested = report.requested,
            generated = report.generated_count(),
            excluded = report.excluded.len(),
            superseded = report.superseded.len(),
            failed = report.failures.len(),
            "generation finished"
        );
        Ok(report)
    }

    /// Composite and describe one resolved item without touching the output directory.
    pub fn build_item(&self, item: &ResolvedItem) -> TraitStackResult<ItemArtifacts> {
        if let Some(conflict) = &item.broken {
            return Err(conflict.clone().into());
        }
        let image = self.compositor.composite(&item.layer_paths())?;
        let attributes = build_attributes(item, self.config.include_attribute_number);
        let metadata = self.blueprint.render(&item.name, &attributes)?;
        Ok(ItemArtifacts { image, metadata })
    }

    /// Build one item and write its image and metadata files.
    ///
    /// Both documents are encoded in memory and written under temporary names first; they only
    /// take their final names once both writes succeeded, so an item never leaves half of its
    /// output behind.
    #[tracing::instrument(skip(self, item), fields(index = item.index, name = %item.name))]
    pub fn render_item(&self, item: &ResolvedItem) -> TraitStackResult<ItemOutput> {
        let base = output_base(item, self.config.naming)?;
        let artifacts = self.build_item(item)?;

        let mut png = Vec::new();
        artifacts
            .image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("encode png")?;
        let json = serde_json::to_vec(&artifacts.metadata)
            .map_err(|e| TraitStackError::serde(format!("serialize metadata: {e}")))?;

        let image_path = self.config.out_dir.join(format!("{base}.png"));
        let metadata_path = self.config.out_dir.join(format!("{base}.json"));
        commit_pair(
            (image_path.as_path(), png.as_slice()),
            (metadata_path.as_path(), json.as_slice()),
        )?;

        tracing::debug!(path = %image_path.display(), "item written");
        Ok(ItemOutput {
            index: item.index,
            name: item.name.clone(),
            image_path,
            metadata_path,
        })
    }

    fn select<'a>(
        &self,
        raw_items: &'a [RawItemSelection],
    ) -> TraitStackResult<&'a [RawItemSelection]> {
        let Some(wanted) = self.config.only_item else {
            return Ok(raw_items);
        };
        let pos = raw_items
            .iter()
            .position(|raw| raw.index == wanted)
            .ok_or_else(|| {
                TraitStackError::config(format!(
                    "item {wanted} not found (table has {} items)",
                    raw_items.len()
                ))
            })?;
        Ok(&raw_items[pos..=pos])
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> TraitStackResult<()> {
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}

fn rename_file(from: &Path, to: &Path) -> TraitStackResult<()> {
    std::fs::rename(from, to)
        .with_context(|| format!("move '{}' to '{}'", from.display(), to.display()))?;
    Ok(())
}

/// Hidden `.part` sibling a file is written to before taking its final name.
fn part_path(path: &Path) -> PathBuf {
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".part");
    path.with_file_name(name)
}

/// Write an image and its metadata so that either both files appear or neither does.
fn commit_pair(image: (&Path, &[u8]), metadata: (&Path, &[u8])) -> TraitStackResult<()> {
    let image_part = part_path(image.0);
    let metadata_part = part_path(metadata.0);

    let staged = write_file(&image_part, image.1)
        .and_then(|()| write_file(&metadata_part, metadata.1))
        .and_then(|()| rename_file(&image_part, image.0));
    if let Err(e) = staged {
        std::fs::remove_file(&image_part).ok();
        std::fs::remove_file(&metadata_part).ok();
        return Err(e);
    }
    if let Err(e) = rename_file(&metadata_part, metadata.0) {
        std::fs::remove_file(image.0).ok();
        std::fs::remove_file(&metadata_part).ok();
        return Err(e);
    }
    Ok(())
}

/// Keep the last resolved item of every name, so each output pair has exactly one writer.
fn keep_last_per_name(items: Vec<ResolvedItem>) -> (Vec<ResolvedItem>, Vec<SupersededItem>) {
    let mut last: BTreeMap<String, usize> = BTreeMap::new();
    for item in &items {
        last.insert(item.name.clone(), item.index);
    }

    let mut kept = Vec::with_capacity(last.len());
    let mut superseded = Vec::new();
    for item in items {
        match last.get(&item.name).copied() {
            Some(by_index) if by_index != item.index => superseded.push(SupersededItem {
                index: item.index,
                name: item.name,
                by_index,
            }),
            _ => kept.push(item),
        }
    }
    (kept, superseded)
}

fn build_thread_pool(threads: Option<usize>) -> TraitStackResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        TraitStackError::config(format!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/generate.rs"]
mod tests;
