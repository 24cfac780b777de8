use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use crate::{
    catalog::model::Catalog,
    foundation::error::ExclusionConflict,
    resolve::{model::RawItemSelection, resolver::resolve},
};

/// Dry-run findings over a catalog and a set of items. Nothing is rendered or written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Items inspected.
    pub items: usize,
    /// Items that resolve and have at least one existing layer.
    pub renderable: usize,
    /// Items vetoed by an exclusion rule.
    pub excluded: Vec<ExclusionConflict>,
    /// `(category, variant)` selections naming nothing in the catalog.
    pub unknown: BTreeSet<(String, String)>,
    /// Catalog paths that do not exist under the assets root.
    pub missing_assets: BTreeSet<PathBuf>,
    /// `(index, name)` of items that would fail with no layers.
    pub without_layers: Vec<(usize, String)>,
}

impl CheckReport {
    /// `true` when nothing was found.
    pub fn is_clean(&self) -> bool {
        self.excluded.is_empty()
            && self.unknown.is_empty()
            && self.missing_assets.is_empty()
            && self.without_layers.is_empty()
    }
}

/// Resolve every item and inspect the catalog's files without rendering anything.
pub fn check(
    catalog: &Catalog,
    raw_items: &[RawItemSelection],
    assets_root: &Path,
) -> CheckReport {
    let exists = |p: &Path| assets_root.join(p).is_file();

    let mut report = CheckReport {
        items: raw_items.len(),
        ..CheckReport::default()
    };

    for category in catalog.categories() {
        for (_, def) in catalog.variants(category) {
            report.missing_assets.extend(
                def.declared_paths()
                    .into_iter()
                    .filter(|p| !exists(p.as_path()))
                    .cloned(),
            );
        }
    }

    for raw in raw_items {
        let item = resolve(catalog, raw);
        report.unknown.extend(item.unknown.iter().cloned());
        if let Some(conflict) = &item.broken {
            report.excluded.push(conflict.clone());
            continue;
        }
        if item.layer_paths().iter().any(|p| exists(p.as_path())) {
            report.renderable += 1;
        } else {
            report.without_layers.push((item.index, item.name.clone()));
        }
    }

    report
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/check.rs"]
mod tests;
