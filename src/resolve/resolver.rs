use std::path::PathBuf;

use crate::{
    catalog::model::{Catalog, FileEntry, FileOption, VariantDef},
    foundation::error::ExclusionConflict,
    resolve::model::{RawItemSelection, ResolvedItem, ResolvedTrait},
};

/// Resolve one raw selection against `catalog`.
///
/// Selections are visited in column order:
///
/// 1. empty or unknown selections are dropped;
/// 2. exclusion rules are checked against every *other* selection of the item, and the first
///    conflict vetoes the whole item (the returned item is broken and carries no traits);
/// 3. the file option is matched against the raw selections (never against already resolved
///    traits), so the result does not depend on the order in which traits resolve.
///
/// The function is pure: the same inputs always give the same [`ResolvedItem`].
pub fn resolve(catalog: &Catalog, raw: &RawItemSelection) -> ResolvedItem {
    let mut traits = Vec::with_capacity(raw.selections.len());
    let mut unknown = Vec::new();

    for (pos, (category, variant)) in raw.selections.iter().enumerate() {
        if variant.is_empty() {
            continue;
        }
        let Some(def) = catalog.lookup_variant(category, variant) else {
            tracing::debug!(
                item = %raw.name,
                %category,
                %variant,
                "selection not in catalog, dropped"
            );
            unknown.push((category.clone(), variant.clone()));
            continue;
        };

        if let Some(value) = excluded_value(def, raw, pos) {
            return ResolvedItem::vetoed(
                raw,
                ExclusionConflict {
                    item: raw.name.clone(),
                    category: category.clone(),
                    variant: variant.clone(),
                    value: value.to_string(),
                },
            );
        }

        traits.push(ResolvedTrait {
            category: category.clone(),
            variant_name: variant.clone(),
            hidden: def.hidden,
            file_paths: select_files(&def.file, raw),
        });
    }

    ResolvedItem {
        index: raw.index,
        name: raw.name.clone(),
        attribute_number: raw.attribute_number.clone(),
        traits,
        unknown,
        broken: None,
    }
}

/// Items split by [`resolve_all`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Items that may be rendered, in input order.
    pub items: Vec<ResolvedItem>,
    /// Items vetoed by an exclusion rule, in input order.
    pub broken: Vec<ResolvedItem>,
}

/// Resolve every raw item first, then split usable items from vetoed ones.
pub fn resolve_all(catalog: &Catalog, raw_items: &[RawItemSelection]) -> Resolution {
    let resolved: Vec<ResolvedItem> = raw_items
        .iter()
        .map(|raw| resolve(catalog, raw))
        .collect();
    let (broken, items) = resolved.into_iter().partition(ResolvedItem::is_broken);
    Resolution { items, broken }
}

fn excluded_value<'a>(
    def: &'a VariantDef,
    raw: &RawItemSelection,
    pos: usize,
) -> Option<&'a str> {
    def.exclude
        .iter()
        .find(|excluded| {
            raw.selections
                .iter()
                .enumerate()
                .any(|(i, (_, v))| i != pos && v == *excluded)
        })
        .map(String::as_str)
}

/// Pick the layers of a file option.
///
/// For conditional options, entries are scanned in declared order: a matching conditional
/// entry always replaces the current pick (last match wins), a default entry is only taken
/// while nothing has been picked yet.
fn select_files(option: &FileOption, raw: &RawItemSelection) -> Vec<PathBuf> {
    match option {
        FileOption::Simple(path) => vec![path.clone()],
        FileOption::List(paths) => paths.clone(),
        FileOption::Conditional(entries) => {
            let mut picked: Option<&[PathBuf]> = None;
            for entry in entries {
                match entry {
                    FileEntry::When { condition, paths } => {
                        if condition.iter().any(|c| raw.selects_value(c)) {
                            picked = Some(paths.as_slice());
                        }
                    }
                    FileEntry::Default(paths) => {
                        if picked.is_none() {
                            picked = Some(paths.as_slice());
                        }
                    }
                }
            }
            picked.map(<[PathBuf]>::to_vec).unwrap_or_default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
