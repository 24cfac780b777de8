use std::path::PathBuf;

use crate::foundation::error::ExclusionConflict;

/// Raw trait selection of one input row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawItemSelection {
    /// 1-based row position in the input table (header excluded).
    pub index: usize,
    /// Item name, copied into the metadata document.
    pub name: String,
    /// Optional passthrough value of the table's last column.
    pub attribute_number: Option<String>,
    /// `(category, variant)` pairs in column order, empty cells already removed.
    ///
    /// The order fixes both layer z-order and attribute order.
    pub selections: Vec<(String, String)>,
}

impl RawItemSelection {
    /// Convenience constructor used by tests and programmatic callers.
    pub fn new<C, V>(
        index: usize,
        name: impl Into<String>,
        selections: impl IntoIterator<Item = (C, V)>,
    ) -> Self
    where
        C: Into<String>,
        V: Into<String>,
    {
        Self {
            index,
            name: name.into(),
            attribute_number: None,
            selections: selections
                .into_iter()
                .map(|(c, v)| (c.into(), v.into()))
                .collect(),
        }
    }

    /// Set the attribute number.
    pub fn with_attribute_number(mut self, value: impl Into<String>) -> Self {
        self.attribute_number = Some(value.into());
        self
    }

    /// `true` when any selection (of any category) equals `value`.
    pub fn selects_value(&self, value: &str) -> bool {
        self.selections.iter().any(|(_, v)| v == value)
    }
}

/// A selection that survived resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTrait {
    /// Trait category (column name).
    pub category: String,
    /// Selected variant.
    pub variant_name: String,
    /// Drawn but not listed in metadata attributes.
    pub hidden: bool,
    /// Layers to draw, bottom to top. May be empty.
    pub file_paths: Vec<PathBuf>,
}

/// Outcome of resolving one [`RawItemSelection`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedItem {
    /// Row position copied from the raw selection.
    pub index: usize,
    /// Item name.
    pub name: String,
    /// Passthrough attribute number.
    pub attribute_number: Option<String>,
    /// Resolved traits in raw selection order. Always empty for a broken item.
    pub traits: Vec<ResolvedTrait>,
    /// `(category, variant)` selections that named nothing in the catalog.
    pub unknown: Vec<(String, String)>,
    /// Set when an exclusion rule vetoed the whole item.
    pub broken: Option<ExclusionConflict>,
}

impl ResolvedItem {
    /// `true` when the item was vetoed and must not produce any output.
    pub fn is_broken(&self) -> bool {
        self.broken.is_some()
    }

    /// Every layer of the item in compositing order.
    pub fn layer_paths(&self) -> Vec<PathBuf> {
        self.traits
            .iter()
            .flat_map(|t| t.file_paths.iter().cloned())
            .collect()
    }

    pub(crate) fn vetoed(raw: &RawItemSelection, conflict: ExclusionConflict) -> Self {
        Self {
            index: raw.index,
            name: raw.name.clone(),
            attribute_number: raw.attribute_number.clone(),
            traits: Vec::new(),
            unknown: Vec::new(),
            broken: Some(conflict),
        }
    }
}
