use std::{
    collections::{BTreeMap, BTreeSet},
    path::PathBuf,
};

/// Immutable description of every trait category, its variants and their rules.
///
/// A catalog is loaded once per run (see [`Catalog::from_path`]) and shared read-only
/// between all items, so lookups never mutate it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub(crate) categories: BTreeMap<String, BTreeMap<String, VariantDef>>,
}

impl Catalog {
    /// Build a catalog from already-typed categories.
    pub fn new(categories: BTreeMap<String, BTreeMap<String, VariantDef>>) -> Self {
        Self { categories }
    }

    /// Look up the definition of `variant` inside `category`.
    ///
    /// Returns `None` when either the category or the variant is absent; callers treat that
    /// the same way as an empty selection.
    pub fn lookup_variant(&self, category: &str, variant: &str) -> Option<&VariantDef> {
        self.categories.get(category)?.get(variant)
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Variants declared for `category`, in sorted order.
    pub fn variants(&self, category: &str) -> impl Iterator<Item = (&str, &VariantDef)> {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|variants| variants.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// `true` when no category is declared.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// One variant of a trait category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantDef {
    /// Image file(s) applied when the variant is selected.
    pub file: FileOption,
    /// Applied to the image but left out of metadata attributes.
    pub hidden: bool,
    /// Values that may not be selected in the same item as this variant.
    pub exclude: BTreeSet<String>,
}

impl VariantDef {
    /// Variant drawing `file` with no visibility or exclusion rules.
    pub fn new(file: FileOption) -> Self {
        Self {
            file,
            hidden: false,
            exclude: BTreeSet::new(),
        }
    }

    /// Every path named by the file option, in declaration order, duplicates included.
    pub fn declared_paths(&self) -> Vec<&PathBuf> {
        match &self.file {
            FileOption::Simple(path) => vec![path],
            FileOption::List(paths) => paths.iter().collect(),
            FileOption::Conditional(entries) => {
                entries.iter().flat_map(|e| e.paths().iter()).collect()
            }
        }
    }
}

/// File option of a variant, decided once when the catalog is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOption {
    /// A single layer.
    Simple(PathBuf),
    /// Several layers drawn bottom to top.
    List(Vec<PathBuf>),
    /// Layers picked according to the other selections of the item.
    Conditional(Vec<FileEntry>),
}

/// One entry of a [`FileOption::Conditional`] list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileEntry {
    /// Used when no conditional entry matches.
    Default(Vec<PathBuf>),
    /// Used when any of `condition` is selected in the same item.
    When {
        /// Variant names that activate the entry.
        condition: BTreeSet<String>,
        /// Layers drawn bottom to top.
        paths: Vec<PathBuf>,
    },
}

impl FileEntry {
    /// Layers named by the entry.
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::Default(paths) | Self::When { paths, .. } => paths,
        }
    }
}
