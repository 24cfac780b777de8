use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    catalog::model::{Catalog, FileEntry, FileOption, VariantDef},
    foundation::error::{TraitStackError, TraitStackResult},
};

impl Catalog {
    /// Parse a catalog from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TraitStackResult<Self> {
        let doc: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| TraitStackError::catalog(format!("parse catalog JSON: {e}")))?;
        Self::from_value(doc)
    }

    /// Parse a catalog from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TraitStackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open catalog JSON '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json_str(s: &str) -> TraitStackResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Build a catalog from a parsed JSON document.
    ///
    /// The document is `{category: {variant: {file, hidden?, exclude?}}}`. Each variant is
    /// decoded on its own so errors can name the offending `category/variant`.
    pub fn from_value(doc: serde_json::Value) -> TraitStackResult<Self> {
        let serde_json::Value::Object(doc) = doc else {
            return Err(TraitStackError::catalog(
                "catalog root must be an object of categories",
            ));
        };

        let mut categories = BTreeMap::new();
        for (category, variants) in doc {
            let serde_json::Value::Object(variants) = variants else {
                return Err(TraitStackError::catalog(format!(
                    "category '{category}' must be an object of variants"
                )));
            };
            let mut defs = BTreeMap::new();
            for (variant, def) in variants {
                let def: VariantDef = serde_json::from_value(def).map_err(|e| {
                    TraitStackError::catalog(format!("variant '{category}/{variant}': {e}"))
                })?;
                defs.insert(variant, def);
            }
            categories.insert(category, defs);
        }
        Ok(Self::new(categories))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

impl<'de> Deserialize<'de> for VariantDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Repr {
            #[serde(default)]
            file: Option<FileOption>,
            #[serde(default)]
            hidden: bool,
            #[serde(default)]
            exclude: Option<OneOrMany>,
        }

        let repr = Repr::deserialize(deserializer)?;
        Ok(Self {
            file: repr.file.unwrap_or(FileOption::List(Vec::new())),
            hidden: repr.hidden,
            exclude: repr
                .exclude
                .map(OneOrMany::into_vec)
                .unwrap_or_default()
                .into_iter()
                .collect(),
        })
    }
}

impl<'de> Deserialize<'de> for FileOption {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Path(String),
            Entries(Vec<EntryRepr>),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum EntryRepr {
            Path(String),
            Object {
                path: OneOrMany,
                #[serde(rename = "adapted-to", default)]
                adapted_to: Option<OneOrMany>,
            },
        }

        fn paths(v: Vec<String>) -> Vec<PathBuf> {
            v.into_iter().map(PathBuf::from).collect()
        }

        let entries = match Repr::deserialize(deserializer)? {
            Repr::Path(p) => return Ok(Self::Simple(PathBuf::from(p))),
            Repr::Entries(entries) => entries,
        };

        if entries.iter().all(|e| matches!(e, EntryRepr::Path(_))) {
            let list = entries
                .into_iter()
                .filter_map(|e| match e {
                    EntryRepr::Path(p) => Some(PathBuf::from(p)),
                    EntryRepr::Object { .. } => None,
                })
                .collect();
            return Ok(Self::List(list));
        }

        let entries = entries
            .into_iter()
            .map(|e| match e {
                EntryRepr::Path(p) => FileEntry::Default(vec![PathBuf::from(p)]),
                EntryRepr::Object {
                    path,
                    adapted_to: None,
                } => FileEntry::Default(paths(path.into_vec())),
                EntryRepr::Object {
                    path,
                    adapted_to: Some(cond),
                } => FileEntry::When {
                    condition: cond.into_vec().into_iter().collect::<BTreeSet<_>>(),
                    paths: paths(path.into_vec()),
                },
            })
            .collect();
        Ok(Self::Conditional(entries))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/load.rs"]
mod tests;
