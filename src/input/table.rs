use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::error::{TraitStackError, TraitStackResult},
    resolve::model::RawItemSelection,
};

/// Header columns that bound the trait columns of the input table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableLayout {
    /// Column holding the item name. Trait columns start right after it.
    pub name_column: String,
    /// Column closing the trait columns, read as the attribute number.
    pub last_column: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            name_column: "name".to_string(),
            last_column: "attribute_number".to_string(),
        }
    }
}

/// Parsed selection table: a header row followed by one row per item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    /// Header cells.
    pub header: Vec<String>,
    /// Data rows; rows may be shorter than the header.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read a comma separated table.
    pub fn from_reader<R: std::io::Read>(r: R) -> TraitStackResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(r);

        let mut records = reader.records();
        let header = match records.next() {
            Some(record) => record
                .context("read table header")?
                .iter()
                .map(|cell| cell.trim().to_string())
                .collect(),
            None => return Err(TraitStackError::config("input table is empty")),
        };

        let mut rows = Vec::new();
        for (n, record) in records.enumerate() {
            let record = record.with_context(|| format!("read table row {}", n + 1))?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { header, rows })
    }

    /// Read a comma separated table from disk.
    pub fn from_path(path: impl AsRef<Path>) -> TraitStackResult<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("open table '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Turn every data row into a [`RawItemSelection`].
    ///
    /// Trait columns are the ones strictly between `layout.name_column` and
    /// `layout.last_column`; empty cells are left out.
    pub fn raw_items(&self, layout: &TableLayout) -> TraitStackResult<Vec<RawItemSelection>> {
        let name_idx = self.column(&layout.name_column)?;
        let last_idx = self.column(&layout.last_column)?;
        if last_idx <= name_idx {
            return Err(TraitStackError::config(format!(
                "column '{}' must come after column '{}'",
                layout.last_column, layout.name_column
            )));
        }

        let categories = &self.header[name_idx + 1..last_idx];
        let items = self
            .rows
            .iter()
            .enumerate()
            .map(|(n, row)| {
                let cell = |i: usize| row.get(i).map(|c| c.trim()).unwrap_or_default();
                let selections = categories
                    .iter()
                    .enumerate()
                    .filter_map(|(offset, category)| {
                        let value = cell(name_idx + 1 + offset);
                        (!value.is_empty()).then(|| (category.clone(), value.to_string()))
                    })
                    .collect();
                let attribute_number = Some(cell(last_idx))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string);
                RawItemSelection {
                    index: n + 1,
                    name: cell(name_idx).to_string(),
                    attribute_number,
                    selections,
                }
            })
            .collect();
        Ok(items)
    }

    fn column(&self, name: &str) -> TraitStackResult<usize> {
        self.header.iter().position(|h| h == name).ok_or_else(|| {
            TraitStackError::config(format!("required column '{name}' not found in table header"))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/input/table.rs"]
mod tests;
