use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;

use crate::{
    foundation::error::{TraitStackError, TraitStackResult},
    metadata::attributes::Attribute,
};

/// Metadata template merged with each item's name and attributes.
///
/// Only the `name` and `attributes` keys are written; every other key of the template (for
/// example `description` or `image`) passes through untouched and in its original order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Blueprint {
    template: serde_json::Map<String, serde_json::Value>,
}

impl Blueprint {
    /// Wrap an already-parsed JSON object.
    pub fn new(template: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { template }
    }

    /// Build a blueprint from a JSON value, which must be an object.
    pub fn from_value(value: serde_json::Value) -> TraitStackResult<Self> {
        match value {
            serde_json::Value::Object(template) => Ok(Self::new(template)),
            other => Err(TraitStackError::config(format!(
                "blueprint must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse a blueprint from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TraitStackResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| TraitStackError::config(format!("parse blueprint JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a blueprint from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TraitStackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("open blueprint JSON '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a blueprint from a JSON string.
    pub fn from_json_str(s: &str) -> TraitStackResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Template keys, as loaded.
    pub fn template(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.template
    }

    /// Metadata document for one item. The template itself is left unchanged.
    pub fn render(
        &self,
        name: &str,
        attributes: &[Attribute],
    ) -> TraitStackResult<serde_json::Value> {
        let attributes = serde_json::to_value(attributes)
            .map_err(|e| TraitStackError::serde(format!("serialize attributes: {e}")))?;
        let mut doc = self.template.clone();
        doc.insert(
            "name".to_string(),
            serde_json::Value::String(name.to_string()),
        );
        doc.insert("attributes".to_string(), attributes);
        Ok(serde_json::Value::Object(doc))
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/blueprint.rs"]
mod tests;
