use serde::{Deserialize, Serialize};

use crate::resolve::model::ResolvedItem;

/// Trait type of the optional leading attribute carrying the item's attribute number.
pub const ATTRIBUTE_NUMBER_TRAIT: &str = "attribute-number";

/// One metadata attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Category name, or [`ATTRIBUTE_NUMBER_TRAIT`].
    pub trait_type: String,
    /// Variant name, or the attribute number.
    pub value: String,
}

impl Attribute {
    /// Build an attribute.
    pub fn new(trait_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            trait_type: trait_type.into(),
            value: value.into(),
        }
    }
}

/// Visible attributes of `item`, in trait order.
///
/// Hidden traits are left out. With `include_attribute_number`, an
/// [`ATTRIBUTE_NUMBER_TRAIT`] entry comes first (empty when the item has no number).
pub fn build_attributes(item: &ResolvedItem, include_attribute_number: bool) -> Vec<Attribute> {
    let mut out = Vec::with_capacity(item.traits.len() + 1);
    if include_attribute_number {
        out.push(Attribute::new(
            ATTRIBUTE_NUMBER_TRAIT,
            item.attribute_number.clone().unwrap_or_default(),
        ));
    }
    out.extend(
        item.traits
            .iter()
            .filter(|t| !t.hidden)
            .map(|t| Attribute::new(t.category.clone(), t.variant_name.clone())),
    );
    out
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/attributes.rs"]
mod tests;
