/// Convenience result type used across traitstack.
pub type TraitStackResult<T> = Result<T, TraitStackError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Variants split into two groups: run-level errors ([`Config`](Self::Config),
/// [`Catalog`](Self::Catalog)) abort a whole run, item-level errors only drop the item that
/// raised them. See [`TraitStackError::is_item_level`].
#[derive(thiserror::Error, Debug)]
pub enum TraitStackError {
    /// Invalid run configuration or tabular input layout.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed trait catalog document.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// An item selects a variant together with a value that variant excludes.
    #[error(transparent)]
    ExclusionConflict(#[from] ExclusionConflict),

    /// Nothing was drawn for an item: no declared layers, or none of them exist on disk.
    #[error("no layers to composite")]
    NoLayers,

    /// A layer file could not be decoded or rasterized.
    #[error("decode error: {0}")]
    Decode(String),

    /// Name-based output naming got a name that cannot be used as a file name.
    #[error("invalid output name {0:?}")]
    InvalidOutputName(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TraitStackError {
    /// Build a [`TraitStackError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`TraitStackError::Catalog`] value.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Build a [`TraitStackError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TraitStackError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` when the error only concerns the item being processed and the batch may go on.
    pub fn is_item_level(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Catalog(_))
    }
}

/// Diagnostic for an item vetoed by an exclusion rule.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error(
    "item '{item}': variant '{variant}' of category '{category}' excludes '{value}', which is also selected"
)]
pub struct ExclusionConflict {
    /// Name of the offending item.
    pub item: String,
    /// Category of the variant carrying the exclusion rule.
    pub category: String,
    /// Variant carrying the exclusion rule.
    pub variant: String,
    /// Excluded value found among the item's other selections.
    pub value: String,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
