//! Payload decoding
//!
//! Turns the raw JSON documents the atlas is fed with into model types:
//! binding tables (hierarchy rows, major nerves), order maps, and statement
//! collections either in native form or as composer API pages.
//!
//! Malformed JSON surfaces as [`PayloadError::Json`]; well-formed JSON of the
//! wrong shape is rejected up front as [`PayloadError::InvalidShape`].

pub mod bindings;
pub mod composer;

pub use bindings::{
    parse_bindings, parse_child_order, parse_end_organ_order, parse_hierarchy_records,
    parse_major_nerves, record_from_binding, Binding, BindingTable, Variable, VariableType,
};
pub use composer::{parse_composer_page, parse_statements, ComposerPage};

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Invalid payload shape: {0}")]
    InvalidShape(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PayloadResult<T> = Result<T, PayloadError>;

/// Read a payload document from disk
pub fn read_payload(path: impl AsRef<Path>) -> PayloadResult<String> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    info!("Read payload {} ({} bytes)", path.display(), content.len());
    Ok(content)
}

/// Deserialize `input`, reporting type mismatches as shape errors
pub(crate) fn decode<T: DeserializeOwned>(input: &str, what: &str) -> PayloadResult<T> {
    serde_json::from_str(input).map_err(|e| match e.classify() {
        Category::Data => PayloadError::InvalidShape(format!("{}: {}", what, e)),
        _ => PayloadError::Json(e),
    })
}
