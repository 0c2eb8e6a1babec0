//! Catalog file validation.
//!
//! # Usage
//!
//! ```bash
//! cw-cli catalog check ./catalog.json
//! ```
//!
//! Applies the same checks the storefront runs at startup (empty ids or
//! names, duplicate ids, negative prices) and reports the products the file
//! would serve.

use std::path::{Path, PathBuf};

use cartwheel_core::{Catalog, CatalogError};
use thiserror::Error;

/// Errors that can occur while checking a catalog file.
#[derive(Debug, Error)]
pub enum CatalogCheckError {
    /// File could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a valid catalog.
    #[error("invalid catalog: {0}")]
    Invalid(#[from] CatalogError),
}

/// Load and validate a catalog file.
///
/// # Errors
///
/// Returns error if the file cannot be read or does not hold a valid catalog.
pub fn check(path: &Path) -> Result<Catalog, CatalogCheckError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogCheckError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Catalog::from_json(&raw)?)
}

/// Render one line per product, in catalog order.
#[must_use]
pub fn render(catalog: &Catalog) -> Vec<String> {
    catalog
        .products()
        .iter()
        .map(|p| format!("{}\t{}\t{}", p.id, p.unit_price, p.name))
        .collect()
}
