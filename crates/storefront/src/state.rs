//! Application state shared across handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cartwheel_core::{Catalog, CatalogError, SessionStore};

use crate::config::ShopConfig;

/// Error loading the catalog at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The catalog and session store
/// are built once by the composition root and live for the whole process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Arc<Catalog>,
    store: Arc<SessionStore>,
}

impl AppState {
    /// Create application state around a catalog, with an empty session store.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let store = Arc::new(SessionStore::new(Arc::clone(&catalog)));
        Self {
            inner: Arc::new(AppStateInner { catalog, store }),
        }
    }

    /// Create application state from configuration.
    ///
    /// Loads the catalog file named by `SHOP_CATALOG_PATH`, or the built-in
    /// catalog if none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file cannot be read or is invalid.
    pub fn from_config(config: &ShopConfig) -> Result<Self, CatalogLoadError> {
        let catalog = match &config.catalog_path {
            Some(path) => load_catalog(path)?,
            None => Catalog::builtin(),
        };
        Ok(Self::new(Arc::new(catalog)))
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    /// Get a shared handle to the session store for background tasks.
    #[must_use]
    pub fn store_handle(&self) -> Arc<SessionStore> {
        Arc::clone(&self.inner.store)
    }
}

/// Read and parse a catalog file.
fn load_catalog(path: &Path) -> Result<Catalog, CatalogLoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Catalog::from_json(&json)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_uses_builtin_catalog() {
        let state = AppState::from_config(&ShopConfig::default()).unwrap();
        assert_eq!(state.catalog().len(), 5);
        assert_eq!(state.store().session_count(), 0);
    }

    #[test]
    fn test_missing_catalog_file() {
        let config = ShopConfig {
            catalog_path: Some(PathBuf::from("/definitely/not/here/catalog.json")),
            ..ShopConfig::default()
        };
        let err = AppState::from_config(&config).err().unwrap();
        assert!(matches!(err, CatalogLoadError::Io { .. }));
    }

    #[test]
    fn test_catalog_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"[{"id": "tea", "name": "Green Tea", "price": 4.25}]"#)
            .unwrap();

        let config = ShopConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..ShopConfig::default()
        };
        let state = AppState::from_config(&config).unwrap();

        assert_eq!(state.catalog().len(), 1);
        assert!(state.catalog().contains("tea"));
        assert!(state.store().catalog().contains("tea"));
    }
}
