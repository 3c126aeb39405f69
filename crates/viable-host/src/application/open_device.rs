//! Device construction from the host configuration.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use viable_core::{DeviceError, KeyboardDefinition, Layout, Viable};

use crate::infrastructure::sinks::TracingSettingsSink;
use crate::infrastructure::storage::config::HostConfig;
use crate::infrastructure::storage::file_store::{FileStorage, FileStoreError};

#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Store(#[from] FileStoreError),

    #[error("failed to read keyboard definition {path}: {source}")]
    Definition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("device setup failed: {0}")]
    Device(#[from] DeviceError),
}

/// Opens the store file, loads the definition, and runs device init.
///
/// # Errors
///
/// [`OpenError`] when the store file or definition cannot be read, the
/// `[viable]` section is invalid, or init fails on the medium.
pub fn open_device(config: &HostConfig) -> Result<Viable<FileStorage>, OpenError> {
    let size = Layout::new(config.viable.capacities).total_size();
    let storage = FileStorage::open(&config.storage.store_path, size)?;

    let definition = match &config.storage.definition_path {
        Some(path) => std::fs::read(path).map_err(|source| OpenError::Definition {
            path: path.clone(),
            source,
        })?,
        None => Vec::new(),
    };

    let mut viable = Viable::new(storage, config.viable.clone())?
        .with_definition(KeyboardDefinition::new(definition))
        .with_sink(TracingSettingsSink::new(config.viable.features.nkro));
    viable.init()?;

    info!(
        store = %config.storage.store_path.display(),
        definition_bytes = viable.definition().size(),
        "device ready"
    );
    Ok(viable)
}
