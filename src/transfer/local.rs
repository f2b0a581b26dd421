use std::path::{Component, Path, PathBuf};

use log::{debug, info};

use super::{FileTransfer, SelectedFile, ensure_csv_suffix};
use crate::error::{BatchError, ImportError};

/// Reads and saves files under one directory with `tokio::fs`.
///
/// Names must be plain file names. Absolute paths, `..` and nested
/// directories are refused, so nothing outside the root is touched.
#[derive(Debug, Clone)]
pub struct LocalFileTransfer {
    root: PathBuf,
}

impl LocalFileTransfer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `name` to the root when it is a single file name.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Some(self.root.join(file)),
            _ => None,
        }
    }
}

impl FileTransfer for LocalFileTransfer {
    async fn read_raw(&self, file: &SelectedFile) -> Result<String, ImportError> {
        let path = self
            .resolve(&file.name)
            .ok_or_else(|| ImportError::ReadError(format!("not a file name: {}", file.name)))?;
        debug!("Reading {}", path.display());

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|error| ImportError::ReadError(error.to_string()))
    }

    async fn save_text(&self, filename: &str, text: &str) -> Result<(), BatchError> {
        let filename = ensure_csv_suffix(filename);
        let path = self
            .resolve(&filename)
            .ok_or_else(|| BatchError::ItemWriter(format!("not a file name: {}", filename)))?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        tokio::fs::write(&path, text.as_bytes())
            .await
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;

        info!("Saved {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}
