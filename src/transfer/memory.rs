use std::{cell::RefCell, collections::HashMap};

use super::{FileTransfer, SelectedFile, ensure_csv_suffix};
use crate::error::{BatchError, ImportError};

/// Host-free transfer: serves registered file contents and keeps saved files.
#[derive(Debug, Default)]
pub struct MemoryFileTransfer {
    files: RefCell<HashMap<String, String>>,
}

impl MemoryFileTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `content` readable under `name`.
    pub fn with_file(self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.borrow_mut().insert(name.into(), content.into());
        self
    }

    /// Content stored under `name`, whether registered or saved.
    pub fn file(&self, name: &str) -> Option<String> {
        self.files.borrow().get(name).cloned()
    }
}

impl FileTransfer for MemoryFileTransfer {
    async fn read_raw(&self, file: &SelectedFile) -> Result<String, ImportError> {
        self.file(&file.name)
            .ok_or_else(|| ImportError::ReadError(format!("{}: file not found", file.name)))
    }

    async fn save_text(&self, filename: &str, text: &str) -> Result<(), BatchError> {
        self.files
            .borrow_mut()
            .insert(ensure_csv_suffix(filename), text.to_owned());
        Ok(())
    }
}
