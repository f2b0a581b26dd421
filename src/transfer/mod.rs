//! Reading user-selected files and saving generated ones.
//!
//! This is the only part of the crate that touches the host. The checks every
//! import runs before reading (was a file selected, is it a CSV file) live in
//! the provided [`FileTransfer::read_text`], so implementations only supply
//! the raw read and write.

use chrono::NaiveDate;

use crate::error::{BatchError, ImportError};

#[cfg(feature = "transfer")]
mod local;
mod memory;

#[cfg(feature = "transfer")]
pub use local::LocalFileTransfer;
pub use memory::MemoryFileTransfer;

pub const CSV_MIME: &str = "text/csv";

/// A file the user picked for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name as shown to the user, resolved by the transfer against its own root.
    pub name: String,
    /// MIME type reported for the file, possibly empty.
    pub mime: String,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
        }
    }

    /// Accepted when the MIME type is `text/csv` or the name ends in `.csv`.
    pub fn is_csv(&self) -> bool {
        self.mime == CSV_MIME || self.name.ends_with(".csv")
    }
}

/// Checks run on a selection before its content is read.
pub fn check_selection(selection: Option<&SelectedFile>) -> Result<&SelectedFile, ImportError> {
    let file = selection.ok_or(ImportError::NoFileSelected)?;

    if !file.is_csv() {
        return Err(ImportError::UnsupportedType {
            name: file.name.clone(),
            mime: file.mime.clone(),
        });
    }

    Ok(file)
}

/// Host boundary for imports and exports.
#[allow(async_fn_in_trait)]
pub trait FileTransfer {
    /// Reads the whole content of an already checked file.
    async fn read_raw(&self, file: &SelectedFile) -> Result<String, ImportError>;

    /// Offers `text` to the user under `filename`.
    async fn save_text(&self, filename: &str, text: &str) -> Result<(), BatchError>;

    /// Checks the selection, then reads it.
    async fn read_text(&self, selection: Option<&SelectedFile>) -> Result<String, ImportError> {
        let file = check_selection(selection)?;
        self.read_raw(file).await
    }
}

/// `name` with a `.csv` suffix, added only when missing.
pub fn ensure_csv_suffix(name: &str) -> String {
    if name.ends_with(".csv") {
        name.to_owned()
    } else {
        format!("{}.csv", name)
    }
}

/// Date-stamped export name: `<base>_<YYYY-MM-DD>.csv`.
///
/// ```
/// use bistro_batch::transfer::export_filename;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(export_filename("estoque", date), "estoque_2024-03-09.csv");
/// ```
pub fn export_filename(base: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", base, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_is_recognised_by_mime_or_suffix() {
        assert!(SelectedFile::new("estoque.csv", "").is_csv());
        assert!(SelectedFile::new("estoque", CSV_MIME).is_csv());
        assert!(!SelectedFile::new("data.txt", "text/plain").is_csv());
    }

    #[test]
    fn selection_checks_map_to_import_errors() {
        assert_eq!(check_selection(None), Err(ImportError::NoFileSelected));
        assert_eq!(
            check_selection(Some(&SelectedFile::new("data.txt", "text/plain"))),
            Err(ImportError::UnsupportedType {
                name: "data.txt".into(),
                mime: "text/plain".into()
            })
        );
    }

    #[test]
    fn csv_suffix_is_added_once() {
        assert_eq!(ensure_csv_suffix("cardapio"), "cardapio.csv");
        assert_eq!(ensure_csv_suffix("cardapio.csv"), "cardapio.csv");
    }
}
