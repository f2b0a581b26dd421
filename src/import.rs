//! End-to-end CSV import and export of domain values.
//!
//! An import reads the selected file, parses and validates it, then runs an
//! import step mapping every record onto the target type into a
//! [`StagingWriter`]. The mapped values only leave the step once it has
//! succeeded, so a failed import leaves the caller's state untouched.
//!
//! ```
//! use bistro_batch::domain::inventory::{self, NewInventoryItem};
//! use bistro_batch::import::CsvImport;
//!
//! let text = "nome,categoria,quantidade,unidade,estoqueMinimo,preco\n\
//!             Arroz,Grãos,20,kg,5,4.5";
//!
//! let outcome = CsvImport::<NewInventoryItem>::builder()
//!     .build()
//!     .import_text(text)
//!     .unwrap();
//!
//! let items = inventory::add_items(Vec::new(), outcome.items);
//! assert_eq!(items[0].name, "Arroz");
//! assert_eq!(items[0].id, 1);
//! ```

use std::marker::PhantomData;

use chrono::NaiveDate;
use log::{error, info, warn};

use crate::{
    core::{
        item::ItemWriter,
        record::{HeaderSet, Table},
        step::{StepBuilder, StepExecution},
    },
    error::{BatchError, ImportError, RecordError},
    item::{
        csv::{
            csv_reader::{CsvItemReaderBuilder, ParseMode, parse},
            csv_writer::CsvItemWriterBuilder,
            validator::validate,
        },
        mapping::{FromRecord, RecordMapper, ToRecord},
        memory::StagingWriter,
    },
    transfer::{FileTransfer, SelectedFile, export_filename},
};

/// What a successful import produced.
#[derive(Debug)]
pub struct ImportOutcome<T> {
    /// Mapped values in file order, ready to be committed.
    pub items: Vec<T>,
    /// Records left out because they failed coercion, within the skip limit.
    pub skipped: Vec<RecordError>,
    pub execution: StepExecution,
}

/// Imports CSV text as values of `T`.
pub struct CsvImport<T> {
    name: String,
    delimiter: u8,
    mode: ParseMode,
    chunk_size: usize,
    skip_limit: usize,
    target: PhantomData<fn() -> T>,
}

impl<T: FromRecord + Clone> CsvImport<T> {
    pub fn builder() -> CsvImportBuilder<T> {
        CsvImportBuilder::new()
    }

    /// Runs the import over already loaded text.
    pub fn import_text(&self, text: &str) -> Result<ImportOutcome<T>, ImportError> {
        let reader = CsvItemReaderBuilder::new()
            .delimiter(self.delimiter)
            .mode(self.mode)
            .required_headers(T::required_headers())
            .from_text(text)
            .map_err(into_import_error)?;
        let mapper = RecordMapper::<T>::new();
        let staging = StagingWriter::new();

        let step = StepBuilder::new()
            .name(self.name.clone())
            .reader(&reader)
            .processor(&mapper)
            .writer(&staging)
            .chunk(self.chunk_size)
            .skip_limit(self.skip_limit)
            .build()
            .map_err(into_import_error)?;

        let execution = step.execute();

        let mut skipped = Vec::new();
        let mut fatal = None;
        for err in &execution.errors {
            match err {
                BatchError::Record(record_error) => skipped.push(record_error.clone()),
                BatchError::Import(import_error) => return Err(import_error.clone()),
                other => fatal = Some(other.clone()),
            }
        }

        if !execution.is_success() {
            if let Some(err) = fatal {
                error!("Import {} failed: {}", self.name, err);
                return Err(into_import_error(err));
            }
            warn!(
                "Import {} rejected, {} records failed coercion",
                self.name,
                skipped.len()
            );
            return Err(ImportError::Rejected {
                skipped: execution.process_error_count,
                errors: skipped,
            });
        }

        info!(
            "Import {} staged {} records, skipped {}",
            self.name,
            staging.len(),
            skipped.len()
        );

        Ok(ImportOutcome {
            items: staging.into_items(),
            skipped,
            execution,
        })
    }

    /// Reads the user's selection through `transfer`, then imports it.
    pub async fn import_file(
        &self,
        transfer: &impl FileTransfer,
        selection: Option<&SelectedFile>,
    ) -> Result<ImportOutcome<T>, ImportError> {
        let text = transfer.read_text(selection).await?;
        self.import_text(&text)
    }
}

fn into_import_error(err: BatchError) -> ImportError {
    match err {
        BatchError::Import(import_error) => import_error,
        other => ImportError::ReadError(other.to_string()),
    }
}

/// Configures a [`CsvImport`].
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Mode: [`ParseMode::Naive`]
/// - Chunk size: 50
/// - Skip limit: 0, any record failing coercion rejects the whole file
pub struct CsvImportBuilder<T> {
    name: Option<String>,
    delimiter: u8,
    mode: ParseMode,
    chunk_size: usize,
    skip_limit: usize,
    target: PhantomData<fn() -> T>,
}

impl<T> Default for CsvImportBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CsvImportBuilder<T> {
    pub fn new() -> Self {
        Self {
            name: None,
            delimiter: b',',
            mode: ParseMode::Naive,
            chunk_size: 50,
            skip_limit: 0,
            target: PhantomData,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Number of records allowed to fail coercion before the import is rejected.
    pub fn skip_limit(mut self, skip_limit: usize) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    pub fn build(self) -> CsvImport<T> {
        CsvImport {
            name: self.name.unwrap_or_else(|| "csv-import".to_owned()),
            delimiter: self.delimiter,
            mode: self.mode,
            chunk_size: self.chunk_size,
            skip_limit: self.skip_limit,
            target: PhantomData,
        }
    }
}

/// Untyped import: parses `text` and checks the required columns.
///
/// ```
/// use bistro_batch::core::record::HeaderSet;
/// use bistro_batch::error::ImportError;
/// use bistro_batch::import::read_table;
///
/// let required = HeaderSet::new(["nome", "preco"]);
///
/// assert_eq!(read_table("nome,preco\nSuco,7", &required).unwrap().len(), 1);
/// assert_eq!(
///     read_table("nome\nSuco", &required),
///     Err(ImportError::MissingHeaders(vec!["preco".into()]))
/// );
/// assert_eq!(read_table("nome,preco", &required), Err(ImportError::EmptyOrUnparseable));
/// ```
pub fn read_table(text: &str, required: &HeaderSet) -> Result<Table, ImportError> {
    let table = parse(text);
    if table.is_empty() {
        return Err(ImportError::EmptyOrUnparseable);
    }
    validate(table, required).into_result()
}

/// Reads the user's selection through `transfer` as an untyped table.
pub async fn read_table_file(
    transfer: &impl FileTransfer,
    selection: Option<&SelectedFile>,
    required: &HeaderSet,
) -> Result<Table, ImportError> {
    let text = transfer.read_text(selection).await?;
    read_table(&text, required)
}

/// Exports domain values as CSV in their declared column order.
#[derive(Debug, Clone, Default)]
pub struct CsvExport {
    quote_newlines: bool,
}

impl CsvExport {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`CsvItemWriterBuilder::quote_newlines`].
    pub fn quote_newlines(mut self, yes: bool) -> Self {
        self.quote_newlines = yes;
        self
    }

    /// CSV text of `items`, empty when there are none.
    pub fn export_text<T: ToRecord>(&self, items: &[T]) -> Result<String, BatchError> {
        let records: Vec<_> = items.iter().map(ToRecord::to_record).collect();

        let writer = CsvItemWriterBuilder::new()
            .headers(T::headers())
            .quote_newlines(self.quote_newlines)
            .from_writer(Vec::new());
        writer.write(&records)?;
        writer.flush()?;
        writer.into_string()
    }

    /// Saves `items` as `<base>_<date>.csv` and returns the file name.
    ///
    /// Nothing is saved when `items` is empty, and `None` is returned.
    pub async fn export_file<T: ToRecord>(
        &self,
        transfer: &impl FileTransfer,
        base: &str,
        date: NaiveDate,
        items: &[T],
    ) -> Result<Option<String>, BatchError> {
        if items.is_empty() {
            info!("Nothing to export for {}", base);
            return Ok(None);
        }

        let text = self.export_text(items)?;
        let filename = export_filename(base, date);
        transfer.save_text(&filename, &text).await?;

        Ok(Some(filename))
    }
}
