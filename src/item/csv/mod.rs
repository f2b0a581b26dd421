//! CSV support for importing and exporting tabular data.
//!
//! # Module Architecture
//!
//! 1. **csv_reader**: [`parse`](csv_reader::parse) turns CSV text into
//!    [`Record`](crate::core::record::Record)s, and `CsvItemReader` serves
//!    them one by one to a step.
//!
//! 2. **csv_writer**: [`serialize`](csv_writer::serialize) renders records
//!    as CSV text, and `CsvItemWriter` does the same chunk by chunk into any
//!    `std::io::Write`.
//!
//! 3. **validator**: [`validate`](validator::validate) checks parsed records
//!    against the columns an import requires.
//!
//! Parsing, validation and serialization are plain functions over owned
//! data: they never touch files or the caller's state.
//!
//! # Known limitations
//!
//! - The default [`ParseMode::Naive`](csv_reader::ParseMode::Naive) splits
//!   on every comma, quoted or not. Opt into
//!   [`ParseMode::Strict`](csv_reader::ParseMode::Strict) for quote-aware
//!   parsing.
//! - Values containing line breaks are not quoted unless the writer is
//!   built with `quote_newlines(true)`.
//! - Blank lines are skipped, so a row whose only cell is empty disappears.
//! - Header validation only looks at the first record.
//!
//! # Examples
//!
//! ```
//! use bistro_batch::core::record::{HeaderSet, Record};
//! use bistro_batch::item::csv::{
//!     csv_reader::{parse_with, ParseMode},
//!     csv_writer::serialize,
//!     validator::{validate, ImportResult},
//! };
//!
//! let headers = HeaderSet::new(["nome", "descricao"]);
//! let records = vec![Record::new()
//!     .with("nome", "Tiramisu")
//!     .with("descricao", "café, mascarpone e cacau")];
//!
//! let text = serialize(&records, Some(&headers));
//! let parsed = parse_with(&text, b',', ParseMode::Strict).unwrap();
//!
//! match validate(parsed, &headers) {
//!     ImportResult::Valid(table) => {
//!         assert_eq!(table[0].text("descricao"), "café, mascarpone e cacau")
//!     }
//!     ImportResult::MissingHeaders(missing) => panic!("missing {:?}", missing),
//! }
//! ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;

/// Required-header checks on parsed records.
pub mod validator;
