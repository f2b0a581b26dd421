use std::{
    borrow::Cow,
    cell::{Cell, RefCell},
    io::Write,
};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::debug;

use crate::{
    BatchError,
    core::{
        item::{ItemWriter, ItemWriterResult},
        record::{HeaderSet, Record},
    },
};

/// Renders records as CSV text with the default settings.
///
/// The header row is `header_order` joined by commas, or the first record's
/// field names when no order is given. Records are separated by `\n` with no
/// trailing newline; an empty slice renders as an empty string.
///
/// A value is quoted, with inner quotes doubled, only when it contains a
/// comma or a double quote. Embedded newlines are written as they are; use
/// [`CsvItemWriterBuilder::quote_newlines`] to quote them too.
///
/// ```
/// use bistro_batch::core::record::{HeaderSet, Record};
/// use bistro_batch::item::csv::csv_writer::serialize;
///
/// let records = vec![
///     Record::new().with("nome", "Pizza, grande").with("preco", 42.0),
///     Record::new().with("nome", "Suco").with("preco", 7.5),
/// ];
///
/// let text = serialize(&records, Some(&HeaderSet::new(["nome", "preco"])));
/// assert_eq!(text, "nome,preco\n\"Pizza, grande\",42\nSuco,7.5");
/// ```
pub fn serialize(records: &[Record], header_order: Option<&HeaderSet>) -> String {
    let first = match records.first() {
        Some(first) => first,
        None => return String::new(),
    };

    let derived;
    let headers = match header_order {
        Some(headers) => headers,
        None => {
            derived = HeaderSet::of(first);
            &derived
        }
    };

    let format = LineFormat::default();
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(format.header_line(headers));
    lines.extend(records.iter().map(|record| format.record_line(record, headers)));
    lines.join("\n")
}

/// Quotes `text` when it contains the delimiter or a double quote (or a line
/// break, if `quote_newlines` is set), doubling inner quotes.
pub fn escape_field(text: &str, delimiter: char, quote_newlines: bool) -> Cow<'_, str> {
    let needs_quotes = text.contains(delimiter)
        || text.contains('"')
        || (quote_newlines && (text.contains('\n') || text.contains('\r')));

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

#[derive(Debug, Clone, Copy)]
struct LineFormat {
    delimiter: char,
    quote_newlines: bool,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_newlines: false,
        }
    }
}

impl LineFormat {
    fn header_line(&self, headers: &HeaderSet) -> String {
        headers
            .iter()
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string())
    }

    fn record_line(&self, record: &Record, headers: &HeaderSet) -> String {
        headers
            .iter()
            .map(|header| {
                let text = record.text(header);
                escape_field(&text, self.delimiter, self.quote_newlines).into_owned()
            })
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string())
    }

    /// Encodes one record with the `csv` crate, which quotes any value
    /// holding the delimiter, a quote or a line break.
    fn quoted_record_line(
        &self,
        record: &Record,
        headers: &HeaderSet,
    ) -> Result<String, BatchError> {
        let mut wtr = WriterBuilder::new()
            .delimiter(u8::try_from(self.delimiter).unwrap_or(b','))
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        wtr.write_record(headers.iter().map(|header| record.text(header)))
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        let bytes = wtr
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        let mut line =
            String::from_utf8(bytes).map_err(|error| BatchError::ItemWriter(error.to_string()))?;

        line.pop();
        Ok(line)
    }
}

/// A CSV item writer that implements the `ItemWriter` trait.
///
/// The header row goes out with the first non-empty chunk, taken from the
/// configured header set or else from the first record written. Nothing at
/// all is written when no record ever arrives.
///
/// With [`CsvItemWriterBuilder::quote_newlines`] set, records are encoded by
/// the `csv` crate's writer; a record made of a single empty value then
/// comes out as `""`.
pub struct CsvItemWriter<W: Write> {
    stream: RefCell<W>,
    headers: RefCell<Option<HeaderSet>>,
    header_written: Cell<bool>,
    format: LineFormat,
}

impl<W: Write> ItemWriter<Record> for CsvItemWriter<W> {
    fn write(&self, items: &[Record]) -> ItemWriterResult {
        let first = match items.first() {
            Some(first) => first,
            None => return Ok(()),
        };

        let mut headers = self.headers.borrow_mut();
        let headers = headers.get_or_insert_with(|| HeaderSet::of(first));

        let mut buffer = String::new();
        if !self.header_written.get() {
            buffer.push_str(&self.format.header_line(headers));
        }
        for record in items {
            buffer.push('\n');
            if self.format.quote_newlines {
                buffer.push_str(&self.format.quoted_record_line(record, headers)?);
            } else {
                buffer.push_str(&self.format.record_line(record, headers));
            }
        }

        self.stream
            .borrow_mut()
            .write_all(buffer.as_bytes())
            .map_err(|error| BatchError::ItemWriter(error.to_string()))?;

        self.header_written.set(true);
        debug!("Wrote {} CSV records", items.len());
        Ok(())
    }

    /// Flush the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.stream
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<W: Write> CsvItemWriter<W> {
    pub fn into_inner(self) -> W {
        self.stream.into_inner()
    }
}

impl CsvItemWriter<Vec<u8>> {
    /// The text written so far.
    pub fn into_string(self) -> Result<String, BatchError> {
        String::from_utf8(self.into_inner())
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct CsvItemWriterBuilder {
    delimiter: Option<u8>,
    headers: Option<HeaderSet>,
    quote_newlines: bool,
}

impl CsvItemWriterBuilder {
    pub fn new() -> CsvItemWriterBuilder {
        CsvItemWriterBuilder::default()
    }

    pub fn delimiter(mut self, delimiter: u8) -> CsvItemWriterBuilder {
        self.delimiter = Some(delimiter);
        self
    }

    /// Column order of the output. Without it the first record decides.
    pub fn headers(mut self, headers: HeaderSet) -> CsvItemWriterBuilder {
        self.headers = Some(headers);
        self
    }

    /// Also quote values holding a line break, so that they read back as a
    /// single record with a quote-aware parser.
    pub fn quote_newlines(mut self, yes: bool) -> CsvItemWriterBuilder {
        self.quote_newlines = yes;
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> CsvItemWriter<W> {
        CsvItemWriter {
            stream: RefCell::new(wtr),
            headers: RefCell::new(self.headers),
            header_written: Cell::new(false),
            format: LineFormat {
                delimiter: char::from(self.delimiter.unwrap_or(b',')),
                quote_newlines: self.quote_newlines,
            },
        }
    }
}
