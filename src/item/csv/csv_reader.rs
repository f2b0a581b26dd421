use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use std::{cell::RefCell, io::Read, vec::IntoIter};

use crate::{
    core::{
        item::{ItemReader, ItemReaderResult},
        record::{HeaderSet, Record, Table},
    },
    error::{BatchError, ImportError},
    item::csv::validator::{ImportResult, validate},
};

/// How data lines are split into fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Split on every delimiter, quoted or not, then strip surrounding quotes.
    ///
    /// A quoted value containing the delimiter is split in two. Files written
    /// by [`serialize`](super::csv_writer::serialize) only survive this mode
    /// when no value needed quoting.
    #[default]
    Naive,
    /// Quote-aware parsing: delimiters and doubled quotes inside a quoted
    /// field are part of the value.
    Strict,
}

/// Parses CSV text with the default settings (comma, [`ParseMode::Naive`]).
///
/// Blank lines are dropped. Fewer than two remaining lines yield an empty
/// table, never an error. Every record gets a value for every header: short
/// rows are padded with `""`, extra values are dropped.
///
/// ```
/// use bistro_batch::item::csv::csv_reader::parse;
///
/// let table = parse("nome,preco\nArroz,5.5\n\nSal\n");
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table[0].text("preco"), "5.5");
/// assert_eq!(table[1].text("preco"), "");
/// ```
pub fn parse(text: &str) -> Table {
    parse_naive(text, ',')
}

/// Parses with an explicit delimiter and mode.
///
/// Only [`ParseMode::Strict`] can fail, when the underlying tokenizer does.
pub fn parse_with(text: &str, delimiter: u8, mode: ParseMode) -> Result<Table, BatchError> {
    match mode {
        ParseMode::Naive => Ok(parse_naive(text, char::from(delimiter))),
        ParseMode::Strict => parse_strict(text, delimiter),
    }
}

fn parse_naive(text: &str, delimiter: char) -> Table {
    let rows = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(delimiter).map(normalize_cell).collect())
        .collect();

    build_table(rows)
}

fn parse_strict(text: &str, delimiter: u8) -> Result<Table, BatchError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|error| BatchError::ItemReader(error.to_string()))?;

        // whitespace-only line
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }

        rows.push(record.iter().map(str::to_owned).collect());
    }

    Ok(build_table(rows))
}

fn normalize_cell(cell: &str) -> String {
    cell.trim().trim_matches('"').to_owned()
}

fn build_table(rows: Vec<Vec<String>>) -> Table {
    let mut rows = rows.into_iter();

    let headers = match rows.next() {
        Some(headers) => headers,
        None => return Table::new(),
    };

    let table: Table = rows
        .map(|values| {
            let mut values = values.into_iter();
            headers
                .iter()
                .map(|header| (header.clone(), values.next().unwrap_or_default()))
                .collect()
        })
        .collect();

    debug!("Parsed {} records over {} columns", table.len(), headers.len());

    table
}

/// A CSV item reader that implements the `ItemReader` trait.
///
/// The whole text is parsed when the reader is built; `read` then hands out
/// one [`Record`] at a time. Opening the reader checks that the text held
/// data and, when required headers were configured, that they are all
/// present. Both failures surface as [`BatchError::Import`].
///
/// ```
/// use bistro_batch::core::item::ItemReader;
/// use bistro_batch::core::record::HeaderSet;
/// use bistro_batch::item::csv::csv_reader::CsvItemReaderBuilder;
///
/// let reader = CsvItemReaderBuilder::new()
///     .required_headers(HeaderSet::new(["nome", "categoria"]))
///     .from_text("nome,categoria\nAlface,Vegetais")
///     .unwrap();
///
/// reader.open().unwrap();
/// let record = reader.read().unwrap().unwrap();
/// assert_eq!(record.text("categoria"), "Vegetais");
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct CsvItemReader {
    headers: HeaderSet,
    required: HeaderSet,
    pending: RefCell<Option<Table>>,
    records: RefCell<IntoIter<Record>>,
}

impl CsvItemReader {
    /// Header names of the parsed text; empty when it held no data.
    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }
}

impl ItemReader<Record> for CsvItemReader {
    fn read(&self) -> ItemReaderResult<Record> {
        Ok(self.records.borrow_mut().next())
    }

    fn open(&self) -> Result<(), BatchError> {
        let table = match self.pending.borrow_mut().take() {
            Some(table) => table,
            None => return Ok(()),
        };

        if table.is_empty() {
            warn!("CSV text holds no data line");
            return Err(ImportError::EmptyOrUnparseable.into());
        }

        match validate(table, &self.required) {
            ImportResult::Valid(table) => {
                debug!("CSV reader opened with {} records", table.len());
                *self.records.borrow_mut() = table.into_iter();
                Ok(())
            }
            ImportResult::MissingHeaders(missing) => {
                warn!("CSV text lacks required columns: {:?}", missing);
                Err(ImportError::MissingHeaders(missing).into())
            }
        }
    }
}

/// A builder for configuring CSV item reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Mode: [`ParseMode::Naive`]
/// - Required headers: none
#[derive(Debug, Clone)]
pub struct CsvItemReaderBuilder {
    delimiter: u8,
    mode: ParseMode,
    required: HeaderSet,
}

impl Default for CsvItemReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvItemReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            mode: ParseMode::Naive,
            required: HeaderSet::default(),
        }
    }

    /// Sets the field delimiter.
    ///
    /// ```
    /// use bistro_batch::item::csv::csv_reader::CsvItemReaderBuilder;
    ///
    /// let builder = CsvItemReaderBuilder::new().delimiter(b';');
    /// ```
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Columns checked for presence when the reader is opened.
    pub fn required_headers(mut self, required: HeaderSet) -> Self {
        self.required = required;
        self
    }

    pub fn from_text(self, text: &str) -> Result<CsvItemReader, BatchError> {
        let table = parse_with(text, self.delimiter, self.mode)?;
        let headers = table.first().map(HeaderSet::of).unwrap_or_default();

        Ok(CsvItemReader {
            headers,
            required: self.required,
            pending: RefCell::new(Some(table)),
            records: RefCell::new(Vec::new().into_iter()),
        })
    }

    /// Reads `rdr` to the end as UTF-8 and parses it.
    pub fn from_reader<R: Read>(self, mut rdr: R) -> Result<CsvItemReader, BatchError> {
        let mut text = String::new();
        rdr.read_to_string(&mut text)
            .map_err(|error| ImportError::ReadError(error.to_string()))?;
        self.from_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn empty_and_header_only_texts_yield_no_records() {
        assert!(parse("").is_empty());
        assert!(parse("onlyHeaderLine").is_empty());
        assert!(parse("nome,categoria\n   \n\n").is_empty());
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let table = parse("a,b,c\n1\n1,2,3,4");

        assert_eq!(table[0].text("a"), "1");
        assert_eq!(table[0].text("b"), "");
        assert_eq!(table[0].text("c"), "");
        assert_eq!(table[1].len(), 3);
        assert_eq!(table[1].text("c"), "3");
    }

    #[test]
    fn headers_and_values_are_trimmed_and_unquoted() {
        let table = parse(" \"nome\" , categoria \r\n \"Queijo\" ,Laticínios\r\n");

        assert_eq!(
            table[0].names().collect::<Vec<_>>(),
            vec!["nome", "categoria"]
        );
        assert_eq!(table[0].text("nome"), "Queijo");
        assert_eq!(table[0].text("categoria"), "Laticínios");
    }

    #[test]
    fn naive_mode_splits_quoted_commas() {
        let table = parse("nome,descricao\nPizza,\"molho, queijo\"");

        assert_eq!(table[0].text("descricao"), "molho");
    }

    #[test]
    fn strict_mode_keeps_quoted_commas_and_quotes() -> Result<(), Box<dyn Error>> {
        let table = parse_with(
            "nome,descricao\nPizza,\"molho, queijo\"\n\nSuco,\"o \"\"melhor\"\"\"",
            b',',
            ParseMode::Strict,
        )?;

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].text("descricao"), "molho, queijo");
        assert_eq!(table[1].text("descricao"), "o \"melhor\"");
        Ok(())
    }

    #[test]
    fn custom_delimiter_is_honoured() -> Result<(), Box<dyn Error>> {
        let table = parse_with("nome;preco\nCafé;4.5", b';', ParseMode::Naive)?;
        assert_eq!(table[0].text("preco"), "4.5");
        Ok(())
    }

    #[test]
    fn open_rejects_missing_headers() -> Result<(), Box<dyn Error>> {
        let reader = CsvItemReaderBuilder::new()
            .required_headers(HeaderSet::new(["nome", "categoria"]))
            .from_text("nome\nx")?;

        assert_eq!(
            reader.open(),
            Err(BatchError::Import(ImportError::MissingHeaders(vec![
                "categoria".to_string()
            ])))
        );
        assert!(reader.read()?.is_none());
        Ok(())
    }

    #[test]
    fn open_rejects_text_without_data() -> Result<(), Box<dyn Error>> {
        let reader = CsvItemReaderBuilder::new().from_text("nome,categoria\n")?;

        assert_eq!(
            reader.open(),
            Err(BatchError::Import(ImportError::EmptyOrUnparseable))
        );
        Ok(())
    }

    #[test]
    fn reader_yields_records_in_file_order() -> Result<(), Box<dyn Error>> {
        let data = "city,country,pop
        Boston,United States,4628910
        Concord,United States,42695";

        let reader = CsvItemReaderBuilder::new().from_reader(data.as_bytes())?;
        reader.open()?;

        assert_eq!(reader.headers(), &HeaderSet::new(["city", "country", "pop"]));

        let mut cities = Vec::new();
        while let Some(record) = reader.read()? {
            cities.push(record.text("city"));
        }

        assert_eq!(cities, vec!["Boston", "Concord"]);
        Ok(())
    }
}
