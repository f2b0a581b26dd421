use std::{cell::Cell, marker::PhantomData, str::FromStr};

use chrono::{NaiveDate, NaiveTime};

use crate::{
    core::{
        item::{ItemProcessor, ItemProcessorResult},
        record::{HeaderSet, Record},
    },
    error::{CoercionError, RecordError},
};

/// A domain value that can be exported as one CSV record.
pub trait ToRecord {
    /// Column order of the export.
    fn headers() -> HeaderSet;

    fn to_record(&self) -> Record;
}

/// A domain value built from one imported CSV record.
pub trait FromRecord: Sized {
    /// Columns an import file must carry.
    fn required_headers() -> HeaderSet;

    /// Coerces the record's text fields, reporting every field that fails.
    fn from_record(record: &Record) -> Result<Self, Vec<CoercionError>>;
}

/// Processor mapping imported records onto a [`FromRecord`] type.
///
/// Failures come out as [`RecordError`]s numbered by the position of the
/// record among the rows this mapper has seen.
pub struct RecordMapper<T> {
    row: Cell<usize>,
    target: PhantomData<fn() -> T>,
}

impl<T> Default for RecordMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordMapper<T> {
    pub fn new() -> Self {
        Self {
            row: Cell::new(0),
            target: PhantomData,
        }
    }
}

impl<T: FromRecord> ItemProcessor<Record, T> for RecordMapper<T> {
    fn process(&self, item: &Record) -> ItemProcessorResult<T> {
        let row = self.row.get() + 1;
        self.row.set(row);

        T::from_record(item).map_err(|errors| RecordError { row, errors }.into())
    }
}

/// Typed access to the text fields of a record, collecting coercion errors
/// instead of stopping at the first one.
///
/// Blank fields never fail: they yield the supplied default.
///
/// ```
/// use bistro_batch::core::record::Record;
/// use bistro_batch::item::mapping::Fields;
///
/// let record = Record::new().with("preco", "12.5").with("quantidade", "muito");
/// let mut fields = Fields::new(&record);
///
/// assert_eq!(fields.number("preco"), 12.5);
/// assert_eq!(fields.number("quantidade"), 0.0);
///
/// let errors = fields.finish(()).unwrap_err();
/// assert_eq!(errors[0].field, "quantidade");
/// ```
pub struct Fields<'a> {
    record: &'a Record,
    errors: Vec<CoercionError>,
}

impl<'a> Fields<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self {
            record,
            errors: Vec::new(),
        }
    }

    /// The trimmed text of `name`, `""` when absent.
    pub fn text(&self, name: &str) -> String {
        self.record.text(name).trim().to_owned()
    }

    pub fn text_or(&self, name: &str, default: &str) -> String {
        let text = self.text(name);
        if text.is_empty() {
            default.to_owned()
        } else {
            text
        }
    }

    /// `None` when the field is blank.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|text| !text.is_empty())
    }

    /// A decimal number; blank reads as `0`.
    pub fn number(&mut self, name: &str) -> f64 {
        self.parse_or(name, "number", 0.0)
    }

    pub fn optional_number(&mut self, name: &str) -> Option<f64> {
        self.parse_optional(name, "number")
    }

    /// A whole number; blank reads as `0`.
    pub fn integer(&mut self, name: &str) -> u32 {
        self.parse_or(name, "whole number", 0)
    }

    /// `true`/`false`, `1`/`0`, `sim`/`não`, `yes`/`no`, case-insensitive.
    pub fn boolean(&mut self, name: &str, default: bool) -> bool {
        let text = self.text(name);
        if text.is_empty() {
            return default;
        }

        match text.to_lowercase().as_str() {
            "true" | "1" | "sim" | "s" | "yes" | "y" => true,
            "false" | "0" | "não" | "nao" | "n" | "no" => false,
            _ => {
                self.reject(name, text, "boolean");
                default
            }
        }
    }

    /// An ISO date (`YYYY-MM-DD`).
    pub fn date(&mut self, name: &str) -> Option<NaiveDate> {
        let text = self.text(name);
        if text.is_empty() {
            return None;
        }

        match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.reject(name, text, "date (YYYY-MM-DD)");
                None
            }
        }
    }

    /// A wall-clock time, `HH:MM` or `HH:MM:SS`.
    pub fn time(&mut self, name: &str) -> Option<NaiveTime> {
        let text = self.text(name);
        if text.is_empty() {
            return None;
        }

        match NaiveTime::parse_from_str(&text, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&text, "%H:%M:%S"))
        {
            Ok(time) => Some(time),
            Err(_) => {
                self.reject(name, text, "time (HH:MM)");
                None
            }
        }
    }

    /// Parses a non-blank field with `parse`, which returns `None` for text
    /// it does not recognise.
    pub fn choice<T>(
        &mut self,
        name: &str,
        expected: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Option<T> {
        let text = self.text(name);
        if text.is_empty() {
            return None;
        }

        let value = parse(&text);
        if value.is_none() {
            self.reject(name, text, expected);
        }
        value
    }

    pub fn reject(&mut self, name: &str, value: impl Into<String>, expected: &'static str) {
        self.errors.push(CoercionError {
            field: name.to_owned(),
            value: value.into(),
            expected,
        });
    }

    /// `value` when every access succeeded, all the collected errors otherwise.
    pub fn finish<T>(self, value: T) -> Result<T, Vec<CoercionError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }

    fn parse_or<T: FromStr>(&mut self, name: &str, expected: &'static str, default: T) -> T {
        self.parse_optional(name, expected).unwrap_or(default)
    }

    fn parse_optional<T: FromStr>(&mut self, name: &str, expected: &'static str) -> Option<T> {
        let text = self.text(name);
        if text.is_empty() {
            return None;
        }

        match text.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.reject(name, text, expected);
                None
            }
        }
    }
}
