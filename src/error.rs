use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
/// Batch error
pub enum BatchError {
    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemProcessor from: {0}")]
    ItemProcessor(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("Step {0} failed")]
    Step(String),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Reasons an import is aborted before anything reaches the caller's state.
///
/// Every variant carries a message meant to be shown inline to the user.
/// `NoFileSelected` is the only one that should be swallowed silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    #[error("no file selected")]
    NoFileSelected,

    #[error("please select a CSV file ({name} is {mime})")]
    UnsupportedType { name: String, mime: String },

    #[error("error reading the file: {0}")]
    ReadError(String),

    #[error("the CSV file is empty or has no valid data")]
    EmptyOrUnparseable,

    #[error("required columns not found: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    #[error(
        "{} of the records could not be converted: {}",
        .skipped,
        format_record_errors(.errors)
    )]
    Rejected {
        skipped: usize,
        errors: Vec<RecordError>,
    },
}

impl ImportError {
    /// `true` when the failure needs no message (the user dismissed the picker).
    pub fn is_silent(&self) -> bool {
        matches!(self, ImportError::NoFileSelected)
    }
}

/// A single field that could not be turned into the expected type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("field '{field}': '{value}' is not a valid {expected}")]
pub struct CoercionError {
    pub field: String,
    pub value: String,
    pub expected: &'static str,
}

/// All coercion failures of one record. `row` is the 1-based position of
/// the record among the data rows.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("row {row}: {}", format_coercion_errors(.errors))]
pub struct RecordError {
    pub row: usize,
    pub errors: Vec<CoercionError>,
}

/// Rejected updates of caller-owned state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("a table with number {0} already exists")]
    DuplicateTable(u32),

    #[error("no table with id {0}")]
    UnknownTable(u32),

    #[error("no order with id {0}")]
    UnknownOrder(u32),

    #[error("no shift with id {0}")]
    UnknownShift(u32),

    #[error("no staff member with id {0}")]
    UnknownStaff(u32),

    #[error("no menu item with id {0}")]
    UnknownMenuItem(u32),
}

fn format_coercion_errors(errors: &[CoercionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_record_errors(errors: &[RecordError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_headers_message_lists_every_column() {
        let error = ImportError::MissingHeaders(vec!["categoria".into(), "preco".into()]);
        assert_eq!(
            error.to_string(),
            "required columns not found: categoria, preco"
        );
    }

    #[test]
    fn only_no_file_selected_is_silent() {
        assert!(ImportError::NoFileSelected.is_silent());
        assert!(!ImportError::EmptyOrUnparseable.is_silent());
        assert!(!ImportError::ReadError("denied".into()).is_silent());
    }

    #[test]
    fn record_error_names_line_and_fields() {
        let error = RecordError {
            row: 3,
            errors: vec![CoercionError {
                field: "quantidade".into(),
                value: "abc".into(),
                expected: "number",
            }],
        };
        assert_eq!(
            error.to_string(),
            "row 3: field 'quantidade': 'abc' is not a valid number"
        );
    }

    #[test]
    fn import_error_converts_into_batch_error() {
        let error: BatchError = ImportError::EmptyOrUnparseable.into();
        assert_eq!(
            error.to_string(),
            "the CSV file is empty or has no valid data"
        );
    }
}
