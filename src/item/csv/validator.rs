use crate::{
    core::record::{HeaderSet, Table},
    error::ImportError,
};

/// Outcome of checking parsed records against a required-field contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportResult {
    Valid(Table),
    /// Required headers absent from the file, in the order they were required.
    MissingHeaders(Vec<String>),
}

impl ImportResult {
    pub fn into_result(self) -> Result<Table, ImportError> {
        match self {
            ImportResult::Valid(table) => Ok(table),
            ImportResult::MissingHeaders(missing) => Err(ImportError::MissingHeaders(missing)),
        }
    }
}

/// Checks that every `required` header is a field of the first record.
///
/// Only the first record is inspected: ragged files whose later rows carry
/// other columns are not detected. With no records, every required header
/// is reported missing. On success the records are returned unchanged.
pub fn validate(records: Table, required: &HeaderSet) -> ImportResult {
    let missing: Vec<String> = {
        let first = records.first();
        required
            .iter()
            .filter(|header| !first.is_some_and(|record| record.contains(header)))
            .map(str::to_owned)
            .collect()
    };

    if missing.is_empty() {
        ImportResult::Valid(records)
    } else {
        ImportResult::MissingHeaders(missing)
    }
}
