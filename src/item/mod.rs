#[cfg(feature = "logger")]
/// This module provides a logger item writer, useful for debugging purposes.
pub mod logger;

/// This module provides the CSV reader, writer and header validator.
pub mod csv;

/// Typed mapping between records and domain values.
pub mod mapping;

/// In-memory staging of imported items.
pub mod memory;
