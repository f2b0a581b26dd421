use log::info;
use serde::Serialize;

use crate::{
    BatchError,
    core::item::{ItemWriter, ItemWriterResult},
};

/// Logs every item as a JSON line at `info` level. Useful to see what an
/// import would commit without touching any state.
#[derive(Default)]
pub struct LoggerWriter;

impl<T: Serialize> ItemWriter<T> for LoggerWriter {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        for item in items {
            let json = serde_json::to_string(item)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
            info!("Record:{}", json);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::Record;

    #[test]
    fn logger_accepts_records() {
        let writer = LoggerWriter;
        let records = vec![Record::new().with("nome", "Sal").with("preco", 2.5)];

        assert!(writer.write(&records).is_ok());
    }
}
