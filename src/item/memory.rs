use std::cell::RefCell;

use log::debug;

use crate::core::item::{ItemWriter, ItemWriterResult};

/// Collects written items in memory until the caller decides to keep them.
///
/// Nothing reaches the caller's state while a step runs: the staged items
/// are only handed over by [`StagingWriter::into_items`], which an import
/// calls once the step has succeeded. Dropping the writer discards them.
pub struct StagingWriter<T> {
    staged: RefCell<Vec<T>>,
}

impl<T> Default for StagingWriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StagingWriter<T> {
    pub fn new() -> Self {
        Self {
            staged: RefCell::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.staged.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.borrow().is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.staged.into_inner()
    }
}

impl<T: Clone> ItemWriter<T> for StagingWriter<T> {
    fn write(&self, items: &[T]) -> ItemWriterResult {
        self.staged.borrow_mut().extend_from_slice(items);
        debug!("Staged {} items", items.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_items_keep_write_order() {
        let writer = StagingWriter::new();

        writer.write(&["a", "b"]).unwrap();
        writer.write(&["c"]).unwrap();

        assert_eq!(writer.len(), 3);
        assert_eq!(writer.into_items(), vec!["a", "b", "c"]);
    }
}
