use std::{
    cell::{Cell, RefCell},
    time::{Duration, Instant},
};

use log::{debug, error, info, warn};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ItemProcessor, ItemReader, ItemWriter},
};

#[derive(Debug, PartialEq)]
enum ChunkStatus {
    Error,
    Finished,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepStatus {
    Started,
    Success,
    Error,
}

/// Report of one step run.
#[derive(Debug)]
pub struct StepExecution {
    pub id: Uuid,
    pub name: String,
    pub status: StepStatus,
    pub start: Instant,
    pub end: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items handed to the writer without error
    pub write_count: usize,
    pub read_error_count: usize,
    pub process_error_count: usize,
    pub write_error_count: usize,
    /// Every error met along the way, skipped or fatal, in order.
    pub errors: Vec<BatchError>,
}

impl StepExecution {
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }

    pub fn skip_count(&self) -> usize {
        self.read_error_count + self.process_error_count + self.write_error_count
    }
}

/// A chunk-oriented step: read items until a chunk is full, process each
/// one, hand the chunk to the writer, repeat until the reader is exhausted.
///
/// Read and process failures are skipped and counted until their total
/// exceeds `skip_limit`, at which point the step stops with
/// [`StepStatus::Error`]. A failing `open` on either side fails the step
/// before any item is read.
pub struct StepInstance<'a, R, W> {
    id: Uuid,
    name: String,
    reader: &'a dyn ItemReader<R>,
    processor: &'a dyn ItemProcessor<R, W>,
    writer: &'a dyn ItemWriter<W>,
    chunk_size: usize,
    skip_limit: usize,
    read_count: Cell<usize>,
    write_count: Cell<usize>,
    read_error_count: Cell<usize>,
    process_error_count: Cell<usize>,
    write_error_count: Cell<usize>,
    errors: RefCell<Vec<BatchError>>,
}

impl<R, W> StepInstance<'_, R, W> {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn execute(&self) -> StepExecution {
        let start = Instant::now();

        info!("Start of step: {}, id: {}", self.name, self.id);

        let status = match self.reader.open().and_then(|_| self.writer.open()) {
            Ok(()) => self.run_chunks(),
            Err(err) => {
                error!("Unable to open step {}: {}", self.name, err);
                self.errors.borrow_mut().push(err);
                StepStatus::Error
            }
        };

        let status = match self.writer.close() {
            Ok(()) => status,
            Err(err) => {
                error!("ItemWriter close error: {}", err);
                self.errors.borrow_mut().push(err);
                StepStatus::Error
            }
        };

        info!(
            "End of step: {}, status: {:?}, read: {}, written: {}, skipped: {}",
            self.name,
            status,
            self.read_count.get(),
            self.write_count.get(),
            self.read_error_count.get()
                + self.process_error_count.get()
                + self.write_error_count.get()
        );

        StepExecution {
            id: self.id,
            name: self.name.clone(),
            status,
            start,
            end: Instant::now(),
            duration: start.elapsed(),
            read_count: self.read_count.get(),
            write_count: self.write_count.get(),
            read_error_count: self.read_error_count.get(),
            process_error_count: self.process_error_count.get(),
            write_error_count: self.write_error_count.get(),
            errors: self.errors.take(),
        }
    }

    fn run_chunks(&self) -> StepStatus {
        let mut read_items: Vec<R> = Vec::with_capacity(self.chunk_size);

        loop {
            let read_chunk_status = self.read_chunk(&mut read_items);

            if read_chunk_status == ChunkStatus::Error {
                return StepStatus::Error;
            }

            let processed_items = match self.process_chunk(&read_items) {
                Some(items) => items,
                None => return StepStatus::Error,
            };

            if self.write_chunk(&processed_items) == ChunkStatus::Error {
                return StepStatus::Error;
            }

            if read_chunk_status == ChunkStatus::Finished {
                return StepStatus::Success;
            }
        }
    }

    fn is_skip_limit_reached(&self) -> bool {
        self.read_error_count.get() + self.process_error_count.get() + self.write_error_count.get()
            > self.skip_limit
    }

    fn read_chunk(&self, read_items: &mut Vec<R>) -> ChunkStatus {
        debug!("Start reading chunk");
        read_items.clear();

        loop {
            match self.reader.read() {
                Ok(Some(item)) => {
                    read_items.push(item);
                    self.read_count.set(self.read_count.get() + 1);
                }
                Ok(None) => {
                    debug!("End reading chunk: FINISHED");
                    return ChunkStatus::Finished;
                }
                Err(err) => {
                    self.read_error_count.set(self.read_error_count.get() + 1);
                    warn!("Error occurred during read item: {}", err);
                    self.errors.borrow_mut().push(err);

                    if self.is_skip_limit_reached() {
                        return ChunkStatus::Error;
                    }
                }
            }

            if read_items.len() == self.chunk_size {
                debug!("End reading chunk: FULL");
                return ChunkStatus::Full;
            }
        }
    }

    /// `None` once the skip limit is exceeded.
    fn process_chunk(&self, read_items: &[R]) -> Option<Vec<W>> {
        let mut processed_items = Vec::with_capacity(read_items.len());

        debug!("Start processing chunk");
        for item in read_items {
            match self.processor.process(item) {
                Ok(processed) => processed_items.push(processed),
                Err(err) => {
                    self.process_error_count
                        .set(self.process_error_count.get() + 1);
                    warn!("Error occurred during process item: {}", err);
                    self.errors.borrow_mut().push(err);

                    if self.is_skip_limit_reached() {
                        return None;
                    }
                }
            }
        }
        debug!("End processing chunk");

        Some(processed_items)
    }

    fn write_chunk(&self, processed_items: &[W]) -> ChunkStatus {
        if processed_items.is_empty() {
            return ChunkStatus::Full;
        }

        debug!("Start writing chunk");

        match self.writer.write(processed_items).and_then(|_| self.writer.flush()) {
            Ok(()) => {
                self.write_count
                    .set(self.write_count.get() + processed_items.len());
                debug!("End writing chunk");
                ChunkStatus::Full
            }
            Err(err) => {
                self.write_error_count
                    .set(self.write_error_count.get() + processed_items.len());
                error!("ItemWriter error: {}", err);
                self.errors.borrow_mut().push(err);

                if self.is_skip_limit_reached() {
                    ChunkStatus::Error
                } else {
                    ChunkStatus::Full
                }
            }
        }
    }
}

pub struct StepBuilder<'a, R, W> {
    name: Option<String>,
    reader: Option<&'a dyn ItemReader<R>>,
    processor: Option<&'a dyn ItemProcessor<R, W>>,
    writer: Option<&'a dyn ItemWriter<W>>,
    chunk_size: usize,
    skip_limit: usize,
}

impl<R, W> Default for StepBuilder<'_, R, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, R, W> StepBuilder<'a, R, W> {
    pub fn new() -> Self {
        Self {
            name: None,
            reader: None,
            processor: None,
            writer: None,
            chunk_size: 1,
            skip_limit: 0,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn reader(mut self, reader: &'a impl ItemReader<R>) -> Self {
        self.reader = Some(reader);
        self
    }

    pub fn processor(mut self, processor: &'a impl ItemProcessor<R, W>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn writer(mut self, writer: &'a impl ItemWriter<W>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Number of items per write. Values below one are raised to one.
    pub fn chunk(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn skip_limit(mut self, skip_limit: usize) -> Self {
        self.skip_limit = skip_limit;
        self
    }

    pub fn build(self) -> Result<StepInstance<'a, R, W>, BatchError> {
        let name = self.name.unwrap_or_else(build_name);
        let reader = self
            .reader
            .ok_or_else(|| BatchError::Step(format!("{}: no reader configured", name)))?;
        let processor = self
            .processor
            .ok_or_else(|| BatchError::Step(format!("{}: no processor configured", name)))?;
        let writer = self
            .writer
            .ok_or_else(|| BatchError::Step(format!("{}: no writer configured", name)))?;

        Ok(StepInstance {
            id: Uuid::new_v4(),
            name,
            reader,
            processor,
            writer,
            chunk_size: self.chunk_size,
            skip_limit: self.skip_limit,
            read_count: Cell::new(0),
            write_count: Cell::new(0),
            read_error_count: Cell::new(0),
            process_error_count: Cell::new(0),
            write_error_count: Cell::new(0),
            errors: RefCell::new(Vec::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::item::{
        ItemProcessorResult, ItemReaderResult, ItemWriterResult, PassThroughProcessor,
    };

    struct VecReader {
        items: RefCell<Vec<Result<i64, BatchError>>>,
    }

    impl VecReader {
        fn new(mut items: Vec<Result<i64, BatchError>>) -> Self {
            items.reverse();
            Self {
                items: RefCell::new(items),
            }
        }
    }

    impl ItemReader<i64> for VecReader {
        fn read(&self) -> ItemReaderResult<i64> {
            match self.items.borrow_mut().pop() {
                Some(Ok(item)) => Ok(Some(item)),
                Some(Err(err)) => Err(err),
                None => Ok(None),
            }
        }
    }

    #[derive(Default)]
    struct VecWriter {
        items: RefCell<Vec<i64>>,
        chunks: Cell<usize>,
    }

    impl ItemWriter<i64> for VecWriter {
        fn write(&self, items: &[i64]) -> ItemWriterResult {
            self.chunks.set(self.chunks.get() + 1);
            self.items.borrow_mut().extend_from_slice(items);
            Ok(())
        }
    }

    struct RejectOdd;

    impl ItemProcessor<i64, i64> for RejectOdd {
        fn process(&self, item: &i64) -> ItemProcessorResult<i64> {
            if item % 2 == 0 {
                Ok(item * 10)
            } else {
                Err(BatchError::ItemProcessor(format!("{} is odd", item)))
            }
        }
    }

    #[test]
    fn step_writes_every_item_in_chunks() -> Result<(), BatchError> {
        let reader = VecReader::new((1..=5).map(Ok).collect());
        let writer = VecWriter::default();

        let step = StepBuilder::new()
            .name("numbers")
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .chunk(2)
            .build()?;

        let execution = step.execute();

        assert!(execution.is_success());
        assert_eq!(execution.read_count, 5);
        assert_eq!(execution.write_count, 5);
        assert_eq!(*writer.items.borrow(), vec![1, 2, 3, 4, 5]);
        assert_eq!(writer.chunks.get(), 3);
        Ok(())
    }

    #[test]
    fn processor_errors_within_skip_limit_are_skipped() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![Ok(1), Ok(2), Ok(4)]);
        let writer = VecWriter::default();

        let step = StepBuilder::new()
            .reader(&reader)
            .processor(&RejectOdd)
            .writer(&writer)
            .chunk(10)
            .skip_limit(1)
            .build()?;

        let execution = step.execute();

        assert!(execution.is_success());
        assert_eq!(execution.process_error_count, 1);
        assert_eq!(execution.errors.len(), 1);
        assert_eq!(*writer.items.borrow(), vec![20, 40]);
        Ok(())
    }

    #[test]
    fn step_fails_when_skip_limit_is_exceeded() -> Result<(), BatchError> {
        let reader = VecReader::new(vec![
            Ok(2),
            Err(BatchError::ItemReader("broken line".into())),
        ]);
        let writer = VecWriter::default();

        let step = StepBuilder::new()
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .chunk(10)
            .build()?;

        let execution = step.execute();

        assert_eq!(execution.status, StepStatus::Error);
        assert_eq!(execution.read_error_count, 1);
        assert!(writer.items.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn build_without_writer_is_an_error() {
        let reader = VecReader::new(vec![]);
        let result = StepBuilder::<i64, i64>::new()
            .name("incomplete")
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .build();

        assert!(matches!(result, Err(BatchError::Step(message)) if message.contains("no writer")));
    }
}
