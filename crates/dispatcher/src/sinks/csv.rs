//! CsvWriter - appends records to the coordinator's CSV log

use contracts::{Batch, ContractError, EventRecord, RecordSink, CSV_HEADERS};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument};

use crate::metrics::WriterMetrics;

/// Header line, without terminator
pub fn header_line() -> String {
    CSV_HEADERS.join(",")
}

/// Format one record as a CSV line, without terminator
///
/// Absent status and empty error fields become empty cells. Embedded
/// commas are not escaped.
pub fn format_record(record: &EventRecord) -> String {
    let status = record
        .status_code()
        .map(|s| s.to_string())
        .unwrap_or_default();

    format!(
        "{},{},{},{},{},{}",
        record.endpoint(),
        status,
        record.request_start_ms(),
        format_duration(record.response_duration_ms()),
        record.error_kind(),
        record.error_message()
    )
}

/// Durations always carry a fractional part (`12.0`, never `12`)
fn format_duration(duration_ms: f64) -> String {
    if duration_ms.is_finite() && duration_ms.fract() == 0.0 {
        format!("{duration_ms:.1}")
    } else {
        duration_ms.to_string()
    }
}

/// File handle behind a CsvWriter
trait SinkFile: Write + Send {
    fn sync(&self) -> std::io::Result<()>;
}

impl SinkFile for File {
    fn sync(&self) -> std::io::Result<()> {
        self.sync_data()
    }
}

type SinkBuffer = BufWriter<Box<dyn SinkFile>>;

enum WriterState {
    Uninit,
    Open(SinkBuffer),
    /// A write failed; the file may end in a torn line and takes no more data
    Failed,
}

/// Sink that appends batches to a CSV file
///
/// One mutex guards the file handle, so every `append` lands as one
/// contiguous block no matter which thread calls it. After any write
/// error the writer refuses every further call.
pub struct CsvWriter {
    name: String,
    path: PathBuf,
    sync_data: bool,
    state: Mutex<WriterState>,
    metrics: Arc<WriterMetrics>,
}

impl CsvWriter {
    /// Create a writer; nothing is opened until `init`
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, sync_data: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            sync_data,
            state: Mutex::new(WriterState::Uninit),
            metrics: Arc::new(WriterMetrics::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metrics(&self) -> &Arc<WriterMetrics> {
        &self.metrics
    }

    fn lock(&self) -> Result<MutexGuard<'_, WriterState>, ContractError> {
        self.state
            .lock()
            .map_err(|_| ContractError::sink_state(&self.name, "writer lock poisoned"))
    }

    fn open_fresh(&self) -> std::io::Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // File::create truncates any previous run
        File::create(&self.path)
    }

    /// Open through `open` and write the header, once
    fn init_with(
        &self,
        open: impl FnOnce() -> std::io::Result<Box<dyn SinkFile>>,
    ) -> Result<(), ContractError> {
        let mut guard = self.lock()?;
        if !matches!(*guard, WriterState::Uninit) {
            return Err(self.fail(ContractError::sink_state(&self.name, "already initialized")));
        }

        let file = open().map_err(|e| {
            self.fail(ContractError::sink_open(
                &self.name,
                format!("{}: {e}", self.path.display()),
            ))
        })?;

        let mut writer = BufWriter::new(file);
        let header = format!("{}\n", header_line());
        if let Err(e) = self.write_block(&mut writer, &header) {
            discard(writer);
            *guard = WriterState::Failed;
            return Err(self.fail(ContractError::sink_write(&self.name, e.to_string())));
        }

        *guard = WriterState::Open(writer);
        info!(sink = %self.name, path = %self.path.display(), "CSV sink initialized");
        Ok(())
    }

    fn write_block(&self, writer: &mut SinkBuffer, block: &str) -> std::io::Result<()> {
        writer.write_all(block.as_bytes())?;
        writer.flush()?;
        if self.sync_data {
            writer.get_ref().sync()?;
        }
        Ok(())
    }

    fn fail(&self, err: ContractError) -> ContractError {
        self.metrics.inc_failure_count();
        error!(sink = %self.name, path = %self.path.display(), error = %err, "Sink failure");
        err
    }
}

/// Drop a writer without flushing what is still buffered
fn discard(writer: SinkBuffer) {
    let (_file, unflushed) = writer.into_parts();
    let pending = unflushed.map(|buf| buf.len()).unwrap_or_default();
    debug!(pending, "unflushed bytes dropped");
}

impl RecordSink for CsvWriter {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "csv_writer_init", skip(self), fields(sink = %self.name, path = %self.path.display()))]
    fn init(&self) -> Result<(), ContractError> {
        self.init_with(|| Ok(Box::new(self.open_fresh()?) as Box<dyn SinkFile>))
    }

    fn append(&self, batch: &Batch) -> Result<(), ContractError> {
        if batch.is_empty() {
            debug!(sink = %self.name, "empty batch ignored");
            return Ok(());
        }

        // Format outside the lock
        let mut block = String::with_capacity(batch.len() * 64);
        for record in batch.iter() {
            block.push_str(&format_record(record));
            block.push('\n');
        }

        let mut guard = self.lock()?;
        let writer = match &mut *guard {
            WriterState::Open(writer) => writer,
            WriterState::Uninit => {
                return Err(self.fail(ContractError::sink_state(&self.name, "append before init")));
            }
            WriterState::Failed => {
                return Err(self.fail(ContractError::sink_state(
                    &self.name,
                    "sink failed on an earlier write",
                )));
            }
        };

        if let Err(e) = self.write_block(writer, &block) {
            if let WriterState::Open(writer) = std::mem::replace(&mut *guard, WriterState::Failed)
            {
                discard(writer);
            }
            return Err(self.fail(ContractError::sink_write(&self.name, e.to_string())));
        }

        self.metrics.inc_written(batch.len());
        debug!(
            sink = %self.name,
            origin = %batch.origin(),
            records = batch.len(),
            "Batch appended"
        );
        Ok(())
    }
}
