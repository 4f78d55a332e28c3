use crate::error::GeocolumnError;
use crate::input::{CsvTable, InputRow};
use crate::resolver::{resolve_rows, RowProgress};
use crate::writer::write_batch;
use crate::GeocodeContext;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// Messages from the background worker to whoever started the run
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Processing began over this many non-empty values
    Started { total: usize },
    /// One row was resolved (successfully or not)
    Row(RowProgress),
    /// All rows processed and the results were saved
    Finished {
        output_path: PathBuf,
        total: usize,
        failed: usize,
        not_found: usize,
    },
    /// All rows processed but the results could not be saved
    WriteFailed { message: String },
}

/// A running geocoding job
pub struct GeocodeJob {
    events: Receiver<ProgressEvent>,
    handle: Option<JoinHandle<()>>,
}

impl GeocodeJob {
    /// Validate the selection and start the worker thread
    ///
    /// Selection problems are reported here, before any request is made.
    pub fn start(
        context: &GeocodeContext,
        table: Option<&CsvTable>,
        column: Option<&str>,
    ) -> Result<Self, GeocolumnError> {
        let table = table.ok_or_else(|| {
            GeocolumnError::Selection("Load a CSV file first.".to_string())
        })?;
        if table.row_count() == 0 {
            return Err(GeocolumnError::Selection(
                "The CSV file has no data rows.".to_string(),
            ));
        }
        let column = column
            .ok_or_else(|| GeocolumnError::Selection("Select a column.".to_string()))?;

        let rows = table.column_values(column)?;
        Ok(Self::spawn(context.clone(), table.path().to_path_buf(), rows))
    }

    fn spawn(context: GeocodeContext, input_path: PathBuf, rows: Vec<InputRow>) -> Self {
        let (tx, rx) = mpsc::channel();

        let handle = std::thread::spawn(move || {
            run_worker(&context, &input_path, &rows, &tx);
        });

        Self {
            events: rx,
            handle: Some(handle),
        }
    }

    /// Non-blocking: all events that have arrived so far
    pub fn poll(&self) -> Vec<ProgressEvent> {
        self.events.try_iter().collect()
    }

    /// Blocking: next event, or `None` once the worker has finished and every
    /// event has been delivered
    pub fn next_event(&self) -> Option<ProgressEvent> {
        self.events.recv().ok()
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the worker thread to exit
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Geocoding worker thread panicked");
            }
        }
    }
}

fn run_worker(
    context: &GeocodeContext,
    input_path: &std::path::Path,
    rows: &[InputRow],
    tx: &Sender<ProgressEvent>,
) {
    let total = rows.len();
    log::info!("Processing {} values from {}", total, input_path.display());

    // A closed receiver only means nobody is watching; keep going
    let _ = tx.send(ProgressEvent::Started { total });

    let batch = resolve_rows(context.geocoder(), rows, |progress| {
        let _ = tx.send(ProgressEvent::Row(progress.clone()));
    });

    log::info!(
        "Processing complete: {} values, {} failed, {} without result",
        batch.len(),
        batch.failed_count(),
        batch.not_found_count()
    );

    let event = match write_batch(input_path, &batch) {
        Ok(output_path) => ProgressEvent::Finished {
            output_path,
            total: batch.len(),
            failed: batch.failed_count(),
            not_found: batch.not_found_count(),
        },
        Err(e) => {
            log::error!("{}", e);
            ProgressEvent::WriteFailed {
                message: e.to_string(),
            }
        }
    };
    let _ = tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::FakeGeocoder;
    use crate::resolver::ResolutionRecord;
    use crate::GeocodeConfig;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(geocoder: FakeGeocoder) -> GeocodeContext {
        GeocodeContext::new(GeocodeConfig::default(), Arc::new(geocoder))
    }

    fn collect(job: &GeocodeJob) -> Vec<ProgressEvent> {
        std::iter::from_fn(|| job.next_event()).collect()
    }

    #[test]
    fn test_job_runs_to_completion() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("stations.csv");
        fs::write(&input, "name\nSeoul Station\n\nNonexistent Place 12345\nbroken\n")?;
        let table = CsvTable::load(&input)?;

        let context = context(FakeGeocoder::failing_on(&["broken"]));
        let job = GeocodeJob::start(&context, Some(&table), Some("name"))?;
        let events = collect(&job);
        job.join();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0], ProgressEvent::Started { total: 3 });
        match &events[3] {
            ProgressEvent::Row(progress) => {
                assert_eq!(progress.position, 3);
                assert!(matches!(progress.record, ResolutionRecord::Failed { .. }));
            }
            other => panic!("expected row event, got {:?}", other),
        }

        let output_path = temp_dir.path().join("stations_coordinates.csv");
        assert_eq!(
            events[4],
            ProgressEvent::Finished {
                output_path: output_path.clone(),
                total: 3,
                failed: 1,
                not_found: 1,
            }
        );
        assert!(output_path.exists());
        Ok(())
    }

    #[test]
    fn test_empty_column_reports_write_failed() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("blank.csv");
        fs::write(&input, "name,other\n,x\nNA,y\n")?;
        let table = CsvTable::load(&input)?;

        let job = GeocodeJob::start(&context(FakeGeocoder::default()), Some(&table), Some("name"))?;
        let events = collect(&job);

        assert_eq!(events[0], ProgressEvent::Started { total: 0 });
        assert!(matches!(events[1], ProgressEvent::WriteFailed { .. }));
        Ok(())
    }

    #[test]
    fn test_selection_errors() -> anyhow::Result<()> {
        let context = context(FakeGeocoder::default());

        let err = GeocodeJob::start(&context, None, Some("name")).err().unwrap();
        assert!(matches!(err, GeocolumnError::Selection(_)));

        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("a.csv");
        fs::write(&input, "name\nSeoul\n")?;
        let table = CsvTable::load(&input)?;

        let err = GeocodeJob::start(&context, Some(&table), None).err().unwrap();
        assert!(matches!(err, GeocolumnError::Selection(_)));

        let err = GeocodeJob::start(&context, Some(&table), Some("missing")).err().unwrap();
        assert!(matches!(err, GeocolumnError::Selection(_)));
        Ok(())
    }
}
