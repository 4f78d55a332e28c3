use crate::error::GeocolumnError;
use crate::resolver::{ResolutionBatch, ResolutionRecord};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Which kind of output file a batch produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Reverse geocoding: coordinates in, addresses out
    Addresses,
    /// Forward geocoding: addresses in, coordinates out
    Coordinates,
}

impl OutputMode {
    /// Decide the mode from the first record only
    ///
    /// A mixed batch keeps the first record's mode. A leading failed record
    /// carries no address, so it selects `Coordinates`.
    pub fn for_batch(batch: &ResolutionBatch) -> Option<Self> {
        batch.first().map(|record| match record {
            ResolutionRecord::Address { .. } => OutputMode::Addresses,
            ResolutionRecord::Coordinates { .. } | ResolutionRecord::Failed { .. } => {
                OutputMode::Coordinates
            }
        })
    }

    fn suffix(self) -> &'static str {
        match self {
            OutputMode::Addresses => "_addresses.csv",
            OutputMode::Coordinates => "_coordinates.csv",
        }
    }
}

/// Output path next to the input: `<stem>_addresses.csv` or `<stem>_coordinates.csv`
pub fn output_path(input_path: &Path, mode: OutputMode) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let file_name = format!("{}{}", stem, mode.suffix());
    match input_path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Original,
    Address,
    Lat,
    Lon,
    Error,
}

impl Column {
    fn header(self) -> &'static str {
        match self {
            Column::Original => "original",
            Column::Address => "address",
            Column::Lat => "lat",
            Column::Lon => "lon",
            Column::Error => "error",
        }
    }

    fn value(self, record: &ResolutionRecord) -> &str {
        match (self, record) {
            (Column::Original, r) => r.original(),
            (Column::Address, ResolutionRecord::Address { resolved_address, .. }) => {
                resolved_address
            }
            (Column::Lat, ResolutionRecord::Coordinates { lat, .. }) => lat,
            (Column::Lon, ResolutionRecord::Coordinates { lon, .. }) => lon,
            (Column::Error, ResolutionRecord::Failed { error, .. }) => error,
            _ => "",
        }
    }
}

fn record_columns(record: &ResolutionRecord) -> &'static [Column] {
    match record {
        ResolutionRecord::Address { .. } => &[Column::Original, Column::Address],
        ResolutionRecord::Coordinates { .. } => &[Column::Original, Column::Lat, Column::Lon],
        ResolutionRecord::Failed { .. } => &[Column::Original, Column::Error],
    }
}

/// Union of the batch's columns in order of first appearance
fn batch_columns(batch: &ResolutionBatch) -> Vec<Column> {
    let mut columns = Vec::new();
    for record in batch.records() {
        for column in record_columns(record) {
            if !columns.contains(column) {
                columns.push(*column);
            }
        }
    }
    columns
}

/// Write a completed batch next to the input file and return the output path
///
/// The file is UTF-8 with a byte-order mark. Every record becomes one row; a
/// record leaves the columns it doesn't carry empty.
pub fn write_batch(input_path: &Path, batch: &ResolutionBatch) -> Result<PathBuf, GeocolumnError> {
    let mode = OutputMode::for_batch(batch)
        .ok_or_else(|| GeocolumnError::WriteFailed("No results to save".to_string()))?;

    if batch.is_mixed() {
        log::warn!(
            "Column mixes addresses and coordinates; saving as {:?} based on the first value",
            mode
        );
    }

    let path = output_path(input_path, mode);
    write_csv(&path, batch).map_err(|e| GeocolumnError::WriteFailed(format!("{:#}", e)))?;

    log::info!("Saved {} results to {}", batch.len(), path.display());
    Ok(path)
}

fn write_csv(path: &Path, batch: &ResolutionBatch) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM)?;

    let columns = batch_columns(batch);
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(columns.iter().map(|c| c.header()))?;
    for record in batch.records() {
        writer.write_record(columns.iter().map(|c| c.value(record)))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_rows;
    use crate::resolver::tests::{rows, FakeGeocoder};
    use std::fs;
    use tempfile::TempDir;

    fn address(original: &str, resolved: &str) -> ResolutionRecord {
        ResolutionRecord::Address {
            original: original.to_string(),
            resolved_address: resolved.to_string(),
        }
    }

    fn coordinates(original: &str, lat: &str, lon: &str) -> ResolutionRecord {
        ResolutionRecord::Coordinates {
            original: original.to_string(),
            lat: lat.to_string(),
            lon: lon.to_string(),
        }
    }

    fn batch_of(records: Vec<ResolutionRecord>) -> ResolutionBatch {
        let mut batch = ResolutionBatch::new();
        for record in records {
            batch.push(record);
        }
        batch
    }

    fn read_output(path: &Path) -> String {
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM), "output must start with a BOM");
        String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap()
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("/data/stations.csv");
        assert_eq!(
            output_path(input, OutputMode::Addresses),
            PathBuf::from("/data/stations_addresses.csv")
        );
        assert_eq!(
            output_path(input, OutputMode::Coordinates),
            PathBuf::from("/data/stations_coordinates.csv")
        );
        assert_eq!(
            output_path(Path::new("list.v2.csv"), OutputMode::Coordinates),
            PathBuf::from("list.v2_coordinates.csv")
        );
    }

    #[test]
    fn test_mode_from_first_record() {
        let batch = batch_of(vec![address("37.5,127.0", "Seoul")]);
        assert_eq!(OutputMode::for_batch(&batch), Some(OutputMode::Addresses));

        let batch = batch_of(vec![coordinates("Seoul", "37.5", "127.0")]);
        assert_eq!(OutputMode::for_batch(&batch), Some(OutputMode::Coordinates));

        assert_eq!(OutputMode::for_batch(&ResolutionBatch::new()), None);
    }

    #[test]
    fn test_leading_failure_selects_coordinates() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("points.csv");
        let batch = batch_of(vec![
            ResolutionRecord::Failed {
                original: "37.5,127.0".to_string(),
                error: "REQUEST_DENIED".to_string(),
            },
            address("37.6,127.1", "Seoul"),
        ]);
        assert_eq!(OutputMode::for_batch(&batch), Some(OutputMode::Coordinates));

        let path = write_batch(&input, &batch)?;
        assert_eq!(path, temp_dir.path().join("points_coordinates.csv"));
        assert_eq!(
            read_output(&path),
            "original,error,address\n\
             \"37.5,127.0\",REQUEST_DENIED,\n\
             \"37.6,127.1\",,Seoul\n"
        );
        Ok(())
    }

    #[test]
    fn test_write_addresses() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("points.csv");
        let batch = batch_of(vec![
            address("37.5665,126.978", "대한민국 서울특별시 중구 세종대로 110"),
            address("0,0", "no address"),
        ]);

        let path = write_batch(&input, &batch)?;
        assert_eq!(path, temp_dir.path().join("points_addresses.csv"));
        assert_eq!(
            read_output(&path),
            "original,address\n\
             \"37.5665,126.978\",대한민국 서울특별시 중구 세종대로 110\n\
             \"0,0\",no address\n"
        );
        Ok(())
    }

    #[test]
    fn test_write_coordinates_with_failure() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("places.csv");
        let batch = batch_of(vec![
            coordinates("Seoul Station", "37.5546788", "126.9706069"),
            coordinates("Nonexistent Place 12345", "", ""),
            ResolutionRecord::Failed {
                original: "Busan".to_string(),
                error: "REQUEST_DENIED".to_string(),
            },
        ]);

        let path = write_batch(&input, &batch)?;
        assert_eq!(path, temp_dir.path().join("places_coordinates.csv"));
        assert_eq!(
            read_output(&path),
            "original,lat,lon,error\n\
             Seoul Station,37.5546788,126.9706069,\n\
             Nonexistent Place 12345,,,\n\
             Busan,,,REQUEST_DENIED\n"
        );
        Ok(())
    }

    #[test]
    fn test_mixed_batch_first_record_wins() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("mixed.csv");
        let geocoder = FakeGeocoder::default();
        let batch = resolve_rows(&geocoder, &rows(&["37.5,127.0", "Seoul Station", ""]), |_| {});

        let path = write_batch(&input, &batch)?;
        assert_eq!(path, temp_dir.path().join("mixed_addresses.csv"));
        assert_eq!(
            read_output(&path),
            "original,address,lat,lon\n\
             \"37.5,127.0\",\"Somewhere near 37.5,127\",,\n\
             Seoul Station,,37.5546788,126.9706069\n"
        );
        Ok(())
    }

    #[test]
    fn test_empty_batch_is_write_failed() {
        let err = write_batch(Path::new("/tmp/empty.csv"), &ResolutionBatch::new()).unwrap_err();
        assert!(matches!(err, GeocolumnError::WriteFailed(_)));
    }

    #[test]
    fn test_unwritable_directory_is_write_failed() {
        let batch = batch_of(vec![address("1,2", "x")]);
        let err = write_batch(Path::new("/nonexistent/dir/in.csv"), &batch).unwrap_err();
        match err {
            GeocolumnError::WriteFailed(msg) => assert!(msg.contains("Failed to create")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
