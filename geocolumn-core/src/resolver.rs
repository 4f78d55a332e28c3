use crate::classifier::{classify, ClassifiedValue, ValueKind};
use crate::error::RequestFailed;
use crate::geocoding::Geocoder;
use crate::input::InputRow;

/// Address written when reverse geocoding finds no candidate
pub const NO_ADDRESS: &str = "no address";

/// Output of resolving one input value
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionRecord {
    /// Coordinate input resolved to an address (or [`NO_ADDRESS`])
    Address {
        original: String,
        resolved_address: String,
    },
    /// Address input resolved to coordinates; both empty when nothing matched
    Coordinates {
        original: String,
        lat: String,
        lon: String,
    },
    /// The request for this row failed
    Failed { original: String, error: String },
}

impl ResolutionRecord {
    pub fn original(&self) -> &str {
        match self {
            ResolutionRecord::Address { original, .. }
            | ResolutionRecord::Coordinates { original, .. }
            | ResolutionRecord::Failed { original, .. } => original,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ResolutionRecord::Failed { .. })
    }

    /// Whether this record carries no result (service found nothing)
    pub fn is_not_found(&self) -> bool {
        match self {
            ResolutionRecord::Address {
                resolved_address, ..
            } => resolved_address == NO_ADDRESS,
            ResolutionRecord::Coordinates { lat, lon, .. } => lat.is_empty() && lon.is_empty(),
            ResolutionRecord::Failed { .. } => false,
        }
    }

    /// Human-readable progress text for this record
    pub fn describe(&self) -> String {
        match self {
            ResolutionRecord::Address {
                original,
                resolved_address,
            } => format!("{} -> address: {}", original, resolved_address),
            ResolutionRecord::Coordinates { original, .. } if self.is_not_found() => {
                format!("{} -> no coordinates", original)
            }
            ResolutionRecord::Coordinates { original, lat, lon } => {
                format!("{} -> lat {}, lon {}", original, lat, lon)
            }
            ResolutionRecord::Failed { original, error } => {
                format!("{} -> error: {}", original, error)
            }
        }
    }
}

/// Ordered records of one run, one per processed input row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionBatch {
    records: Vec<ResolutionRecord>,
}

impl ResolutionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResolutionRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResolutionRecord] {
        &self.records
    }

    pub fn first(&self) -> Option<&ResolutionRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }

    pub fn not_found_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_not_found()).count()
    }

    /// True when the batch holds both address-shaped and coordinate-shaped
    /// records (failed rows are shape-neutral)
    pub fn is_mixed(&self) -> bool {
        let has_address = self
            .records
            .iter()
            .any(|r| matches!(r, ResolutionRecord::Address { .. }));
        let has_coordinates = self
            .records
            .iter()
            .any(|r| matches!(r, ResolutionRecord::Coordinates { .. }));
        has_address && has_coordinates
    }
}

/// Progress of one processed row
#[derive(Debug, Clone, PartialEq)]
pub struct RowProgress {
    /// 1-based position among the values being processed
    pub position: usize,
    pub total: usize,
    pub record: ResolutionRecord,
}

impl RowProgress {
    pub fn line(&self) -> String {
        format!("[{}/{}] {}", self.position, self.total, self.record.describe())
    }
}

/// Resolve one classified value with the matching geocoding operation
///
/// The first candidate wins: results are taken in the service's own order and
/// never re-ranked.
pub fn resolve_value(
    geocoder: &dyn Geocoder,
    value: &ClassifiedValue,
) -> Result<ResolutionRecord, RequestFailed> {
    let original = value.raw.clone();

    match &value.kind {
        ValueKind::Coordinate { lat, lon } => {
            let candidates = geocoder.reverse_geocode(*lat, *lon)?;
            let resolved_address = candidates
                .into_iter()
                .next()
                .map(|c| c.formatted_address)
                .unwrap_or_else(|| NO_ADDRESS.to_string());
            Ok(ResolutionRecord::Address {
                original,
                resolved_address,
            })
        }
        ValueKind::AddressText { text } => {
            let candidates = geocoder.forward_geocode(text)?;
            let (lat, lon) = match candidates.first() {
                Some(c) => (c.lat.to_string(), c.lon.to_string()),
                None => (String::new(), String::new()),
            };
            Ok(ResolutionRecord::Coordinates { original, lat, lon })
        }
    }
}

/// Run the resolution loop over every row, strictly one request at a time
///
/// Row failures are folded into the batch as [`ResolutionRecord::Failed`];
/// the loop itself never fails and never skips or reorders rows.
pub fn resolve_rows(
    geocoder: &dyn Geocoder,
    rows: &[InputRow],
    mut on_row: impl FnMut(&RowProgress),
) -> ResolutionBatch {
    let total = rows.len();
    let mut batch = ResolutionBatch::new();

    for row in rows {
        let classified = classify(&row.raw, &row.value);

        let record = match resolve_value(geocoder, &classified) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Geocoding failed for '{}': {}", row.raw, e);
                ResolutionRecord::Failed {
                    original: row.raw.clone(),
                    error: e.message,
                }
            }
        };

        let progress = RowProgress {
            position: row.row_index + 1,
            total,
            record,
        };
        log::debug!("{}", progress.line());
        on_row(&progress);

        batch.push(progress.record);
    }

    batch
}
