/// Field contents treated as missing, matching what spreadsheet and dataframe
/// tooling drops when reading a CSV
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Typed view of one raw CSV field
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Interpret a raw field the way a dataframe reader would: missing markers
    /// become `Empty`, fields that are a bare number become `Number`
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return CellValue::Empty;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(field.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// What a cell value turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// A "lat,lon" pair, both components finite
    Coordinate { lat: f64, lon: f64 },
    /// Anything else, sent to forward geocoding as-is
    AddressText { text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedValue {
    pub raw: String,
    pub kind: ValueKind,
}

/// Classify a cell value as a coordinate pair or address text
///
/// Only text values are eligible to be coordinates. The value is split once on
/// the first comma and both halves must parse as finite floats after trimming.
/// Never fails: anything that doesn't qualify is address text.
pub fn classify(raw: &str, value: &CellValue) -> ClassifiedValue {
    let kind = match value {
        CellValue::Text(text) => match parse_lat_lon(text) {
            Some((lat, lon)) => ValueKind::Coordinate { lat, lon },
            None => ValueKind::AddressText { text: text.clone() },
        },
        CellValue::Number(_) | CellValue::Empty => ValueKind::AddressText {
            text: raw.to_string(),
        },
    };

    ClassifiedValue {
        raw: raw.to_string(),
        kind,
    }
}

/// Parse "lat,lon" with arbitrary whitespace around either number
fn parse_lat_lon(text: &str) -> Option<(f64, f64)> {
    let (lat_str, lon_str) = text.split_once(',')?;
    let lat = parse_finite(lat_str)?;
    let lon = parse_finite(lon_str)?;
    Some((lat, lon))
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_text(s: &str) -> ValueKind {
        classify(s, &CellValue::from_field(s)).kind
    }

    #[test]
    fn test_coordinate_pairs() {
        assert_eq!(
            classify_text("37.5,127.0"),
            ValueKind::Coordinate { lat: 37.5, lon: 127.0 }
        );
        assert_eq!(
            classify_text("  -33.8688 ,\t151.2093  "),
            ValueKind::Coordinate { lat: -33.8688, lon: 151.2093 }
        );
        assert_eq!(
            classify_text("1e1,2"),
            ValueKind::Coordinate { lat: 10.0, lon: 2.0 }
        );
    }

    #[test]
    fn test_no_comma_is_address() {
        assert_eq!(
            classify_text("Seoul Station"),
            ValueKind::AddressText { text: "Seoul Station".to_string() }
        );
    }

    #[test]
    fn test_non_numeric_half_is_address() {
        for s in ["Seoul, Korea", "37.5,east", "north,127.0", "1,2,3", ",", "37.5,"] {
            assert!(
                matches!(classify_text(s), ValueKind::AddressText { .. }),
                "{s} should be address text"
            );
        }
    }

    #[test]
    fn test_non_finite_is_address() {
        assert!(matches!(classify_text("inf,1"), ValueKind::AddressText { .. }));
        assert!(matches!(classify_text("1,NaN"), ValueKind::AddressText { .. }));
    }

    #[test]
    fn test_number_cell_is_address() {
        let value = CellValue::from_field("12345");
        assert_eq!(value, CellValue::Number(12345.0));
        assert_eq!(
            classify("12345", &value).kind,
            ValueKind::AddressText { text: "12345".to_string() }
        );
    }

    #[test]
    fn test_classification_is_idempotent() {
        for s in ["37.5,127.0", "Seoul Station", "1,2,3", "42"] {
            let value = CellValue::from_field(s);
            assert_eq!(classify(s, &value), classify(s, &value));
        }
    }

    #[test]
    fn test_missing_markers() {
        assert!(CellValue::from_field("").is_empty());
        assert!(CellValue::from_field("   ").is_empty());
        assert!(CellValue::from_field("NA").is_empty());
        assert!(CellValue::from_field("null").is_empty());
        assert!(!CellValue::from_field("Namsan").is_empty());
    }
}
