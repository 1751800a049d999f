// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Reads the tweet CSV into RawRecords using the csv crate.
//
// Expected columns (header row required):
//   id, keyword, location, text, target
//
// Column handling:
//   - `text` is required
//   - the label column is `target` (renamed to `labels`) or
//     already `labels`; one of them is required
//   - `id`, `keyword`, `location` are optional and carried along
//
// Encoding:
//   The file is decoded as ISO-8859-1, where every byte maps to
//   the Unicode code point of the same value. Any byte sequence
//   is therefore readable; the normalizer later drops everything
//   that is not an ASCII letter anyway.
//
// Missing values:
//   An empty field, or one of the usual NA markers ("NA", "NaN",
//   "null", ...), becomes None. Rows with None text or label are
//   dropped by the DatasetPreparer, not here. A row with fewer
//   fields than the header reads its missing trailing fields as
//   None; a row with more fields is fatal.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::{fs, path::PathBuf};

use anyhow::Result;

use crate::data::DatasetError;
use crate::domain::record::RawRecord;
use crate::domain::traits::RecordSource;

/// Field values read as missing, in addition to the empty string.
const NA_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true when a CSV field counts as a missing value.
pub fn is_missing(field: &str) -> bool {
    field.is_empty() || NA_MARKERS.contains(&field)
}

/// Decode ISO-8859-1 bytes. Every byte is a valid code point, so this cannot fail.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Loads RawRecords from a single CSV file.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse already-decoded CSV text.
    pub fn parse(&self, content: &str) -> Result<Vec<RawRecord>, DatasetError> {
        let path = self.path.display().to_string();
        let csv_err = |source| DatasetError::Csv { path: path.clone(), source };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        // ── Column selection ──────────────────────────────────────────────────
        let headers = reader.headers().map_err(csv_err)?.clone();
        let column  = |name: &str| headers.iter().position(|h| h.trim() == name);

        let text_idx  = column("text").ok_or(DatasetError::MissingColumn("text"))?;
        let label_idx = column("target")
            .or_else(|| column("labels"))
            .ok_or(DatasetError::MissingColumn("target"))?;
        let id_idx       = column("id");
        let keyword_idx  = column("keyword");
        let location_idx = column("location");

        // ── Rows ──────────────────────────────────────────────────────────────
        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row.map_err(csv_err)?;
            if row.len() > headers.len() {
                return Err(DatasetError::TooManyFields {
                    row:      i + 1,
                    expected: headers.len(),
                    found:    row.len(),
                });
            }
            let field = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i))
                    .filter(|v| !is_missing(v))
                    .map(str::to_string)
            };
            records.push(RawRecord {
                id:       field(id_idx),
                keyword:  field(keyword_idx),
                location: field(location_idx),
                text:     field(Some(text_idx)),
                label:    field(Some(label_idx)),
            });
        }

        Ok(records)
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<RawRecord>> {
        let bytes = fs::read(&self.path).map_err(|source| DatasetError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        let records = self.parse(&decode_latin1(&bytes))?;
        tracing::info!(
            "Loaded {} rows from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "id,keyword,location,text,target\n\
                       1,,,Our Deeds are the Reason of this #earthquake,1\n\
                       4,fire,Canada,\"Forest fire near La Ronge Sask. Canada\",1\n\
                       7,,,,0\n\
                       9,,,What a lovely day,NaN\n";

    #[test]
    fn test_parses_rows_and_missing_fields() {
        let loader  = CsvLoader::new("inline.csv");
        let records = loader.parse(CSV).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].label.as_deref(), Some("1"));
        assert_eq!(records[0].keyword, None);
        assert_eq!(records[1].location.as_deref(), Some("Canada"));
        assert_eq!(records[1].text.as_deref(), Some("Forest fire near La Ronge Sask. Canada"));
        assert_eq!(records[2].text, None);
        assert_eq!(records[3].label, None);
    }

    #[test]
    fn test_short_row_reads_missing_fields_as_none() {
        let loader  = CsvLoader::new("inline.csv");
        let records = loader.parse("id,keyword,location,text,target
1,,,Flood warning
2,,,Sunny,0
").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text.as_deref(), Some("Flood warning"));
        assert_eq!(records[0].label, None);
        assert_eq!(records[1].label.as_deref(), Some("0"));
    }

    #[test]
    fn test_long_row_is_fatal() {
        let loader = CsvLoader::new("inline.csv");
        let err    = loader.parse("text,target
hello,1,extra
").unwrap_err();
        assert!(matches!(err, DatasetError::TooManyFields { row: 1, expected: 2, found: 3 }));
    }

    #[test]
    fn test_accepts_labels_column() {
        let loader  = CsvLoader::new("inline.csv");
        let records = loader.parse("text,labels\nhello,0\n").unwrap();
        assert_eq!(records[0].label.as_deref(), Some("0"));
        assert_eq!(records[0].id, None);
    }

    #[test]
    fn test_missing_text_column_is_fatal() {
        let loader = CsvLoader::new("inline.csv");
        let err    = loader.parse("id,tweet,target\n1,hi,0\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("text")));
    }

    #[test]
    fn test_missing_label_column_is_fatal() {
        let loader = CsvLoader::new("inline.csv");
        let err    = loader.parse("id,text\n1,hi\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(_)));
    }

    #[test]
    fn test_latin1_decoding_maps_bytes_to_code_points() {
        // 0xE9 is 'é' in ISO-8859-1 and is not valid UTF-8 on its own
        assert_eq!(decode_latin1(b"caf\xe9"), "café");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let loader = CsvLoader::new("/definitely/not/here.csv");
        let err    = loader.load_all().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DatasetError>(),
            Some(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn test_reads_file_from_disk() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        fs::write(&path, b"text,target\nRT \xabflood\xbb warning,1\n").unwrap();

        let records = CsvLoader::new(&path).load_all().unwrap();
        assert_eq!(records[0].text.as_deref(), Some("RT «flood» warning"));
    }
}
