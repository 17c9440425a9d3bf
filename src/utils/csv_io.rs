use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::HarvestError;

/// Reads a headed UTF-8 CSV file into records; unknown columns are ignored.
pub(crate) fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, HarvestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let mut out = Vec::new();
    for record in reader.deserialize() {
        out.push(record?);
    }
    Ok(out)
}

/// Writes `records` under a fixed header row, replacing any existing file.
///
/// The header is written even when `records` is empty.
pub(crate) fn write_records<T: Serialize>(
    path: &Path,
    headers: &[&str],
    records: &[T],
) -> Result<(), HarvestError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(headers)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Pair {
        left: String,
        right: u32,
    }

    #[test]
    fn write_records_emits_header_for_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("empty.csv");

        write_records::<Pair>(&path, &["left", "right"], &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "left,right\n");
    }

    #[test]
    fn read_records_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        std::fs::write(&path, "extra,left,right\nz,a,1\ny,\"b, c\",2\n").unwrap();

        let rows: Vec<Pair> = read_records(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                Pair {
                    left: "a".into(),
                    right: 1
                },
                Pair {
                    left: "b, c".into(),
                    right: 2
                },
            ]
        );
    }

    #[test]
    fn write_records_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.csv");
        std::fs::write(&path, "stale content that is longer than the new file\n").unwrap();

        let rows = vec![Pair {
            left: "a".into(),
            right: 7,
        }];
        write_records(&path, &["left", "right"], &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "left,right\na,7\n");
    }

    #[test]
    fn read_records_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_records::<Pair>(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, HarvestError::Csv(_)));
    }
}
