use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

use crate::models::{Dataset, TermRecord};

/// Every column the loader insists on. The header is checked up front so a
/// renamed or dropped column fails the whole load instead of surfacing as a
/// confusing per-row deserialize error.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "Year",
    "Term",
    "Applications",
    "Admitted",
    "Enrolled",
    "Retention Rate (%)",
    "Student Satisfaction (%)",
    "Engineering Enrolled",
    "Business Enrolled",
    "Arts Enrolled",
    "Science Enrolled",
];

/// Fatal load-time failures. Any of these aborts startup; there is nothing
/// to retry.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),
    #[error("malformed dataset row: {0}")]
    Malformed(#[from] csv::Error),
}

/// Read the dataset from a delimited file. Type coercion only; no value is
/// transformed or filtered here.
pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }

    let records = reader
        .deserialize::<TermRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(Dataset::new(records))
}

static DATASET: OnceLock<Dataset> = OnceLock::new();

/// Process-wide read-only dataset, loaded on first access and reused for the
/// rest of the session. There is no mutation API; later calls ignore `path`.
pub fn shared(path: &Path) -> Result<&'static Dataset, LoadError> {
    if let Some(dataset) = DATASET.get() {
        return Ok(dataset);
    }
    let dataset = load(path)?;
    Ok(DATASET.get_or_init(|| dataset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL_HEADER: &str = "Year,Term,Applications,Admitted,Enrolled,\
Retention Rate (%),Student Satisfaction (%),Engineering Enrolled,\
Business Enrolled,Arts Enrolled,Science Enrolled";

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_well_formed_file() {
        let csv = format!("{FULL_HEADER}\n2015,Spring,1000,600,500,80.0,78.0,150,120,100,130\n");
        let path = write_temp("campus_metrics_load_ok.csv", &csv);
        let dataset = load(&path).unwrap();
        assert_eq!(dataset.len(), 1);
        let record = &dataset.records()[0];
        assert_eq!(record.year, 2015);
        assert_eq!(record.term, crate::models::Term::Spring);
        assert_eq!(record.applications, 1000);
        assert_eq!(record.retention_rate, 80.0);
        assert_eq!(record.science_enrolled, 130);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let csv = "Year,Term,Applications\n2015,Spring,1000\n";
        let path = write_temp("campus_metrics_load_missing.csv", csv);
        let err = load(&path).unwrap_err();
        match err {
            LoadError::MissingColumn(name) => assert_eq!(name, "Admitted"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_value_is_malformed() {
        let csv = format!("{FULL_HEADER}\n2015,Spring,not-a-number,600,500,80.0,78.0,1,2,3,4\n");
        let path = write_temp("campus_metrics_load_bad_value.csv", &csv);
        let err = load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn empty_body_yields_empty_dataset() {
        let csv = format!("{FULL_HEADER}\n");
        let path = write_temp("campus_metrics_load_empty.csv", &csv);
        let dataset = load(&path).unwrap();
        assert!(dataset.is_empty());
    }
}
