//! CSV test lists

use std::path::Path;

use super::ResolveError;
use crate::models::TestId;

/// Read the non-empty values of `column`, in file order
pub fn read_csv(path: &Path, column: &str) -> Result<Vec<TestId>, ResolveError> {
    let csv_err = |source| ResolveError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let Some(index) = headers.iter().position(|h| h == column) else {
        return Err(ResolveError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
            found: headers.iter().map(str::to_string).collect(),
        });
    };

    let mut tests = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        match record.get(index).map(str::trim) {
            Some(name) if name.contains(['\n', '\r']) => {
                return Err(ResolveError::MultilineName {
                    path: path.to_path_buf(),
                    name: name.to_string(),
                });
            }
            Some(name) if !name.is_empty() => tests.push(TestId::new(name)),
            _ => {}
        }
    }

    if tests.is_empty() {
        return Err(ResolveError::EmptyCsv(path.to_path_buf()));
    }
    Ok(tests)
}
