//! Reading review exports.
//!
//! Review exports are CSV files with a header row and one review per line in the
//! [`COMMENTS_COLUMN`] column. Other columns are ignored.
//!
//! ```rust
//! use review_sentiment::reviews::read_comments;
//!
//! # fn main() -> review_sentiment::error::Result<()> {
//! let csv = "Rating,Comments\n5,\"Quiet, cool and fast\"\n1,Died after a week\n";
//! let comments = read_comments(csv.as_bytes())?;
//! assert_eq!(comments, vec!["Quiet, cool and fast", "Died after a week"]);
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// Header of the column holding review text. Matched exactly.
pub const COMMENTS_COLUMN: &str = "Comments";

/// Read every value of the [`COMMENTS_COLUMN`] column, in file order.
///
/// Empty cells are kept as empty reviews.
///
/// # Errors
///
/// [`PipelineError::MissingColumn`] if no header is named `Comments`, and
/// [`PipelineError::Csv`] if the input is not well-formed CSV.
pub fn read_comments<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let column = csv_reader
        .headers()?
        .iter()
        .position(|header| header == COMMENTS_COLUMN)
        .ok_or_else(|| PipelineError::MissingColumn(COMMENTS_COLUMN.to_string()))?;

    let mut comments = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        comments.push(record.get(column).unwrap_or_default().to_string());
    }

    tracing::debug!(count = comments.len(), "read review comments");
    Ok(comments)
}

/// [`read_comments`] on a file.
pub fn read_comments_path(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        PipelineError::Csv(format!("Failed to open '{}': {}", path.display(), e))
    })?;
    read_comments(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_the_comments_column() {
        let csv = "Id,Comments,Rating\n1,Great card,5\n2,\"Loud, hot\",2\n";
        let comments = read_comments(csv.as_bytes()).unwrap();
        assert_eq!(comments, vec!["Great card", "Loud, hot"]);
    }

    #[test]
    fn empty_cells_are_empty_reviews() {
        let csv = "Comments,Rating\n,3\nFine,4\n";
        let comments = read_comments(csv.as_bytes()).unwrap();
        assert_eq!(comments, vec!["", "Fine"]);
    }

    #[test]
    fn header_only_file_yields_no_reviews() {
        let comments = read_comments("Comments\n".as_bytes()).unwrap();
        assert!(comments.is_empty());
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let err = read_comments("Review,Rating\nGood,5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "Comments"));
        assert_eq!(err.to_string(), "missing required column 'Comments'");
    }

    #[test]
    fn header_match_is_exact() {
        let err = read_comments("comments\nGood\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(_)));
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let err = read_comments("Comments,Rating\nGood,5,extra\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }

    #[test]
    fn reads_from_a_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Comments").unwrap();
        writeln!(file, "Runs cool").unwrap();

        let comments = read_comments_path(file.path()).unwrap();
        assert_eq!(comments, vec!["Runs cool"]);
    }

    #[test]
    fn missing_file_is_a_csv_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_comments_path(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::Csv(_)));
    }
}
