use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read dataset {path}: {source}")]
    DatasetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset has no header row")]
    EmptyDataset,

    #[error("dataset is missing the `{column}` column")]
    MissingColumn { column: String },

    #[error("dataset line {line} has {got} fields, expected at least {expected}")]
    ShortRow {
        line: usize,
        expected: usize,
        got: usize,
    },

    #[error("dataset line {line}: `{value}` is not a number")]
    InvalidValue { line: usize, value: String },

    #[error("bad hex color: {color}")]
    InvalidHexColor { color: String },
}
