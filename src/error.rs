use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed record '{id}': {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("Unresolved ancestry: parent '{parent}' of '{id}' is not in the pedigree")]
    UnresolvedAncestry { id: String, parent: String },

    #[error("Cyclic ancestry: '{id}' is its own ancestor")]
    CyclicAncestry { id: String },

    #[error("No result for '{id}'")]
    MissingResult { id: String },

    #[error("File must be a .{expected} file: {path}")]
    FileType { path: String, expected: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
