use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpoReadinessError {
    #[error("No financial statement file was uploaded")]
    NoInput,

    #[error("Could not parse '{filename}' as a spreadsheet: {details}")]
    ParseError { filename: String, details: String },

    #[error("Upload '{filename}' is {size} bytes, larger than the {limit} byte limit")]
    UploadTooLarge {
        filename: String,
        size: usize,
        limit: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid cell reference: {0}")]
    InvalidCellReference(String),

    #[error("Assessment store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IpoReadinessError>;
