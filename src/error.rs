use thiserror::Error;

/// Structural failures. A single bad row never produces one of these; row
/// problems are recorded in the pipeline log instead.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization failed: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("Duplicate planet name in record set: {0}")]
    DuplicateName(String),

    #[error("Pipeline worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Rejected query requests. These are surfaced to the caller as-is and
/// never silently adjusted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' is not numeric")]
    FieldNotNumeric(String),

    #[error("Field '{0}' is not a text field")]
    FieldNotText(String),

    #[error("Invalid range for '{field}': lower bound {lower} exceeds upper bound {upper}")]
    InvalidRange { field: String, lower: f64, upper: f64 },

    #[error("Bound for '{0}' is not a finite number")]
    NonFiniteBound(String),

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("Page size must be a positive integer")]
    InvalidPageSize,

    #[error("Search term must not be empty")]
    EmptySearchTerm,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}
