use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkageError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (duplicate dataset, unknown reference, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// A dataset descriptor names a field the source file does not have.
    #[error("dataset '{dataset}': missing field '{field}'")]
    MissingDescriptorField { dataset: String, field: String },
    /// Malformed delimited source.
    #[error("dataset '{dataset}': {message}")]
    Source { dataset: String, message: String },
    /// IO error (file read, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LinkageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
