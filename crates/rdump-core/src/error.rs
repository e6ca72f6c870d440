use thiserror::Error;

pub type Result<T> = std::result::Result<T, RdumpError>;

#[derive(Debug, Error)]
pub enum RdumpError {
    #[error("dump command failed: {0}")]
    Dump(String),

    #[error("storage I/O error: {0}")]
    Storage(#[source] Box<opendal::Error>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<opendal::Error> for RdumpError {
    fn from(value: opendal::Error) -> Self {
        RdumpError::Storage(Box::new(value))
    }
}
