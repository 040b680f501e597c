use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("no valid alignment found between consensus and reference")]
    NoValidAlignmentSpan,
    #[error("inconsistent input: {0}")]
    InconsistentInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DecomposeError> for std::io::Error {
    fn from(why: DecomposeError) -> Self {
        match why {
            DecomposeError::Io(e) => e,
            other @ DecomposeError::InvalidConfig(_) => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, other)
            }
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
