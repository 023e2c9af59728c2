use std::fmt;

#[derive(Debug)]
pub enum IngestError {
    /// Required environment value absent. Fatal before any network call.
    Config(String),
    /// Upstream API unreachable, empty payload, or out-of-range value.
    Fetch(String),
    /// Storage write rejected. `stored` counts the upserts that succeeded
    /// before the failure; those writes are not rolled back.
    Persist { stored: usize, message: String },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IngestError::Config(msg) => write!(f, "Configuration error: {}", msg),
            IngestError::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            IngestError::Persist { stored, message } => {
                write!(f, "Persistence error after {} write(s): {}", stored, message)
            }
        }
    }
}

impl std::error::Error for IngestError {}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::Fetch(err.to_string())
    }
}
