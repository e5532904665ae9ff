use thiserror::Error;
use uuid::Uuid;

/// Failure at the extraction boundary. Never escapes a turn: the
/// coordinator reports it as `TurnStatus::ExtractionFailed` and leaves the
/// session state untouched.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extractor failed: {0}")]
    Failed(String),

    #[error("Extraction timed out after {0}s")]
    Timeout(u64),

    #[error("Unparseable extractor output: {0}")]
    Unparseable(String),

    #[error("Invalid payload envelope: {0}")]
    InvalidEnvelope(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unknown session: {0}")]
    UnknownSession(Uuid),

    #[error("Session lock poisoned")]
    LockPoisoned,
}
