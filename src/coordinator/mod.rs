//! Turn coordination: route the utterance, extract a candidate for the
//! routed domain, merge it into a copy of the session state, recompute
//! derived fields and publish the new state in one swap.
//!
//! Extraction failures never reach the caller as errors. They surface as
//! `TurnStatus::ExtractionFailed` with the session state unchanged.

pub mod error;
pub mod extractor;
pub mod runner;
pub mod session;

pub use error::{ExtractionError, SessionError};
pub use extractor::{
    extract_json_block, normalize, CandidateExtractor, ExtractionContext, RawCandidate,
};
pub use runner::{Coordinator, TurnOutcome, TurnStatus};
pub use session::SessionRegistry;
