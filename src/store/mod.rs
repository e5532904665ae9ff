//! Domain record store: typed candidates, append-with-dedup merge and the
//! per-domain schema shown to the extractor.

pub mod candidate;
pub mod merge;
pub mod schema;

pub use candidate::{envelope_key, envelope_keys, CandidateRecord};
pub use merge::{append_unique, merge, MergeReport};
pub use schema::{CollectionSpec, DomainSchema};
