//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces that the session expects from infrastructure.
//! They contain no transport details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP or filesystem types in any signature
//! - Wire-shape normalisation lives next to the port it belongs to
//! - Voice facilities (recognition, synthesis, audio) live in `smartie-voice`

pub mod answer;
pub mod location;
pub mod storage;

pub use answer::{Answer, AnswerError, AnswerRequest, AnswerService};
pub use location::{FixedLocation, GeoPosition, LocationError, LocationProvider};
pub use storage::{KeyValueStore, MemoryStore, StorageError, keys};
