#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod error;
pub mod services;
pub mod session;

pub use error::SessionError;
pub use services::SessionServices;
pub use session::{IgnoreReason, Session, SubmitOptions, SubmitOutcome};

// Silence unused dev-dependency warnings; integration tests under tests/ use them
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
