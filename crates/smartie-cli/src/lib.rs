#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

// Used by the binary target.
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod parser;
pub mod presentation;
pub mod repl;

pub use bootstrap::bootstrap;
pub use commands::{ParseError, ReplCommand};
pub use parser::Cli;
