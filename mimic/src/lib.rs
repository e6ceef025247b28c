//! Operator-facing glue of the demonstration recorder.
//!
//! This crate provides the binaries `mimic-record`, `mimic-merge` and `mimic-inspect` and
//! the pieces they share: [`SessionConfig`], the raw-mode terminal key source
//! [`TerminalKeys`] and the buffer tools in [`tools`].
mod config;
mod session;
mod terminal;
pub mod tools;
pub use config::SessionConfig;
pub use session::{build_buffer, record};
pub use terminal::TerminalKeys;
