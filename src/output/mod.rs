//! Output module
//!
//! Writes generated configuration to stdout or to a file.
//!
//! # Overview
//!
//! - `OutputTarget` - stdout, or a file created or truncated on write
//! - `write_output` - write one run's text to a target

mod writer;

pub use writer::{write_output, OutputTarget};

#[cfg(test)]
mod tests;
