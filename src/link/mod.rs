//! Cross-resource linking
//!
//! Rewrites literal foreign keys into references to other resources of the
//! account. Linking is enabled per target resource type, and the instances
//! of a linked type are fetched whether or not that type is generated. A key
//! whose target instance was not fetched falls back to the policy of its
//! field and never produces a dangling reference.

mod linker;
mod types;

pub use linker::ReferenceLinker;
pub use types::{FieldPath, LinkOutcome, LinkRule, LinkSet, MissingPolicy, SiblingCache};

#[cfg(test)]
mod tests;
