//! astbridge-codegen - Native and managed AST binding generators
//!
//! A bootstrap pass turns a [`DeclGraph`](astbridge_core::DeclGraph) into
//! text artifacts:
//! - [`normalize`] marks declarations ignored, erases storage bases and
//!   cleans up the node-kind discriminant
//! - [`Family::resolve`] collects each family's classes and enums
//! - the generator modules render native declarations, definitions and
//!   walkers, and managed declarations, visitors and converters
//! - [`Bootstrap::run`] chains the steps and returns every [`Artifact`]
//! - [`FileSink`] writes artifacts, skipping files whose content is current
//!
//! # Example
//!
//! ```
//! use astbridge_codegen::{Bootstrap, MemorySink, write_all};
//! use astbridge_core::{BootstrapConfig, DeclGraph};
//!
//! let config = BootstrapConfig::default();
//! let result = Bootstrap::new(&config).run(DeclGraph::new());
//! // An empty graph has none of the configured units.
//! assert!(result.is_err());
//!
//! let mut sink = MemorySink::new();
//! let summary = write_all(&mut sink, &[]).unwrap();
//! assert_eq!(summary.written, 0);
//! ```

pub mod collect;
pub mod converter;
pub mod enums;
pub mod family;
pub mod managed;
pub mod marshal;
pub mod native_decls;
pub mod native_defs;
pub mod native_parser;
pub mod normalize;
pub mod pipeline;
pub mod sink;
pub mod visitor;
mod writer;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod test_support;

pub use collect::SubclassSet;
pub use family::{Family, GenContext};
pub use marshal::{MarshalRule, Marshaler};
pub use normalize::{Discriminant, NormalizedGraph, normalize};
pub use pipeline::{Artifact, ArtifactKind, Bootstrap};
pub use sink::{ArtifactSink, FileSink, MemorySink, WriteOutcome, WriteSummary, compute_sha256, write_all};
pub use writer::CodeWriter;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Artifact, ArtifactKind, ArtifactSink, Bootstrap, FileSink, MemorySink, NormalizedGraph,
        WriteOutcome, write_all,
    };
}
