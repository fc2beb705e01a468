//! core
//!
//! Core domain types and pure operations for ghat.
//!
//! # Modules
//!
//! - [`source`] - Source string parsing into repository descriptors
//! - [`options`] - Validated merge options
//! - [`dotpath`] - Dot-path deletion and assignment on YAML trees
//! - [`document`] - Loading workflow files as YAML documents
//! - [`provenance`] - Encoding and decoding provenance comments
//! - [`config`] - Configuration schema and loading
//! - [`errors`] - Error taxonomy
//!
//! # Design Principles
//!
//! - Options and descriptors are validated at construction and immutable after
//! - Nothing here touches the network
//! - Missing files are an empty state, not a failure

pub mod config;
pub mod document;
pub mod dotpath;
pub mod errors;
pub mod options;
pub mod provenance;
pub mod source;
