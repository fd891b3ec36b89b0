//! Keyscope: schema-free key discovery for flat tabular datasets.
//!
//! Keyscope answers two questions about a delimited-text table without any
//! prior schema knowledge: which columns vary within a group of related rows,
//! and what minimal set of columns uniquely identifies each row.
//!
//! # Core Principles
//!
//! - **Schema-free**: Everything is derived from the data itself
//! - **Non-destructive**: Datasets are immutable views; analysis never
//!   modifies rows
//! - **Traceable**: Every validation step of the key search is recorded
//!
//! # Example
//!
//! ```no_run
//! use keyscope::{Keyscope, KeyscopeConfig};
//!
//! let engine = Keyscope::with_config(KeyscopeConfig {
//!     search_key: Some("OrderID".to_string()),
//!     base_key: vec!["OrderID".to_string()],
//!     ..KeyscopeConfig::default()
//! });
//! let report = engine.discover_file("orders.csv").unwrap();
//!
//! if let Some(minimal) = &report.minimal_key {
//!     println!("Minimal key: {:?}", minimal.minimal_key);
//! }
//! ```

pub mod classify;
pub mod dataset;
pub mod error;
pub mod hashing;
pub mod input;
pub mod keys;
pub mod report;
pub mod scope;

mod keyscope;

pub use crate::keyscope::{
    ClassificationReport, DiscoveryReport, Keyscope, KeyscopeConfig, ScopeSummary,
};
pub use classify::{classify, ColumnClassification, ColumnProfile};
pub use dataset::{Dataset, Value};
pub use error::{KeyscopeError, Result};
pub use hashing::{HashAnalysis, RowHash};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use keys::{find_minimal_key, validate, KeyValidationResult, MinimalKeyResult};
pub use scope::DuplicateGroup;
