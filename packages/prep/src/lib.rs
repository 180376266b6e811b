//! ClaimPT dataset preparation.
//!
//! This crate turns annotation tool exports into a claim / non-claim labeled
//! dataset and partitions it into train and test sets without letting a
//! document leak across the split.
//!
//! # Example
//!
//! ```
//! use claimpt_prep::config::SplitConfig;
//! use claimpt_prep::split::split_with_seed;
//! use claimpt_prep::types::{Label, Record};
//! use serde_json::Map;
//!
//! let records = vec![
//!     Record::flat("news_0001", Label::Claim, Map::new()),
//!     Record::flat("news_0001", Label::NonClaim, Map::new()),
//!     Record::flat("news_0002", Label::NonClaim, Map::new()),
//! ];
//!
//! let outcome = split_with_seed(records, &SplitConfig::default().with_seed(7)).unwrap();
//! assert_eq!(outcome.train.len() + outcome.test.len(), 3);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Defaults, environment overrides and parameter validation
//! - [`types`]: Labels, records and partition names
//! - [`error`]: Error types and Result alias
//! - [`bundle`]: Collecting per-document exports into one directory
//! - [`cas`]: CAS JSON to claim dataset conversion
//! - [`dataset`]: Dataset reading and all-or-nothing writing
//! - [`split`]: Document-level train/test splitting
//! - [`cli`]: Command-line interface

pub mod bundle;
pub mod cas;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod split;
pub mod types;

// Re-export main functions
pub use split::{split_dataset, split_with_seed};

// Re-export commonly used items
pub use config::SplitConfig;
pub use error::{PrepError, Result};
pub use types::{Label, LabelCounts, Partition, Record, Stratum};
