//! Train/test splitting at document granularity.
//!
//! Records are grouped by document identifier and whole documents are
//! assigned to one partition, so no document leaks across the split.

mod groups;
mod splitter;
mod summary;

pub use groups::{group_records, DocumentGroup};
pub use splitter::{split_dataset, split_with_seed, SplitAssignment, SplitOutcome};
pub use summary::{PartitionStats, SplitSummary};
