//! Per-partition statistics of a split.

use super::groups::DocumentGroup;
use super::splitter::SplitAssignment;
use crate::types::{LabelCounts, Partition, Stratum};

/// Document and label tallies for the corpus or one partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    pub documents: usize,
    pub records: usize,
    pub counts: LabelCounts,

    /// Documents classified as claim-bearing.
    pub claim_documents: usize,
}

impl PartitionStats {
    fn add(&mut self, group: &DocumentGroup, stratum: Stratum) {
        self.documents += 1;
        self.records += group.records;
        self.counts += group.counts;
        if stratum == Stratum::Claim {
            self.claim_documents += 1;
        }
    }

    /// Share of claim-bearing documents; 0 for an empty partition.
    #[must_use]
    pub fn claim_document_ratio(&self) -> f64 {
        match self.documents {
            0 => 0.0,
            n => self.claim_documents as f64 / n as f64,
        }
    }
}

/// Statistics of a finished split, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSummary {
    pub corpus: PartitionStats,
    pub train: PartitionStats,
    pub test: PartitionStats,

    /// Whether the split was stratified (false after a fallback).
    pub stratified: bool,
}

impl SplitSummary {
    pub(crate) fn new(
        groups: &[DocumentGroup],
        assignment: &SplitAssignment,
        claim_threshold: f64,
        stratified: bool,
    ) -> Self {
        let mut summary = Self {
            corpus: PartitionStats::default(),
            train: PartitionStats::default(),
            test: PartitionStats::default(),
            stratified,
        };

        for group in groups {
            let stratum = group.stratum(claim_threshold);
            summary.corpus.add(group, stratum);
            match assignment.partition_of(&group.document_id) {
                Some(Partition::Train) => summary.train.add(group, stratum),
                Some(Partition::Test) => summary.test.add(group, stratum),
                None => {}
            }
        }

        summary
    }

    #[must_use]
    pub fn partition(&self, partition: Partition) -> &PartitionStats {
        match partition {
            Partition::Train => &self.train,
            Partition::Test => &self.test,
        }
    }
}
