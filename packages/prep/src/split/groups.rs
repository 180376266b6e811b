//! Grouping records by document.

use std::collections::HashMap;

use crate::types::{LabelCounts, Record, Stratum};

/// All records sharing one document identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentGroup {
    pub document_id: String,

    /// Number of dataset records in this document.
    pub records: usize,

    /// Labels summed over the document's records.
    pub counts: LabelCounts,
}

impl DocumentGroup {
    /// Classify the document for stratification.
    ///
    /// A document is claim-bearing when its claim ratio exceeds `threshold`.
    ///
    /// # Examples
    /// ```
    /// use claimpt_prep::split::DocumentGroup;
    /// use claimpt_prep::types::{LabelCounts, Stratum};
    ///
    /// let group = DocumentGroup {
    ///     document_id: "news_0001".to_string(),
    ///     records: 4,
    ///     counts: LabelCounts::new(1, 3),
    /// };
    /// assert_eq!(group.stratum(0.0), Stratum::Claim);
    /// assert_eq!(group.stratum(0.5), Stratum::NonClaim);
    /// ```
    #[must_use]
    pub fn stratum(&self, threshold: f64) -> Stratum {
        if self.counts.claim_ratio() > threshold {
            Stratum::Claim
        } else {
            Stratum::NonClaim
        }
    }
}

/// Group records by document identifier, in order of first appearance.
pub fn group_records(records: &[Record]) -> Vec<DocumentGroup> {
    let mut groups: Vec<DocumentGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let position = *index.entry(record.document_id()).or_insert_with(|| {
            groups.push(DocumentGroup {
                document_id: record.document_id().to_string(),
                records: 0,
                counts: LabelCounts::default(),
            });
            groups.len() - 1
        });

        let group = &mut groups[position];
        group.records += 1;
        group.counts += record.counts();
    }

    tracing::debug!(
        "Grouped {} records into {} documents",
        records.len(),
        groups.len()
    );
    groups
}
