//! Document-level train/test splitting.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::groups::{group_records, DocumentGroup};
use super::summary::SplitSummary;
use crate::config::SplitConfig;
use crate::error::{PrepError, Result};
use crate::types::{Partition, Record, Stratum};

/// Which partition each document identifier belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitAssignment {
    partitions: HashMap<String, Partition>,
}

impl SplitAssignment {
    /// Build an assignment from the two identifier lists, checking that they
    /// are disjoint and together cover every group.
    fn from_ids(groups: &[DocumentGroup], train: &[&str], test: &[&str]) -> Result<Self> {
        let train_set: HashSet<&str> = train.iter().copied().collect();
        let test_set: HashSet<&str> = test.iter().copied().collect();

        let mut overlap: Vec<&str> = train_set.intersection(&test_set).copied().collect();
        if !overlap.is_empty() {
            overlap.sort_unstable();
            return Err(PrepError::Leakage(format!(
                "documents in both partitions: {}",
                overlap.join(", ")
            )));
        }

        let missing: Vec<&str> = groups
            .iter()
            .map(|g| g.document_id.as_str())
            .filter(|id| !train_set.contains(id) && !test_set.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(PrepError::Leakage(format!(
                "documents in neither partition: {}",
                missing.join(", ")
            )));
        }

        let known: HashSet<&str> = groups.iter().map(|g| g.document_id.as_str()).collect();
        if let Some(unknown) = train_set.union(&test_set).find(|id| !known.contains(*id)) {
            return Err(PrepError::Leakage(format!(
                "unknown document assigned: {unknown}"
            )));
        }

        let partitions = train
            .iter()
            .map(|id| (id.to_string(), Partition::Train))
            .chain(test.iter().map(|id| (id.to_string(), Partition::Test)))
            .collect();
        Ok(Self { partitions })
    }

    #[must_use]
    pub fn partition_of(&self, document_id: &str) -> Option<Partition> {
        self.partitions.get(document_id).copied()
    }

    /// Identifiers assigned to `partition`, sorted.
    #[must_use]
    pub fn document_ids(&self, partition: Partition) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .partitions
            .iter()
            .filter(|(_, p)| **p == partition)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Result of splitting a dataset.
#[derive(Debug)]
pub struct SplitOutcome {
    /// Train records, in source order.
    pub train: Vec<Record>,

    /// Test records, in source order.
    pub test: Vec<Record>,

    pub assignment: SplitAssignment,
    pub summary: SplitSummary,

    /// Set when a stratified split was requested but had to fall back.
    pub fallback: Option<PrepError>,
}

/// Split a dataset with a generator seeded from `config.seed`.
///
/// The generator is ChaCha8, so a seed gives the same split on every
/// platform.
pub fn split_with_seed(records: Vec<Record>, config: &SplitConfig) -> Result<SplitOutcome> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    split_dataset(records, config, &mut rng)
}

/// Split a dataset into train and test partitions at document granularity.
///
/// Documents are shuffled with `rng` and cut at `config.train_ratio`. With
/// `config.keep_ratio` the claim-bearing and non-claim documents are
/// shuffled and cut separately, each stratum contributing at least one
/// document to both sides. A stratum with fewer than two documents makes
/// stratification impossible: this is logged, recorded in
/// [`SplitOutcome::fallback`], and the split proceeds unstratified.
///
/// Records are moved into the partition of their document, keeping their
/// original relative order.
///
/// # Errors
/// `InvalidInput` for an empty dataset or bad parameters.
pub fn split_dataset<R: Rng + ?Sized>(
    records: Vec<Record>,
    config: &SplitConfig,
    rng: &mut R,
) -> Result<SplitOutcome> {
    config.validate()?;
    if records.is_empty() {
        return Err(PrepError::InvalidInput("dataset is empty".to_string()));
    }

    let groups = group_records(&records);

    let (train_ids, test_ids, fallback) = if config.keep_ratio {
        match stratify(&groups, config.claim_threshold) {
            Ok(strata) => {
                let (train, test) = split_strata(strata, config.train_ratio, rng);
                (train, test, None)
            }
            Err(e) => {
                tracing::warn!("{e}; falling back to an unstratified split");
                let (train, test) = split_simple(&groups, config.train_ratio, rng);
                (train, test, Some(e))
            }
        }
    } else {
        let (train, test) = split_simple(&groups, config.train_ratio, rng);
        (train, test, None)
    };

    let assignment = SplitAssignment::from_ids(&groups, &train_ids, &test_ids)?;
    let stratified = config.keep_ratio && fallback.is_none();
    let summary = SplitSummary::new(&groups, &assignment, config.claim_threshold, stratified);

    let (train, test): (Vec<Record>, Vec<Record>) = records
        .into_iter()
        .partition(|r| assignment.partition_of(r.document_id()) == Some(Partition::Train));

    tracing::info!(
        "Split {} documents into {} train / {} test ({} / {} records)",
        groups.len(),
        summary.train.documents,
        summary.test.documents,
        train.len(),
        test.len(),
    );

    Ok(SplitOutcome {
        train,
        test,
        assignment,
        summary,
        fallback,
    })
}

/// Number of shuffled documents that go to train.
///
/// With `both_sides` and at least two documents, the cut is clamped so
/// neither side is empty.
fn cut_point(documents: usize, train_ratio: f64, both_sides: bool) -> usize {
    let cut = ((documents as f64) * train_ratio).round() as usize;
    let cut = cut.min(documents);
    if both_sides && documents >= 2 {
        cut.clamp(1, documents - 1)
    } else {
        cut
    }
}

/// Partition document ids into the claim and non-claim strata.
fn stratify(groups: &[DocumentGroup], threshold: f64) -> Result<[Vec<&str>; 2]> {
    let (claim, non_claim): (Vec<&DocumentGroup>, Vec<&DocumentGroup>) = groups
        .iter()
        .partition(|g| g.stratum(threshold) == Stratum::Claim);

    for (stratum, members) in [(Stratum::Claim, &claim), (Stratum::NonClaim, &non_claim)] {
        if members.len() < 2 {
            return Err(PrepError::DegenerateStratum {
                stratum,
                documents: members.len(),
            });
        }
    }

    Ok([claim, non_claim]
        .map(|members| members.into_iter().map(|g| g.document_id.as_str()).collect()))
}

fn split_strata<'a, R: Rng + ?Sized>(
    strata: [Vec<&'a str>; 2],
    train_ratio: f64,
    rng: &mut R,
) -> (Vec<&'a str>, Vec<&'a str>) {
    let mut train = Vec::new();
    let mut test = Vec::new();

    for mut ids in strata {
        ids.shuffle(rng);
        let cut = cut_point(ids.len(), train_ratio, true);
        test.extend(ids.split_off(cut));
        train.extend(ids);
    }

    (train, test)
}

fn split_simple<'a, R: Rng + ?Sized>(
    groups: &'a [DocumentGroup],
    train_ratio: f64,
    rng: &mut R,
) -> (Vec<&'a str>, Vec<&'a str>) {
    let mut ids: Vec<&str> = groups.iter().map(|g| g.document_id.as_str()).collect();
    ids.shuffle(rng);
    let cut = cut_point(ids.len(), train_ratio, false);
    let test = ids.split_off(cut);
    (ids, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Label;
    use serde_json::Map;

    fn record(doc: &str, label: Label) -> Record {
        Record::flat(doc, label, Map::new())
    }

    /// `claim_docs` documents with one claim and one non-claim record each,
    /// followed by `plain_docs` documents with two non-claim records.
    fn corpus(claim_docs: usize, plain_docs: usize) -> Vec<Record> {
        let mut records = Vec::new();
        for i in 0..claim_docs {
            let id = format!("claim_{i:03}");
            records.push(record(&id, Label::Claim));
            records.push(record(&id, Label::NonClaim));
        }
        for i in 0..plain_docs {
            let id = format!("plain_{i:03}");
            records.push(record(&id, Label::NonClaim));
            records.push(record(&id, Label::NonClaim));
        }
        records
    }

    #[test]
    fn test_cut_point() {
        assert_eq!(cut_point(10, 0.8, false), 8);
        assert_eq!(cut_point(6, 0.8, false), 5);
        assert_eq!(cut_point(4, 0.8, false), 3);
        assert_eq!(cut_point(1, 0.8, false), 1);
        assert_eq!(cut_point(1, 0.4, false), 0);
        assert_eq!(cut_point(0, 0.8, false), 0);
        assert_eq!(cut_point(2, 0.9, true), 1);
        assert_eq!(cut_point(3, 0.1, true), 1);
    }

    #[test]
    fn test_split_rejects_empty_dataset() {
        let err = split_with_seed(Vec::new(), &SplitConfig::default()).unwrap_err();
        assert!(matches!(err, PrepError::InvalidInput(_)));
    }

    #[test]
    fn test_split_rejects_bad_ratio() {
        let config = SplitConfig::default().with_train_ratio(0.0);
        let err = split_with_seed(corpus(2, 2), &config).unwrap_err();
        assert!(matches!(err, PrepError::InvalidInput(_)));
    }

    #[test]
    fn test_stratified_scenario_counts() {
        let config = SplitConfig::default().with_keep_ratio(true).with_seed(42);
        let outcome = split_with_seed(corpus(6, 4), &config).unwrap();

        assert!(outcome.fallback.is_none());
        assert!(outcome.summary.stratified);
        assert_eq!(outcome.summary.train.claim_documents, 5);
        assert_eq!(outcome.summary.train.documents, 8);
        assert_eq!(outcome.summary.test.claim_documents, 1);
        assert_eq!(outcome.summary.test.documents, 2);
    }

    #[test]
    fn test_degenerate_stratum_falls_back() {
        let config = SplitConfig::default().with_keep_ratio(true);
        let outcome = split_with_seed(corpus(5, 1), &config).unwrap();

        assert!(matches!(
            outcome.fallback,
            Some(PrepError::DegenerateStratum {
                stratum: Stratum::NonClaim,
                documents: 1
            })
        ));
        assert!(!outcome.summary.stratified);
        assert_eq!(outcome.assignment.len(), 6);
        assert_eq!(outcome.summary.train.documents, 5);
    }

    #[test]
    fn test_missing_stratum_falls_back() {
        let config = SplitConfig::default().with_keep_ratio(true);
        let outcome = split_with_seed(corpus(0, 4), &config).unwrap();
        assert!(matches!(
            outcome.fallback,
            Some(PrepError::DegenerateStratum {
                stratum: Stratum::Claim,
                documents: 0
            })
        ));
    }

    #[test]
    fn test_single_document_does_not_crash() {
        let records = vec![record("only", Label::Claim), record("only", Label::NonClaim)];

        let outcome = split_with_seed(records.clone(), &SplitConfig::default()).unwrap();
        assert_eq!(outcome.train.len(), 2);
        assert!(outcome.test.is_empty());

        let config = SplitConfig::default().with_train_ratio(0.4);
        let outcome = split_with_seed(records, &config).unwrap();
        assert!(outcome.train.is_empty());
        assert_eq!(outcome.test.len(), 2);
    }

    #[test]
    fn test_records_keep_source_order() {
        let records = corpus(4, 4);
        let order: Vec<String> = records.iter().map(|r| r.document_id().to_string()).collect();

        let outcome = split_with_seed(records, &SplitConfig::default()).unwrap();
        for part in [&outcome.train, &outcome.test] {
            let positions: Vec<usize> = part
                .iter()
                .map(|r| order.iter().position(|id| id == r.document_id()).unwrap_or(0))
                .collect();
            assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_explicit_rng_matches_seeded_helper() {
        let config = SplitConfig::default().with_seed(9);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let a = split_dataset(corpus(5, 5), &config, &mut rng).unwrap();
        let b = split_with_seed(corpus(5, 5), &config).unwrap();
        assert_eq!(a.assignment, b.assignment);
    }

    #[test]
    fn test_different_seeds_can_differ() {
        let base = SplitConfig::default();
        let assignments: HashSet<Vec<String>> = (0..10)
            .map(|seed| {
                let outcome = split_with_seed(corpus(10, 10), &base.clone().with_seed(seed))
                    .unwrap();
                outcome
                    .assignment
                    .document_ids(Partition::Test)
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .collect();
        assert!(assignments.len() > 1);
    }

    #[test]
    fn test_assignment_rejects_overlap() {
        let groups = group_records(&corpus(2, 0));
        let err = SplitAssignment::from_ids(&groups, &["claim_000", "claim_001"], &["claim_001"])
            .unwrap_err();
        assert!(matches!(err, PrepError::Leakage(_)));
    }

    #[test]
    fn test_assignment_rejects_missing_document() {
        let groups = group_records(&corpus(2, 0));
        let err = SplitAssignment::from_ids(&groups, &["claim_000"], &[]).unwrap_err();
        assert!(err.to_string().contains("claim_001"));
    }
}
