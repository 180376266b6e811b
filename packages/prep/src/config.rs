//! Configuration constants and validation functions.

use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};

/// Seed used when none is given on the command line or in the environment.
pub const DEFAULT_SEED: u64 = 42;

/// Fraction of documents that goes to the train partition.
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// Claim ratio a document must exceed to count as claim-bearing.
///
/// With 0.0 a single claim label is enough.
pub const DEFAULT_CLAIM_THRESHOLD: f64 = 0.0;

/// Name of the directory that bundled CAS exports are copied into.
pub const DEFAULT_BUNDLE_DIR: &str = "jsons";

/// Default pretty JSON output of the convert command.
pub const DEFAULT_DATASET_JSON: &str = "claimpt_dataset.pretty.json";

/// Default JSONL output of the convert command.
pub const DEFAULT_DATASET_JSONL: &str = "claimpt_dataset.jsonl";

/// Environment variable overriding [`DEFAULT_SEED`].
pub const ENV_SEED: &str = "CLAIMPT_SEED";

/// Environment variable overriding [`DEFAULT_TRAIN_RATIO`].
pub const ENV_TRAIN_RATIO: &str = "CLAIMPT_TRAIN_RATIO";

/// Environment variable overriding [`DEFAULT_CLAIM_THRESHOLD`].
pub const ENV_CLAIM_THRESHOLD: &str = "CLAIMPT_CLAIM_THRESHOLD";

/// Environment variable enabling ratio-preserving splits.
pub const ENV_KEEP_RATIO: &str = "CLAIMPT_KEEP_RATIO";

/// Validate that a train ratio lies strictly between 0 and 1.
///
/// # Examples
/// ```
/// use claimpt_prep::config::validate_train_ratio;
///
/// assert!(validate_train_ratio(0.8).is_ok());
/// assert!(validate_train_ratio(1.0).is_err());
/// assert!(validate_train_ratio(f64::NAN).is_err());
/// ```
pub fn validate_train_ratio(ratio: f64) -> Result<()> {
    if ratio > 0.0 && ratio < 1.0 {
        Ok(())
    } else {
        Err(PrepError::InvalidInput(format!(
            "train ratio must be in (0, 1), got {ratio}"
        )))
    }
}

/// Validate that a claim threshold lies in [0, 1).
///
/// A threshold of 1 or more would make every document non-claim.
pub fn validate_claim_threshold(threshold: f64) -> Result<()> {
    if (0.0..1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(PrepError::InvalidInput(format!(
            "claim threshold must be in [0, 1), got {threshold}"
        )))
    }
}

/// Parameters of a train/test split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitConfig {
    pub train_ratio: f64,
    pub keep_ratio: bool,
    pub seed: u64,
    pub claim_threshold: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: DEFAULT_TRAIN_RATIO,
            keep_ratio: false,
            seed: DEFAULT_SEED,
            claim_threshold: DEFAULT_CLAIM_THRESHOLD,
        }
    }
}

impl SplitConfig {
    /// Defaults overlaid with any `CLAIMPT_*` environment variables.
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let train_ratio = std::env::var(ENV_TRAIN_RATIO)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.train_ratio);

        let seed = std::env::var(ENV_SEED)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.seed);

        let claim_threshold = std::env::var(ENV_CLAIM_THRESHOLD)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.claim_threshold);

        let keep_ratio = std::env::var(ENV_KEEP_RATIO)
            .ok()
            .map(|v| v != "false" && v != "0")
            .unwrap_or(defaults.keep_ratio);

        Self {
            train_ratio,
            keep_ratio,
            seed,
            claim_threshold,
        }
    }

    #[must_use]
    pub fn with_train_ratio(mut self, train_ratio: f64) -> Self {
        self.train_ratio = train_ratio;
        self
    }

    #[must_use]
    pub fn with_keep_ratio(mut self, keep_ratio: bool) -> Self {
        self.keep_ratio = keep_ratio;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_claim_threshold(mut self, claim_threshold: f64) -> Self {
        self.claim_threshold = claim_threshold;
        self
    }

    /// Check all parameters, failing with `InvalidInput` on the first bad one.
    pub fn validate(&self) -> Result<()> {
        validate_train_ratio(self.train_ratio)?;
        validate_claim_threshold(self.claim_threshold)
    }
}

/// Default train/test output paths for a dataset: `<stem>_train.<ext>` and
/// `<stem>_test.<ext>` next to the input file.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use claimpt_prep::config::default_split_paths;
///
/// let (train, test) = default_split_paths(Path::new("data/claimpt.json"), "json");
/// assert_eq!(train, Path::new("data/claimpt_train.json"));
/// assert_eq!(test, Path::new("data/claimpt_test.json"));
/// ```
pub fn default_split_paths(input: &Path, extension: &str) -> (PathBuf, PathBuf) {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");
    let parent = input.parent().unwrap_or(Path::new(""));
    (
        parent.join(format!("{stem}_train.{extension}")),
        parent.join(format!("{stem}_test.{extension}")),
    )
}
