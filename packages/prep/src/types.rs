//! Core data types: labels, records and partition names.

use std::fmt;
use std::ops::AddAssign;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{PrepError, Result};

/// Binary label of one annotated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Claim,
    NonClaim,
}

impl Label {
    /// Canonical string form used in flat records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::NonClaim => "non-claim",
        }
    }

    /// Parse a label string, ignoring case.
    ///
    /// # Examples
    /// ```
    /// use claimpt_prep::types::Label;
    ///
    /// assert_eq!(Label::parse("Claim"), Some(Label::Claim));
    /// assert_eq!(Label::parse("Non-claim"), Some(Label::NonClaim));
    /// assert_eq!(Label::parse("opinion"), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "claim" | "true" => Some(Self::Claim),
            "non-claim" | "non_claim" | "nonclaim" | "non claim" | "false" => Some(Self::NonClaim),
            _ => None,
        }
    }

    fn from_bool(is_claim: bool) -> Self {
        if is_claim {
            Self::Claim
        } else {
            Self::NonClaim
        }
    }

    /// Read the label of a JSON object from its `label` string or `claim` flag.
    ///
    /// Returns `Ok(None)` when neither key is present.
    fn from_object(object: &Map<String, Value>, context: &str) -> Result<Option<Self>> {
        if let Some(value) = object.get("label") {
            return match value {
                Value::String(s) => Self::parse(s).map(Some).ok_or_else(|| {
                    PrepError::InvalidInput(format!("{context} has unrecognized label '{s}'"))
                }),
                Value::Bool(b) => Ok(Some(Self::from_bool(*b))),
                other => Err(PrepError::InvalidInput(format!(
                    "{context} has a non-string label: {other}"
                ))),
            };
        }

        match object.get("claim") {
            Some(Value::Bool(b)) => Ok(Some(Self::from_bool(*b))),
            Some(other) => Err(PrepError::InvalidInput(format!(
                "{context} has a non-boolean 'claim' field: {other}"
            ))),
            None => Ok(None),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim and non-claim tallies of a record, a document or a partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelCounts {
    pub claims: usize,
    pub non_claims: usize,
}

impl LabelCounts {
    #[must_use]
    pub fn new(claims: usize, non_claims: usize) -> Self {
        Self { claims, non_claims }
    }

    /// Counts for a single labeled unit.
    #[must_use]
    pub fn of(label: Label) -> Self {
        match label {
            Label::Claim => Self::new(1, 0),
            Label::NonClaim => Self::new(0, 1),
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.claims + self.non_claims
    }

    /// Share of claims among all labels; 0 when nothing is labeled.
    #[must_use]
    pub fn claim_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.claims as f64 / total as f64,
        }
    }

    /// Non-claim to claim ratio, `None` when there are no claims.
    #[must_use]
    pub fn non_claim_per_claim(&self) -> Option<f64> {
        (self.claims > 0).then(|| self.non_claims as f64 / self.claims as f64)
    }
}

impl AddAssign for LabelCounts {
    fn add_assign(&mut self, other: Self) {
        self.claims += other.claims;
        self.non_claims += other.non_claims;
    }
}

/// Stratum a document is assigned to when splitting with ratio preservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stratum {
    /// Claim ratio above the configured threshold.
    Claim,
    NonClaim,
}

impl fmt::Display for Stratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claim => f.write_str("claim"),
            Self::NonClaim => f.write_str("non-claim"),
        }
    }
}

/// Output subset of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Train,
    Test,
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => f.write_str("train"),
            Self::Test => f.write_str("test"),
        }
    }
}

/// One entry of a dataset.
///
/// The typed header (document identifier and label counts) is what the
/// splitter works on. The JSON object the record was read from is kept as
/// an opaque payload and written back verbatim.
///
/// Two shapes are accepted:
/// - flat: `{"document_id": "...", "label": "claim", ...}`
/// - nested: `{"document": "...", "items": [{"claim": true, ...}], ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    document_id: String,
    counts: LabelCounts,
    payload: Map<String, Value>,
}

impl Record {
    /// Build a record from a parsed JSON value.
    ///
    /// `position` is the zero-based index in the source, used in error messages.
    pub fn from_value(value: Value, position: usize) -> Result<Self> {
        let context = format!("record {position}");
        let Value::Object(payload) = value else {
            return Err(PrepError::InvalidInput(format!(
                "{context} is not a JSON object"
            )));
        };

        let document_id = match payload.get("document_id").or_else(|| payload.get("document")) {
            Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
            Some(Value::String(_)) => {
                return Err(PrepError::InvalidInput(format!(
                    "{context} has an empty document identifier"
                )))
            }
            Some(other) => {
                return Err(PrepError::InvalidInput(format!(
                    "{context} has a non-string document identifier: {other}"
                )))
            }
            None => {
                return Err(PrepError::InvalidInput(format!(
                    "{context} has no document identifier ('document_id' or 'document')"
                )))
            }
        };

        let counts = match payload.get("items") {
            Some(Value::Array(items)) => count_items(items, &context)?,
            Some(other) => {
                return Err(PrepError::InvalidInput(format!(
                    "{context} has a non-array 'items' field: {other}"
                )))
            }
            None => {
                let label = Label::from_object(&payload, &context)?.ok_or_else(|| {
                    PrepError::InvalidInput(format!(
                        "{context} has no label ('label' or 'claim')"
                    ))
                })?;
                LabelCounts::of(label)
            }
        };

        Ok(Self {
            document_id,
            counts,
            payload,
        })
    }

    /// Build a flat record from its parts.
    ///
    /// `extra` fields are kept after `document_id` and `label`.
    pub fn flat(document_id: impl Into<String>, label: Label, extra: Map<String, Value>) -> Self {
        let document_id = document_id.into();
        let mut payload = Map::new();
        payload.insert("document_id".to_string(), Value::String(document_id.clone()));
        payload.insert("label".to_string(), Value::String(label.as_str().to_string()));
        payload.extend(extra);
        Self {
            document_id,
            counts: LabelCounts::of(label),
            payload,
        }
    }

    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    #[must_use]
    pub fn counts(&self) -> LabelCounts {
        self.counts
    }

    /// The JSON object this record was read from.
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

fn count_items(items: &[Value], context: &str) -> Result<LabelCounts> {
    let mut counts = LabelCounts::default();
    for (index, item) in items.iter().enumerate() {
        let item_context = format!("{context} item {index}");
        let Value::Object(object) = item else {
            return Err(PrepError::InvalidInput(format!(
                "{item_context} is not a JSON object"
            )));
        };
        let label = Label::from_object(object, &item_context)?.ok_or_else(|| {
            PrepError::InvalidInput(format!("{item_context} has no label ('claim' or 'label')"))
        })?;
        counts += LabelCounts::of(label);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_record_from_value() {
        let record = Record::from_value(
            json!({"document_id": "news_0001", "label": "claim", "text": "Taxes went up."}),
            0,
        )
        .unwrap();

        assert_eq!(record.document_id(), "news_0001");
        assert_eq!(record.counts(), LabelCounts::new(1, 0));
        assert_eq!(record.payload()["text"], "Taxes went up.");
    }

    #[test]
    fn test_flat_record_with_claim_flag() {
        let record =
            Record::from_value(json!({"document": "news_0002", "claim": false}), 3).unwrap();
        assert_eq!(record.document_id(), "news_0002");
        assert_eq!(record.counts(), LabelCounts::new(0, 1));
    }

    #[test]
    fn test_nested_document_counts_items() {
        let record = Record::from_value(
            json!({
                "document": "news_0003.txt",
                "items": [
                    {"claim": true, "text_segment": "a"},
                    {"claim": false, "text_segment": "b"},
                    {"claim": false, "text_segment": "c"}
                ]
            }),
            0,
        )
        .unwrap();
        assert_eq!(record.counts(), LabelCounts::new(1, 2));
    }

    #[test]
    fn test_record_missing_document_id() {
        let err = Record::from_value(json!({"label": "claim"}), 5).unwrap_err();
        assert!(matches!(err, PrepError::InvalidInput(_)));
        assert!(err.to_string().contains("record 5"));
    }

    #[test]
    fn test_record_empty_document_id() {
        let err = Record::from_value(json!({"document_id": "  ", "label": "claim"}), 0)
            .unwrap_err();
        assert!(err.to_string().contains("empty document identifier"));
    }

    #[test]
    fn test_record_missing_label() {
        let err = Record::from_value(json!({"document_id": "d1"}), 1).unwrap_err();
        assert!(err.to_string().contains("no label"));
    }

    #[test]
    fn test_record_unrecognized_label() {
        let err =
            Record::from_value(json!({"document_id": "d1", "label": "opinion"}), 0).unwrap_err();
        assert!(err.to_string().contains("opinion"));
    }

    #[test]
    fn test_nested_item_missing_label() {
        let err = Record::from_value(
            json!({"document": "d1", "items": [{"claim": true}, {"text_segment": "x"}]}),
            0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }

    #[test]
    fn test_record_serializes_payload_verbatim() {
        let value = json!({"label": "Claim", "document_id": "d1", "extra": {"k": [1, 2]}});
        let record = Record::from_value(value.clone(), 0).unwrap();
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_flat_constructor_orders_header_first() {
        let mut extra = Map::new();
        extra.insert("text".to_string(), json!("hello"));
        let record = Record::flat("d9", Label::NonClaim, extra);
        let keys: Vec<&String> = record.payload().keys().collect();
        assert_eq!(keys, ["document_id", "label", "text"]);
        assert_eq!(record.counts(), LabelCounts::new(0, 1));
    }

    #[test]
    fn test_label_counts_ratios() {
        let counts = LabelCounts::new(2, 6);
        assert_eq!(counts.total(), 8);
        assert_eq!(counts.claim_ratio(), 0.25);
        assert_eq!(counts.non_claim_per_claim(), Some(3.0));
        assert_eq!(LabelCounts::default().claim_ratio(), 0.0);
        assert_eq!(LabelCounts::new(0, 4).non_claim_per_claim(), None);
    }
}
