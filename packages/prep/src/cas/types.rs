//! CAS JSON input structures and the claim dataset records built from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// UIMA subject-of-analysis structure holding the document text.
pub const SOFA_TYPE: &str = "uima.cas.Sofa";

/// DKPro document metadata structure holding the document title.
pub const DOCUMENT_METADATA_TYPE: &str =
    "de.tudarmstadt.ukp.dkpro.core.api.metadata.type.DocumentMetaData";

/// Project-specific annotation span layer.
pub const SPAN_TYPE: &str = "custom.Span";

/// One exported CAS.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CasDocument {
    #[serde(rename = "%FEATURE_STRUCTURES", default)]
    pub feature_structures: Vec<FeatureStructure>,
}

impl CasDocument {
    /// Feature structures of one type, in export order.
    pub fn of_type<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a FeatureStructure> {
        self.feature_structures
            .iter()
            .filter(move |fs| fs.type_name == type_name)
    }
}

/// A typed bag of features.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureStructure {
    #[serde(rename = "%TYPE", default)]
    pub type_name: String,

    #[serde(flatten)]
    pub features: Map<String, Value>,
}

impl FeatureStructure {
    /// A string feature, `None` when absent or not a string.
    #[must_use]
    pub fn str_feature(&self, name: &str) -> Option<&str> {
        self.features.get(name).and_then(Value::as_str)
    }

    /// Character offset feature (`begin`/`end`), 0 when absent.
    #[must_use]
    pub fn offset(&self, name: &str) -> usize {
        self.features
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn begin(&self) -> usize {
        self.offset("begin")
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.offset("end")
    }

    /// Whether `[begin, end)` intersects `[start, end)`.
    #[must_use]
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        !(self.end() <= start || self.begin() >= end)
    }
}

/// Text covered by an annotation span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanText {
    pub text: String,
    pub begin: usize,
    pub end: usize,
}

/// Value of a span-valued field: one span, several, or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpanValue {
    One(SpanText),
    Many(Vec<SpanText>),
    Text(String),
}

/// One claim or non-claim item of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimItem {
    pub claim: bool,
    pub begin_character: usize,
    pub end_character: usize,
    pub text_segment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_span: Option<SpanValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_object: Option<SpanValue>,

    /// Document-level claimer, `[]` when none was annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimer: Option<SpanValue>,

    /// Document-level time, `""` when none was annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<SpanValue>,

    /// `<document stem>_c<n>`, numbered by position.
    #[serde(default)]
    pub id: String,
}

/// A converted document: the unit the splitter keeps together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDocument {
    pub document: String,
    pub news_article_topic: String,
    pub publication_time: String,
    pub items: Vec<ClaimItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_structure_parsing() {
        let fs: FeatureStructure = serde_json::from_value(json!({
            "%ID": 12,
            "%TYPE": "custom.Span",
            "begin": 4,
            "end": 9,
            "label": "Claim"
        }))
        .unwrap();

        assert_eq!(fs.type_name, SPAN_TYPE);
        assert_eq!(fs.str_feature("label"), Some("Claim"));
        assert_eq!(fs.begin(), 4);
        assert_eq!(fs.end(), 9);
        assert_eq!(fs.offset("missing"), 0);
    }

    #[test]
    fn test_overlaps() {
        let fs: FeatureStructure =
            serde_json::from_value(json!({"%TYPE": "custom.Span", "begin": 10, "end": 20}))
                .unwrap();
        assert!(fs.overlaps(15, 25));
        assert!(fs.overlaps(0, 11));
        assert!(!fs.overlaps(20, 30));
        assert!(!fs.overlaps(0, 10));
    }

    #[test]
    fn test_span_value_serialization() {
        let one = SpanValue::One(SpanText {
            text: "Ontem".to_string(),
            begin: 0,
            end: 5,
        });
        assert_eq!(
            serde_json::to_value(&one).unwrap(),
            json!({"text": "Ontem", "begin": 0, "end": 5})
        );
        assert_eq!(serde_json::to_value(SpanValue::Many(vec![])).unwrap(), json!([]));
        assert_eq!(
            serde_json::to_value(SpanValue::Text(String::new())).unwrap(),
            json!("")
        );
    }
}
