//! Conversion of CAS exports into claim dataset documents.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{
    CasDocument, ClaimDocument, ClaimItem, FeatureStructure, SpanText, SpanValue,
    DOCUMENT_METADATA_TYPE, SOFA_TYPE, SPAN_TYPE,
};
use crate::bundle::has_json_extension;
use crate::error::{PrepError, Result};

/// `Metadata` value of the span carrying the article topic.
const TOPIC_METADATA: &str = "News Article Topic";

/// `Metadata` value of the span covering the publication time.
const PUBLICATION_TIME_METADATA: &str = "Publication Time";

const LABEL_CLAIM: &str = "Claim";
const LABEL_NON_CLAIM: &str = "Non-claim";
const LABEL_CLAIM_SPAN: &str = "Claim span";
const LABEL_CLAIM_OBJECT: &str = "Claim object";
const LABEL_CLAIMER: &str = "Claimer";
const LABEL_TIME: &str = "Time";

/// Document text addressable by character offsets.
///
/// CAS offsets count characters, not bytes. Slicing clamps out-of-range
/// offsets and yields an empty string when `begin >= end`.
struct SofaText<'a> {
    text: &'a str,
    /// Byte position of every character, plus the text length.
    boundaries: Vec<usize>,
}

impl<'a> SofaText<'a> {
    fn new(text: &'a str) -> Self {
        let boundaries = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { text, boundaries }
    }

    fn slice(&self, begin: usize, end: usize) -> &'a str {
        let chars = self.boundaries.len() - 1;
        let begin = begin.min(chars);
        let end = end.min(chars);
        if begin >= end {
            return "";
        }
        &self.text[self.boundaries[begin]..self.boundaries[end]]
    }

    fn span_text(&self, span: &FeatureStructure) -> SpanText {
        let (begin, end) = (span.begin(), span.end());
        SpanText {
            text: self.slice(begin, end).to_string(),
            begin,
            end,
        }
    }

    /// One span becomes an object, several a list, none nothing.
    fn span_value(&self, spans: &[&FeatureStructure]) -> Option<SpanValue> {
        match spans {
            [] => None,
            [single] => Some(SpanValue::One(self.span_text(single))),
            many => Some(SpanValue::Many(
                many.iter().map(|s| self.span_text(s)).collect(),
            )),
        }
    }
}

/// Convert one CAS export into a claim document.
///
/// `context` names the export in error messages (usually its path).
pub fn convert_cas(cas: &CasDocument, context: &str) -> Result<ClaimDocument> {
    let sofa = cas
        .of_type(SOFA_TYPE)
        .next()
        .ok_or_else(|| PrepError::MissingFeature {
            feature: SOFA_TYPE.to_string(),
            context: context.to_string(),
        })?;
    let text = SofaText::new(sofa.str_feature("sofaString").unwrap_or_default());

    let metadata = cas
        .of_type(DOCUMENT_METADATA_TYPE)
        .next()
        .ok_or_else(|| PrepError::MissingFeature {
            feature: DOCUMENT_METADATA_TYPE.to_string(),
            context: context.to_string(),
        })?;
    let title = metadata
        .str_feature("documentTitle")
        .unwrap_or_default()
        .to_string();

    let spans: Vec<&FeatureStructure> = cas.of_type(SPAN_TYPE).collect();

    let find_meta = |name: &str| {
        spans
            .iter()
            .copied()
            .find(|fs| fs.str_feature("Metadata") == Some(name))
    };
    let topic = find_meta(TOPIC_METADATA)
        .and_then(|fs| fs.str_feature("categoria"))
        .unwrap_or_default()
        .to_string();
    let publication_time = find_meta(PUBLICATION_TIME_METADATA)
        .map(|fs| text.slice(fs.begin(), fs.end()).trim().to_string())
        .unwrap_or_default();

    let mut by_label: HashMap<&str, Vec<&FeatureStructure>> = HashMap::new();
    for &span in &spans {
        if let Some(label) = span.str_feature("label").filter(|l| !l.is_empty()) {
            by_label.entry(label).or_default().push(span);
        }
    }
    let labeled = |label: &str| by_label.get(label).map(Vec::as_slice).unwrap_or_default();

    let claimer = text
        .span_value(labeled(LABEL_CLAIMER))
        .unwrap_or(SpanValue::Many(Vec::new()));
    let time = text
        .span_value(labeled(LABEL_TIME))
        .unwrap_or(SpanValue::Text(String::new()));

    let mut items: Vec<ClaimItem> = Vec::new();

    for claim in labeled(LABEL_CLAIM) {
        let (begin, end) = (claim.begin(), claim.end());

        items.push(ClaimItem {
            claim: true,
            begin_character: begin,
            end_character: end,
            text_segment: text.slice(begin, end).to_string(),
            claim_topic: Some(
                claim
                    .str_feature("Topic")
                    .map_or_else(|| topic.clone(), str::to_string),
            ),
            claim_span: text.span_value(&overlapping(labeled(LABEL_CLAIM_SPAN), begin, end)),
            claim_object: text.span_value(&overlapping(labeled(LABEL_CLAIM_OBJECT), begin, end)),
            claimer: Some(claimer.clone()),
            time: Some(time.clone()),
            id: String::new(),
        });
    }

    for non_claim in labeled(LABEL_NON_CLAIM) {
        let (begin, end) = (non_claim.begin(), non_claim.end());
        items.push(ClaimItem {
            claim: false,
            begin_character: begin,
            end_character: end,
            text_segment: text.slice(begin, end).to_string(),
            claim_topic: None,
            claim_span: None,
            claim_object: None,
            claimer: None,
            time: None,
            id: String::new(),
        });
    }

    // Stable: claims stay ahead of non-claims starting at the same offset
    items.sort_by_key(|item| item.begin_character);

    let stem = document_stem(&title);
    for (index, item) in items.iter_mut().enumerate() {
        item.id = format!("{stem}_c{}", index + 1);
    }

    Ok(ClaimDocument {
        document: title,
        news_article_topic: topic,
        publication_time,
        items,
    })
}

/// Spans intersecting `[begin, end)`.
fn overlapping<'a>(
    spans: &[&'a FeatureStructure],
    begin: usize,
    end: usize,
) -> Vec<&'a FeatureStructure> {
    spans
        .iter()
        .copied()
        .filter(|s| s.overlaps(begin, end))
        .collect()
}

/// Document title without its final extension: `news_0001.txt` -> `news_0001`.
fn document_stem(title: &str) -> String {
    Path::new(title)
        .with_extension("")
        .to_string_lossy()
        .into_owned()
}

/// Read and parse one CAS JSON file.
pub fn read_cas(path: &Path) -> Result<CasDocument> {
    let text = fs::read_to_string(path).map_err(|e| PrepError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| PrepError::json(path, e))
}

/// Convert every `.json` file in `input_dir`, in file name order.
///
/// `on_document` is called after each conversion, for progress reporting.
pub fn convert_directory<F>(input_dir: &Path, on_document: F) -> Result<Vec<ClaimDocument>>
where
    F: FnMut(&Path, &ClaimDocument),
{
    let files = list_exports(input_dir)?;
    convert_files(&files, on_document)
}

/// Convert the given CAS export files, in the order given.
pub fn convert_files<F>(files: &[PathBuf], mut on_document: F) -> Result<Vec<ClaimDocument>>
where
    F: FnMut(&Path, &ClaimDocument),
{
    let mut documents = Vec::with_capacity(files.len());

    for path in files {
        let cas = read_cas(path)?;
        let document = convert_cas(&cas, &path.display().to_string())?;
        tracing::info!(
            "{} -> {} ({} items)",
            path.display(),
            document.document,
            document.items.len()
        );
        on_document(path, &document);
        documents.push(document);
    }

    Ok(documents)
}

/// JSON files directly inside `input_dir`, sorted by name.
pub fn list_exports(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir).map_err(|e| PrepError::io(input_dir, e))? {
        let path = entry.map_err(|e| PrepError::io(input_dir, e))?.path();
        if path.is_file() && has_json_extension(&path) {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(PrepError::InvalidInput(format!(
            "no .json files found in directory: {}",
            input_dir.display()
        )));
    }
    Ok(files)
}
