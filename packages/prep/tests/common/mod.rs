#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// Flat records: `claim_docs` documents mixing claims and non-claims,
/// then `plain_docs` documents with non-claims only. Record counts vary per
/// document so groups are uneven.
pub fn flat_corpus(claim_docs: usize, plain_docs: usize) -> Vec<Value> {
    let mut records = Vec::new();
    for i in 0..claim_docs {
        let doc = format!("news_{i:04}");
        for j in 0..(1 + i % 3) {
            records.push(json!({
                "document_id": doc,
                "label": "claim",
                "text": format!("claim {j} of {doc}")
            }));
        }
        records.push(json!({"document_id": doc, "label": "non-claim", "text": "context"}));
    }
    for i in 0..plain_docs {
        let doc = format!("opinion_{i:04}");
        for j in 0..(1 + i % 2) {
            records.push(json!({
                "document_id": doc,
                "label": "non-claim",
                "text": format!("sentence {j}")
            }));
        }
    }
    records
}

/// Write `records` as a pretty JSON array and return the path.
pub fn write_dataset(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(records).unwrap()).unwrap();
    path
}

/// A minimal CAS export with one sofa, one title and the given spans.
///
/// Each span is `(begin, end, label)`.
pub fn cas_export(title: &str, text: &str, spans: &[(usize, usize, &str)]) -> Value {
    let mut structures = vec![
        json!({"%ID": 1, "%TYPE": "uima.cas.Sofa", "sofaString": text}),
        json!({
            "%ID": 2,
            "%TYPE": "de.tudarmstadt.ukp.dkpro.core.api.metadata.type.DocumentMetaData",
            "documentTitle": title
        }),
    ];
    for (index, (begin, end, label)) in spans.iter().enumerate() {
        structures.push(json!({
            "%ID": index + 3,
            "%TYPE": "custom.Span",
            "begin": begin,
            "end": end,
            "label": label
        }));
    }
    json!({ "%FEATURE_STRUCTURES": structures })
}
