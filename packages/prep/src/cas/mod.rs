//! Conversion of annotation tool CAS JSON exports into the claim dataset.
//!
//! Each export becomes one [`ClaimDocument`] whose items are the annotated
//! claim and non-claim spans, ordered by position.

mod convert;
mod types;

pub use convert::{convert_cas, convert_directory, convert_files, list_exports, read_cas};
pub use types::{
    CasDocument, ClaimDocument, ClaimItem, FeatureStructure, SpanText, SpanValue,
    DOCUMENT_METADATA_TYPE, SOFA_TYPE, SPAN_TYPE,
};
