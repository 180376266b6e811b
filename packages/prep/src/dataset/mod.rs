//! Reading and writing labeled datasets.

mod reader;
mod writer;

pub use reader::{parse_dataset, read_dataset};
pub use writer::{render, write_artifacts, Artifact, Format};
