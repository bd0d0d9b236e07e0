//! Context blob assembly.
//!
//! Every document is included in full, in collection order. There is no
//! chunking, scoring or truncation.

use crate::knowledge::Document;

/// Placed between consecutive documents.
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Header line that labels a document so answers can cite it by name.
pub fn document_header(name: &str) -> String {
    format!("[Document: {}]", name)
}

pub fn assemble(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| format!("{}\n{}", document_header(&doc.name), doc.content))
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}
