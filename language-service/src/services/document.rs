//! Documents submitted to the analysis service.

use serde::Serialize;

/// Where the analysis service reads the document text from.
///
/// Exactly one source is ever set, so the two wire fields are variants of
/// one enum rather than two optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DocumentSourceKind {
    #[serde(rename = "content")]
    Inline(String),
    #[serde(rename = "gcsContentUri")]
    StorageReference(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    PlainText,
}

/// Text encoding used by the analysis service to compute offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EncodingType {
    None,
    Utf8,
    Utf16,
    Utf32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source: DocumentSourceKind,
    pub doc_type: DocumentType,
    pub encoding: Option<EncodingType>,
}

impl Document {
    /// Reference an object in a storage bucket (`gs://bucket/object`).
    pub fn from_storage(bucket: &str, object: &str) -> Self {
        Self {
            source: DocumentSourceKind::StorageReference(format!("gs://{}/{}", bucket, object)),
            doc_type: DocumentType::PlainText,
            encoding: None,
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingType) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn is_inline(&self) -> bool {
        matches!(self.source, DocumentSourceKind::Inline(_))
    }
}

/// Wrap raw text as an inline plain-text document.
pub fn build_document(text: impl Into<String>) -> Document {
    Document {
        source: DocumentSourceKind::Inline(text.into()),
        doc_type: DocumentType::PlainText,
        encoding: None,
    }
}
