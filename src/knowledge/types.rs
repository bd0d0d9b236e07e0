use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared format of a stored document. Only `Txt` content is real text;
/// the other formats carry a placeholder body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    #[default]
    #[serde(alias = "text")]
    Txt,
}

impl DocumentFormat {
    pub fn from_file_name(name: &str) -> Self {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            _ => DocumentFormat::Txt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DocumentFormat::Txt)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub format: DocumentFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Input for a new document. A missing `id` is generated from the creation
/// time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub format: DocumentFormat,
    #[serde(default)]
    pub category: Option<String>,
}

/// In-place edit. Absent fields are left untouched; an empty `category`
/// clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.category.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_derived_from_extension() {
        assert_eq!(DocumentFormat::from_file_name("Policy.PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_file_name("guide.docx"), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_file_name("notes.md"), DocumentFormat::Txt);
        assert_eq!(DocumentFormat::from_file_name("README"), DocumentFormat::Txt);
    }

    #[test]
    fn text_alias_deserializes_to_txt() {
        let format: DocumentFormat = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(format, DocumentFormat::Txt);
        assert_eq!(serde_json::to_string(&format).unwrap(), "\"txt\"");
    }

    #[test]
    fn persisted_document_without_format_defaults_to_txt() {
        let doc: Document = serde_json::from_str(
            r#"{"id":"1","name":"n","content":"c","uploaded_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(doc.format, DocumentFormat::Txt);
        assert_eq!(doc.category, None);
    }
}
