use super::types::{DocumentFormat, NewDocument};

/// Characters of raw read kept in the placeholder for non-text uploads.
pub const BINARY_PREVIEW_CHARS: usize = 500;

/// Turns an uploaded file into a new document.
///
/// Every format is read as text. PDF and DOCX bodies are not extracted; the
/// stored content is a placeholder naming the format and file, followed by a
/// truncated preview of the raw read.
pub fn document_from_upload(file_name: &str, bytes: &[u8]) -> NewDocument {
    let format = DocumentFormat::from_file_name(file_name);
    let raw = String::from_utf8_lossy(bytes);

    let content = if format.is_text() {
        raw.into_owned()
    } else {
        let preview: String = raw.chars().take(BINARY_PREVIEW_CHARS).collect();
        format!(
            "[Note: This is an indexed {} file]\nFilename: {}\n\nBinary content extracted: {}...",
            format.as_str().to_uppercase(),
            file_name,
            preview
        )
    };

    NewDocument {
        id: None,
        name: file_name.to_string(),
        content,
        format,
        category: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_upload_keeps_full_content() {
        let doc = document_from_upload("travel.txt", b"Economy class only.");
        assert_eq!(doc.format, DocumentFormat::Txt);
        assert_eq!(doc.name, "travel.txt");
        assert_eq!(doc.content, "Economy class only.");
    }

    #[test]
    fn pdf_upload_stores_placeholder_with_truncated_preview() {
        let body = "x".repeat(800);
        let doc = document_from_upload("handbook.pdf", body.as_bytes());

        assert_eq!(doc.format, DocumentFormat::Pdf);
        assert!(doc
            .content
            .starts_with("[Note: This is an indexed PDF file]\nFilename: handbook.pdf\n\n"));
        let preview = doc
            .content
            .strip_prefix("[Note: This is an indexed PDF file]\nFilename: handbook.pdf\n\nBinary content extracted: ")
            .and_then(|rest| rest.strip_suffix("..."))
            .unwrap();
        assert_eq!(preview.chars().count(), BINARY_PREVIEW_CHARS);
    }

    #[test]
    fn docx_upload_tolerates_invalid_utf8() {
        let doc = document_from_upload("Benefits.DOCX", &[0x50, 0x4B, 0xFF, 0x03]);
        assert_eq!(doc.format, DocumentFormat::Docx);
        assert!(doc.content.contains("indexed DOCX file"));
    }
}
