//! Text extraction from uploaded documents.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::matching::Upload;
use crate::error::{Error, Result};

/// Whether a file name denotes a PDF.
pub fn is_pdf(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".pdf")
}

/// Extract the text of an uploaded resume or job description.
///
/// PDFs are parsed; anything else must be UTF-8 text.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String> {
    if is_pdf(filename) {
        return extract_pdf_text(bytes);
    }

    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::InvalidInput(format!("{} is not valid UTF-8 text", filename)))
}

/// [`extract_text`] on the blocking pool, since PDF parsing is CPU-bound.
pub async fn extract_text_blocking(filename: String, bytes: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || extract_text(&filename, &bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                Error::DocumentExtraction(panic_message(e.into_panic()))
            } else {
                Error::Internal(format!("Text extraction task failed: {}", e))
            }
        })?
}

/// Text of an uploaded document, else of a text field.
///
/// `None` when neither was supplied or the text field is blank.
pub async fn upload_or_text(
    file: Option<Upload>,
    text: Option<String>,
) -> Result<Option<String>> {
    if let Some(file) = file {
        return extract_text_blocking(file.filename, file.bytes).await.map(Some);
    }
    Ok(text.filter(|t| !t.trim().is_empty()))
}

/// Extract the text of every page of a PDF.
///
/// The parser panics on some malformed documents (an undefined font, for
/// one); that counts as an unreadable upload, not a server fault.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)))
        .map_err(|payload| Error::DocumentExtraction(panic_message(payload)))?
        .map_err(|e| Error::DocumentExtraction(e.to_string()))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "PDF parser panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf("Jane_Doe_Resume.PDF"));
        assert!(is_pdf("jd.pdf"));
        assert!(!is_pdf("jd.txt"));
        assert!(!is_pdf("pdf"));
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_text("jd.txt", "Senior Rust engineer".as_bytes()).unwrap();
        assert_eq!(text, "Senior Rust engineer");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let result = extract_text("jd.docx", &[0xff, 0xfe, 0x00]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_extract_text_blocking() {
        let text = extract_text_blocking("cv.md".to_string(), b"# Jane".to_vec())
            .await
            .unwrap();
        assert_eq!(text, "# Jane");
    }

    #[tokio::test]
    async fn test_upload_takes_precedence_over_text() {
        let from_file = upload_or_text(
            Some(Upload::new("jd.txt", b"From file".to_vec())),
            Some("From field".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(from_file.as_deref(), Some("From file"));

        let from_field = upload_or_text(None, Some("From field".to_string())).await.unwrap();
        assert_eq!(from_field.as_deref(), Some("From field"));

        assert_eq!(upload_or_text(None, Some("  ".to_string())).await.unwrap(), None);
        assert_eq!(upload_or_text(None, None).await.unwrap(), None);
    }

    #[test]
    fn test_broken_pdf_is_rejected() {
        let result = extract_text("resume.pdf", b"definitely not a pdf");
        match result {
            Err(e) => {
                assert!(matches!(e, Error::DocumentExtraction(_)));
                assert!(e.to_string().starts_with("Failed to extract PDF text: "));
            }
            Ok(_) => panic!("garbage should not parse as PDF"),
        }
    }

    /// One page drawing text in font /F1 with no font resources defined.
    fn pdf_with_undefined_font() -> Vec<u8> {
        let content = "BT /F1 12 Tf 72 712 Td (Jane Doe) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << >> /Contents 4 0 R >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{}\nendstream", content.len(), content),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, object));
        }
        let xref = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            pdf.push_str(&format!("{:010} 00000 n \n", offset));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        ));
        pdf.into_bytes()
    }

    #[tokio::test]
    async fn test_pdf_with_undefined_font_is_a_bad_upload() {
        let result = extract_text_blocking("resume.pdf".to_string(), pdf_with_undefined_font()).await;
        match result {
            Err(e) => {
                assert!(matches!(e, Error::DocumentExtraction(_)));
                assert_eq!(e.status_code(), axum::http::StatusCode::BAD_REQUEST);
                assert!(e.to_string().starts_with("Failed to extract PDF text: "));
            }
            Ok(text) => panic!("expected extraction to fail, got {:?}", text),
        }
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("missing font")), "missing font");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(42)), "PDF parser panicked");
    }
}
