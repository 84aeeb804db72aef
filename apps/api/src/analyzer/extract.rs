use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

/// Extracts plain text from an uploaded PDF resume.
///
/// Parsing runs on the blocking pool; `pdf-extract` is CPU-bound.
pub async fn extract_resume_text(content_type: &str, body: Bytes) -> Result<String, AppError> {
    check_upload(content_type, &body)?;

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&body))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("could not read PDF: {e}")))?;

    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(AppError::Validation(
            "no text found in PDF; scanned resumes are not supported".to_string(),
        ));
    }
    debug!("extracted {} chars of resume text", text.len());
    Ok(text)
}

fn check_upload(content_type: &str, body: &[u8]) -> Result<(), AppError> {
    if content_type != "application/pdf" {
        return Err(AppError::Validation(format!(
            "Unsupported resume type '{content_type}'. Upload a PDF."
        )));
    }
    if body.is_empty() {
        return Err(AppError::Validation("resume file is empty".to_string()));
    }
    if body.len() > MAX_RESUME_BYTES {
        return Err(AppError::Validation(format!(
            "resume exceeds {} MB",
            MAX_RESUME_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Collapses runs of blank lines and trailing spaces left by PDF layout.
fn normalize_whitespace(text: &str) -> String {
    let mut out = Vec::new();
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }
    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_pdf_rejected() {
        assert!(check_upload("application/msword", b"abc").is_err());
    }

    #[test]
    fn test_empty_pdf_rejected() {
        assert!(check_upload("application/pdf", b"").is_err());
    }

    #[test]
    fn test_normalize_whitespace_collapses_blank_runs() {
        let text = "Jane Doe   \n\n\n\nExperience\n  \nAcme\n\n";
        assert_eq!(normalize_whitespace(text), "Jane Doe\n\nExperience\n\nAcme");
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_rejected() {
        let err = extract_resume_text("application/pdf", Bytes::from_static(b"not a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_) | AppError::Internal(_)));
    }
}
