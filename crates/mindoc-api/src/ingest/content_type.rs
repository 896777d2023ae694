//! Content-type policy for uploaded files.
//!
//! The declared MIME type must be in the configured allow-list and must
//! agree with the type inferred from the filename extension. Both checks
//! run before any byte is forwarded to the object store.

use std::path::Path;

use mindoc_core::AppError;

/// Strip parameters and lowercase: "Application/PDF; charset=x" -> "application/pdf".
pub fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// MIME types accepted for a filename extension.
fn expected_mime_types(extension: &str) -> Option<&'static [&'static str]> {
    let expected: &'static [&'static str] = match extension {
        "pdf" => &["application/pdf"],
        "doc" => &["application/msword"],
        "docx" => {
            &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"]
        }
        "xls" => &["application/vnd.ms-excel"],
        "xlsx" => &["application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"],
        "ppt" => &["application/vnd.ms-powerpoint"],
        "pptx" => {
            &["application/vnd.openxmlformats-officedocument.presentationml.presentation"]
        }
        "txt" => &["text/plain"],
        "md" => &["text/markdown", "text/plain"],
        "csv" => &["text/csv"],
        "json" => &["application/json"],
        "xml" => &["application/xml", "text/xml"],
        "zip" => &["application/zip"],
        "png" => &["image/png"],
        "jpg" | "jpeg" => &["image/jpeg"],
        _ => return None,
    };
    Some(expected)
}

/// Validate the declared content type of a file part against the configured
/// allow-list and the filename extension. Returns the normalized type to
/// store alongside the object.
pub fn authorize_content_type(
    file_name: &str,
    declared: Option<&str>,
    allowed: &[String],
) -> Result<String, AppError> {
    let declared = declared.filter(|ct| !ct.trim().is_empty()).ok_or_else(|| {
        AppError::UnauthorizedContentType(format!(
            "File '{}' declares no content type",
            file_name
        ))
    })?;
    let normalized = normalize_mime(declared);

    if !allowed.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::UnauthorizedContentType(format!(
            "Content type '{}' is not allowed. Allowed types: {}",
            normalized,
            allowed.join(", ")
        )));
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();
    if extension.is_empty() {
        return Err(AppError::UnauthorizedContentType(format!(
            "File '{}' has no extension to validate against",
            file_name
        )));
    }

    let expected = expected_mime_types(&extension).ok_or_else(|| {
        AppError::UnauthorizedContentType(format!(
            "Unsupported file extension '{}'",
            extension
        ))
    })?;

    if !expected.contains(&normalized.as_str()) {
        return Err(AppError::UnauthorizedContentType(format!(
            "Content type '{}' does not match extension '{}'. Expected one of: {}",
            normalized,
            extension,
            expected.join(", ")
        )));
    }

    Ok(normalized)
}
