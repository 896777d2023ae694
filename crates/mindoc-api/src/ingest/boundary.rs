//! Multipart boundary validation.
//!
//! The boundary is checked against the Content-Type header alone, before
//! the request body is polled, so oversized or missing boundaries are
//! rejected without reading a single body byte.

use axum::http::{header, HeaderMap};
use mindoc_core::constants::MULTIPART_BOUNDARY_LENGTH_LIMIT;
use mindoc_core::AppError;

/// Extract and validate the multipart boundary from the request headers.
pub fn require_boundary(headers: &HeaderMap) -> Result<String, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::MalformedRequest("Missing Content-Type header".to_string()))?;

    parse_boundary(content_type)
}

/// Parse `boundary=` out of a `multipart/form-data` Content-Type value.
/// RFC 2046 caps boundaries at 70 characters; anything longer is rejected.
pub fn parse_boundary(content_type: &str) -> Result<String, AppError> {
    let mut parts = content_type.split(';');
    let mime = parts.next().unwrap_or("").trim();
    if !mime.to_lowercase().starts_with("multipart/") {
        return Err(AppError::MalformedRequest(format!(
            "Expected a multipart Content-Type, got '{}'",
            mime
        )));
    }

    let boundary = parts
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("boundary") {
                Some(value.trim().trim_matches('"').to_string())
            } else {
                None
            }
        })
        .ok_or_else(|| {
            AppError::MalformedRequest(
                "Multipart Content-Type is missing its boundary parameter".to_string(),
            )
        })?;

    if boundary.is_empty() {
        return Err(AppError::MalformedRequest(
            "Multipart boundary is empty".to_string(),
        ));
    }
    if boundary.len() > MULTIPART_BOUNDARY_LENGTH_LIMIT {
        return Err(AppError::MalformedRequest(format!(
            "Multipart boundary exceeds {} characters",
            MULTIPART_BOUNDARY_LENGTH_LIMIT
        )));
    }

    Ok(boundary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_plain_boundary_accepted() {
        let boundary = parse_boundary("multipart/form-data; boundary=xYz123").unwrap();
        assert_eq!(boundary, "xYz123");
    }

    #[test]
    fn test_quoted_boundary_accepted() {
        let boundary =
            parse_boundary("multipart/form-data; boundary=\"----WebKitFormBoundary7MA4\"")
                .unwrap();
        assert_eq!(boundary, "----WebKitFormBoundary7MA4");
    }

    #[test]
    fn test_boundary_at_length_limit_accepted() {
        let value = "b".repeat(MULTIPART_BOUNDARY_LENGTH_LIMIT);
        let header = format!("multipart/form-data; boundary={}", value);
        assert_eq!(parse_boundary(&header).unwrap(), value);
    }

    #[test]
    fn test_boundary_over_length_limit_rejected() {
        let value = "b".repeat(MULTIPART_BOUNDARY_LENGTH_LIMIT + 1);
        let header = format!("multipart/form-data; boundary={}", value);
        assert!(matches!(
            parse_boundary(&header),
            Err(AppError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_missing_boundary_rejected() {
        assert!(matches!(
            parse_boundary("multipart/form-data"),
            Err(AppError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_empty_boundary_rejected() {
        assert!(matches!(
            parse_boundary("multipart/form-data; boundary="),
            Err(AppError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_non_multipart_rejected() {
        assert!(matches!(
            parse_boundary("application/json"),
            Err(AppError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_missing_header_rejected() {
        let headers = HeaderMap::new();
        assert!(matches!(
            require_boundary(&headers),
            Err(AppError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_header_lookup_finds_boundary() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=abc"),
        );
        assert_eq!(require_boundary(&headers).unwrap(), "abc");
    }
}
