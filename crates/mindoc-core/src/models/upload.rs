use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Timestamp format embedded in storage keys, millisecond precision.
const STORAGE_KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";

const MAX_NAME_LENGTH: usize = 255;

/// Derive the object-store key for a document: UTC timestamp down to
/// milliseconds, followed by the document name. Unique without coordination
/// as long as two uploads of the same name do not start within the same
/// millisecond.
pub fn derive_storage_key(now: DateTime<Utc>, name: &str) -> String {
    format!("{}{}", now.format(STORAGE_KEY_TIMESTAMP_FORMAT), name)
}

/// Finalized metadata for one upload, built from the multipart form fields
/// before any file byte is forwarded to the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub storage_key: String,
}

impl UploadRequest {
    /// Metadata attached to the object-store session at initiation.
    pub fn object_metadata(&self) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), self.name.clone()),
            ("category".to_string(), self.category.clone()),
            ("description".to_string(), self.description.clone()),
        ])
    }
}

/// Accumulates form fields while the multipart body is walked, then
/// finalizes into an immutable [`UploadRequest`] once the file section is
/// reached.
#[derive(Debug, Default)]
pub struct UploadRequestBuilder {
    name: Option<String>,
    description: Option<String>,
    category: Option<String>,
}

impl UploadRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a form field. Field names match case-insensitively; returns
    /// false for fields this builder does not recognize.
    pub fn set_field(&mut self, field_name: &str, value: String) -> bool {
        match field_name.to_lowercase().as_str() {
            "name" => {
                self.name = Some(value);
                true
            }
            "description" => {
                self.description = Some(value);
                true
            }
            "category" => {
                self.category = Some(value);
                true
            }
            _ => false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Finalize the builder. All three metadata fields must be present and
    /// non-empty; the storage key is derived from `now` and the name.
    pub fn build(self, now: DateTime<Utc>) -> Result<UploadRequest, AppError> {
        let mut missing = Vec::new();
        if self.name.as_deref().unwrap_or("").is_empty() {
            missing.push("name");
        }
        if self.description.as_deref().unwrap_or("").is_empty() {
            missing.push("description");
        }
        if self.category.as_deref().unwrap_or("").is_empty() {
            missing.push("category");
        }
        if !missing.is_empty() {
            return Err(AppError::MalformedRequest(format!(
                "Missing required form field(s): {}",
                missing.join(", ")
            )));
        }

        let name = self.name.unwrap_or_default();
        if name.len() > MAX_NAME_LENGTH || name.contains('/') || name.contains('\\') || name.contains("..")
        {
            return Err(AppError::MalformedRequest(format!(
                "Invalid document name: {}",
                name
            )));
        }

        let storage_key = derive_storage_key(now, &name);
        Ok(UploadRequest {
            name,
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            storage_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 21).unwrap()
            + chrono::Duration::milliseconds(456)
    }

    #[test]
    fn test_derive_storage_key_embeds_millisecond_timestamp() {
        let key = derive_storage_key(fixed_instant(), "q3-report.pdf");
        assert_eq!(key, "20240115093021456q3-report.pdf");
    }

    #[test]
    fn test_builder_accepts_fields_case_insensitively() {
        let mut builder = UploadRequestBuilder::new();
        assert!(builder.set_field("Name", "q3-report.pdf".to_string()));
        assert!(builder.set_field("DESCRIPTION", "Quarterly earnings".to_string()));
        assert!(builder.set_field("category", "finance".to_string()));
        assert!(!builder.set_field("comment", "ignored".to_string()));

        let request = builder.build(fixed_instant()).unwrap();
        assert_eq!(request.name, "q3-report.pdf");
        assert_eq!(request.description, "Quarterly earnings");
        assert_eq!(request.category, "finance");
        assert_eq!(request.storage_key, "20240115093021456q3-report.pdf");
    }

    #[test]
    fn test_builder_reports_all_missing_fields() {
        let mut builder = UploadRequestBuilder::new();
        builder.set_field("name", "report.pdf".to_string());

        let err = builder.build(fixed_instant()).unwrap_err();
        match err {
            AppError::MalformedRequest(msg) => {
                assert!(msg.contains("description"));
                assert!(msg.contains("category"));
                assert!(!msg.contains("name"));
            }
            other => panic!("expected MalformedRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_rejects_empty_values() {
        let mut builder = UploadRequestBuilder::new();
        builder.set_field("name", String::new());
        builder.set_field("description", "d".to_string());
        builder.set_field("category", "c".to_string());
        assert!(builder.build(fixed_instant()).is_err());
    }

    #[test]
    fn test_builder_rejects_path_traversal_names() {
        for name in ["../../etc/passwd", "a/b.pdf", "a\\b.pdf"] {
            let mut builder = UploadRequestBuilder::new();
            builder.set_field("name", name.to_string());
            builder.set_field("description", "d".to_string());
            builder.set_field("category", "c".to_string());
            assert!(builder.build(fixed_instant()).is_err(), "{}", name);
        }
    }

    #[test]
    fn test_object_metadata_carries_all_fields() {
        let request = UploadRequest {
            name: "n".to_string(),
            description: "d".to_string(),
            category: "c".to_string(),
            storage_key: "k".to_string(),
        };
        let metadata = request.object_metadata();
        assert_eq!(metadata.get("name").map(String::as_str), Some("n"));
        assert_eq!(metadata.get("category").map(String::as_str), Some("c"));
        assert_eq!(metadata.get("description").map(String::as_str), Some("d"));
    }
}
