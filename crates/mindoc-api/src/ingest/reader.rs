//! Multipart section reader.
//!
//! Wraps axum's multipart extractor into a tagged section sequence the
//! upload handler consumes: plain form fields carry metadata text, a file
//! part carries the byte stream. Sections arrive in wire order and the
//! body is read exactly once.

use std::pin::Pin;

use axum::extract::multipart::{Field, Multipart};
use bytes::Bytes;
use futures::Stream;
use mindoc_core::AppError;

/// One multipart section.
pub enum Section<'a> {
    /// A plain text form field.
    FormField { name: String, value: String },
    /// A file part. Ends metadata accumulation.
    FilePart(FilePart<'a>),
}

/// A file section whose bytes have not been read yet.
pub struct FilePart<'a> {
    pub file_name: String,
    pub declared_content_type: Option<String>,
    field: Field<'a>,
}

impl<'a> FilePart<'a> {
    /// The file bytes as a chunk stream suitable for the upload coordinator.
    pub fn into_stream(
        self,
    ) -> Pin<Box<dyn Stream<Item = Result<Bytes, AppError>> + Send + 'a>> {
        Box::pin(futures::stream::try_unfold(
            self.field,
            |mut field| async move {
                let chunk = field.chunk().await.map_err(|e| {
                    AppError::MalformedRequest(format!("Failed reading multipart body: {}", e))
                })?;
                Ok(chunk.map(|bytes| (bytes, field)))
            },
        ))
    }
}

/// Pulls sections off the wire one at a time, forward-only.
pub struct SectionReader {
    multipart: Multipart,
}

impl SectionReader {
    pub fn new(multipart: Multipart) -> Self {
        Self { multipart }
    }

    /// Next section, or `None` once the body is exhausted.
    pub async fn next_section(&mut self) -> Result<Option<Section<'_>>, AppError> {
        let Some(field) = self.multipart.next_field().await.map_err(|e| {
            AppError::MalformedRequest(format!("Failed reading multipart section: {}", e))
        })?
        else {
            return Ok(None);
        };

        // A filename marks a file part; plain fields carry text values.
        if field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let declared_content_type = field.content_type().map(str::to_string);
            return Ok(Some(Section::FilePart(FilePart {
                file_name,
                declared_content_type,
                field,
            })));
        }

        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(|e| {
            AppError::MalformedRequest(format!("Failed reading form field '{}': {}", name, e))
        })?;
        Ok(Some(Section::FormField { name, value }))
    }
}
