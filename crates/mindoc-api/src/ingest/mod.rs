//! Streaming upload ingestion: boundary validation, content-type policy,
//! and the multipart section reader. Everything here runs before or while
//! the request body streams; nothing buffers the whole file.

pub mod boundary;
pub mod content_type;
pub mod reader;
