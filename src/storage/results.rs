//! Storage result types
//!
//! Defines result structures returned by storage operations. Metadata is
//! derived from filesystem attributes at read time, never persisted.

use serde::Serialize;
use std::time::SystemTime;

/// Metadata for a single regular file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    /// Data-root-relative path in `"./..."` notation.
    pub name: String,
    pub create_date: SystemTime,
    /// Absent when creation and modification coincide (fresh files).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modify_date: Option<SystemTime>,
    /// File length in bytes.
    pub size: u64,
}

/// Result of a file read: full metadata plus raw content bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileContent {
    #[serde(flatten)]
    pub metadata: FileMetadata,
    pub content: Vec<u8>,
}
