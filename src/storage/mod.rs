//! Sandboxed file storage
//!
//! Path validation and file/directory lifecycle operations, all scoped
//! beneath the configured data root.

pub mod operations;
pub mod results;
pub mod validation;

pub use operations::FileStore;
pub use results::{FileContent, FileMetadata};
pub use validation::{MAX_COMPONENT_LEN, MAX_PATH_LEN, is_pathname_valid};
