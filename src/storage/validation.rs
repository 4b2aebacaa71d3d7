//! Path validation
//!
//! Sandbox safety checks for caller-supplied path strings. Callers hand us
//! `&str`, so malformed UTF-8 is already rejected at the boundary by
//! construction; embedded NUL bytes are still possible and checked here.

use std::path::{Component, Path, PathBuf};

/// Longest permitted single path component, in bytes.
pub const MAX_COMPONENT_LEN: usize = 255;

/// Longest permitted normalized path, in bytes.
pub const MAX_PATH_LEN: usize = 4096;

/// Check whether `path` is a valid, sandbox-safe pathname for the current OS.
///
/// Pure predicate: it never touches the filesystem and never fails. Callers
/// translate `false` into an `InvalidPath` error.
pub fn is_pathname_valid(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.contains('\0') {
        return false;
    }

    let mut total_len = 0usize;
    for component in Path::new(path).components() {
        let part = component.as_os_str().to_string_lossy();
        if part == ".." {
            return false;
        }
        // Volume/drive separators never belong in a sandboxed component.
        if part.contains(':') {
            return false;
        }
        if part.len() > MAX_COMPONENT_LEN {
            return false;
        }
        total_len += part.len() + 1;
    }

    total_len <= MAX_PATH_LEN
}

/// Normalize a validated path string into a data-root-relative `PathBuf`.
///
/// `.` components are dropped. Rooted, prefixed, or parent components are
/// refused so that joining the result against the data root can never land
/// outside it (`Path::join` would replace the base for an absolute path).
pub fn normalize_relative(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => return None,
        }
    }
    Some(relative)
}
