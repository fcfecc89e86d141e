//! Files-bundle codec.
//!
//! A bundle is a mapping of virtual file path to file content, serialized as a
//! JSON object. It is the blob-side half of every dual-write resource. The
//! codec is exact: decoding an encoded bundle yields the original mapping.

use std::collections::BTreeMap;

/// Path → content mapping for a bundle of source files.
pub type FilesMap = BTreeMap<String, String>;

/// Maximum number of files in a single bundle.
pub const MAX_FILES: usize = 256;

/// Maximum length of a single file path in bytes.
pub const MAX_PATH_LEN: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("bundle must contain 1-{MAX_FILES} files, got {0}")]
    FileCount(usize),
    #[error("invalid file path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("bundle exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    #[error("bundle is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Validate a files mapping before it is accepted into the lifecycle.
///
/// An empty mapping is rejected on purpose: every template, assignment, and
/// attempt carries at least one file, and a blob with no entries is
/// indistinguishable from a lost payload.
///
/// Paths are virtual and flat-ish: forward slashes allowed, no `..` segments,
/// no leading slash, no backslashes or NUL bytes.
pub fn validate(files: &FilesMap, size_limit: u64) -> Result<(), BundleError> {
    if files.is_empty() || files.len() > MAX_FILES {
        return Err(BundleError::FileCount(files.len()));
    }

    let mut total: u64 = 0;
    for (path, content) in files {
        validate_path(path)?;
        total += path.len() as u64 + content.len() as u64;
    }
    if total > size_limit {
        return Err(BundleError::SizeLimitExceeded {
            actual: total,
            limit: size_limit,
        });
    }
    Ok(())
}

fn validate_path(path: &str) -> Result<(), BundleError> {
    let err = |reason| BundleError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(err("empty path"));
    }
    if path.len() > MAX_PATH_LEN {
        return Err(err("path too long"));
    }
    if path.starts_with('/') {
        return Err(err("absolute paths not allowed"));
    }
    if path.contains('\\') || path.contains('\0') {
        return Err(err("backslash and NUL not allowed"));
    }
    if path.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return Err(err("empty or parent-directory segment"));
    }
    Ok(())
}

/// Serialize a files mapping into the blob body.
pub fn encode(files: &FilesMap) -> Result<Vec<u8>, BundleError> {
    Ok(serde_json::to_vec(files)?)
}

/// Deserialize a blob body back into a files mapping.
///
/// Fails when the body is present but not a valid JSON string-to-string
/// object; callers report that separately from transport errors.
pub fn decode(body: &[u8]) -> Result<FilesMap, BundleError> {
    Ok(serde_json::from_slice(body)?)
}
