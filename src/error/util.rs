//! Utility functions for error handling
//!
//! File access helpers that attach the path and purpose to failures.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, SssError};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(SssError::file("File not found", path, purpose));
    }

    if !path.is_file() {
        return Err(SssError::file("Path is not a file", path, purpose));
    }

    fs::File::open(path).map_err(|e| {
        let message = match e.kind() {
            io::ErrorKind::PermissionDenied => "Permission denied - check file permissions",
            io::ErrorKind::NotFound => "File not found - it may have been deleted during operation",
            _ => "Failed to open file",
        };
        SssError::File {
            message: message.to_string(),
            path: path.to_path_buf(),
            purpose: purpose.to_string(),
            source: Some(e),
        }
    })
}

/// Safely read a file to string with rich error information
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    match io::Read::read_to_string(&mut file, &mut content) {
        Ok(_) => Ok(content),
        Err(e) => {
            let message = match e.kind() {
                io::ErrorKind::InvalidData => "File contains invalid UTF-8 data - cannot read as text",
                _ => "Failed to read file content",
            };
            Err(SssError::File {
                message: message.to_string(),
                path: path.to_path_buf(),
                purpose: purpose.to_string(),
                source: Some(e),
            })
        }
    }
}

/// Safely create (or truncate) an output file
pub fn safe_create_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(SssError::file("Output directory does not exist", path, purpose));
        }
    }

    fs::File::create(path).map_err(|e| SssError::File {
        message: "Failed to create file".to_string(),
        path: path.to_path_buf(),
        purpose: purpose.to_string(),
        source: Some(e),
    })
}
