// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for VisionBridge.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all VisionBridge operations.
#[derive(Debug, Error)]
pub enum VisionError {
    // -- Input --
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to decode image {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Output --
    #[error("failed to write image {}: {reason}", .path.display())]
    Encode { path: PathBuf, reason: String },

    // -- Configuration --
    #[error("invalid detection config: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_and_decode_read_differently() {
        let missing = VisionError::NotFound(PathBuf::from("/nope.png"));
        let corrupt = VisionError::Decode {
            path: PathBuf::from("/bad.png"),
            reason: "truncated".into(),
        };
        assert_eq!(missing.to_string(), "image not found: /nope.png");
        assert_eq!(
            corrupt.to_string(),
            "failed to decode image /bad.png: truncated"
        );
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(VisionError::from(parse), VisionError::Serialization(_)));
    }
}
