// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Status codes reported across the C boundary.

use thiserror::Error;
use visionbridge_core::error::VisionError;

/// Result code returned by status-returning exports.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VbStatus {
    Ok = 0,
    NullArgument = 1,
    InvalidArgument = 2,
    NotFound = 3,
    DecodeFailed = 4,
    EncodeFailed = 5,
    InvalidConfig = 6,
    /// The caller's buffer held fewer records than were detected.
    BufferTooSmall = 7,
    /// A panic was caught at the boundary.
    Panic = 8,
}

impl From<&VisionError> for VbStatus {
    fn from(err: &VisionError) -> Self {
        match err {
            VisionError::NotFound(_) => VbStatus::NotFound,
            VisionError::Decode { .. } => VbStatus::DecodeFailed,
            VisionError::Encode { .. } | VisionError::Io(_) => VbStatus::EncodeFailed,
            VisionError::InvalidArgument(_) => VbStatus::InvalidArgument,
            VisionError::InvalidConfig(_) | VisionError::Serialization(_) => {
                VbStatus::InvalidConfig
            }
        }
    }
}

/// Failure inside an export, before it is flattened to a [`VbStatus`].
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("null pointer passed for `{0}`")]
    NullArgument(&'static str),

    #[error(transparent)]
    Vision(#[from] VisionError),
}

impl BridgeError {
    pub fn status(&self) -> VbStatus {
        match self {
            BridgeError::NullArgument(_) => VbStatus::NullArgument,
            BridgeError::Vision(err) => err.into(),
        }
    }
}
