// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for face registration, triangulation and compaction.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A face was supplied with fewer than 3 triplets.
    ///
    /// `face` is the index the face would have taken in its submesh. Rejected
    /// faces do not consume an index, so the next accepted face gets it.
    #[error("malformed face {face} in submesh {submesh}: {vertex_count} vertices, need at least 3")]
    MalformedFace {
        submesh: usize,
        face: usize,
        vertex_count: usize,
    },

    /// A face could not be triangulated, or referenced an attribute that does
    /// not exist. Faces rejected at registration report `face` the same way
    /// as [`Error::MalformedFace`].
    #[error("degenerate face {face} in submesh {submesh}: {reason}")]
    DegenerateFace {
        submesh: usize,
        face: usize,
        reason: DegenerateReason,
    },

    /// A triplet reached compaction without ever being registered, or a
    /// compacted triplet has no attributes to gather.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("unknown submesh index {0}")]
    UnknownSubMesh(usize),

    #[error("invalid configuration value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}

impl Error {
    /// Face-level errors only affect the offending face; the rest of the
    /// model can still be processed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MalformedFace { .. } | Error::DegenerateFace { .. }
        )
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }
}

/// Why a face could not be triangulated
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegenerateReason {
    #[error("polygon has {count} vertices, need at least 3")]
    TooFewVertices { count: usize },

    /// Every remaining vertex was tested and none formed an ear.
    #[error("ear clipping stalled with {remaining} vertices left")]
    EarClippingStalled { remaining: usize },

    /// The polygon has no area in its projection plane (collinear or
    /// coincident vertices).
    #[error("polygon has zero area")]
    ZeroArea,

    /// A position or normal index points past the supplied attribute arrays.
    #[error("attribute index {index} is out of range")]
    AttributeOutOfRange { index: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_errors_are_recoverable() {
        let malformed = Error::MalformedFace {
            submesh: 0,
            face: 3,
            vertex_count: 2,
        };
        let degenerate = Error::DegenerateFace {
            submesh: 1,
            face: 0,
            reason: DegenerateReason::ZeroArea,
        };
        assert!(malformed.is_recoverable());
        assert!(degenerate.is_recoverable());
        assert!(!Error::invariant("missing key 1/2/3").is_recoverable());
        assert!(!Error::UnknownSubMesh(4).is_recoverable());
    }

    #[test]
    fn test_degenerate_message_names_face() {
        let err = Error::DegenerateFace {
            submesh: 2,
            face: 7,
            reason: DegenerateReason::EarClippingStalled { remaining: 5 },
        };
        let msg = err.to_string();
        assert!(msg.contains("face 7"));
        assert!(msg.contains("submesh 2"));
        assert!(msg.contains("5 vertices left"));
    }
}
