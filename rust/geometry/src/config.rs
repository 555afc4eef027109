// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration, optionally loaded from environment variables.

use std::str::FromStr;

use crate::error::{Error, Result};

const ENV_LARGE_COORDINATE_THRESHOLD: &str = "POLYFACE_LARGE_COORDINATE_THRESHOLD";
const ENV_EPSILON: &str = "POLYFACE_EPSILON";
const ENV_DEGENERATE_FACES: &str = "POLYFACE_DEGENERATE_FACES";

/// What a load does with a face that cannot be triangulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DegenerateFacePolicy {
    /// Drop the face, log it and keep going.
    #[default]
    Skip,
    /// Fail the whole load.
    Abort,
}

impl FromStr for DegenerateFacePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            _ => Err(Error::InvalidConfig {
                key: ENV_DEGENERATE_FACES,
                value: s.to_string(),
            }),
        }
    }
}

/// Load session configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Coordinates beyond this magnitude trigger a model-wide shift so that
    /// f32 vertex buffers keep their precision.
    pub large_coordinate_threshold: f64,
    /// Relative tolerance for area and orientation tests during ear clipping.
    pub epsilon: f64,
    /// Handling of faces that cannot be triangulated.
    pub degenerate_faces: DegenerateFacePolicy,
}

impl SessionConfig {
    /// Load configuration from environment variables, falling back to the
    /// default for anything unset, unparsable or out of range.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            large_coordinate_threshold: env_or(
                ENV_LARGE_COORDINATE_THRESHOLD,
                defaults.large_coordinate_threshold,
                valid_threshold,
            ),
            epsilon: env_or(ENV_EPSILON, defaults.epsilon, valid_epsilon),
            degenerate_faces: env_or(ENV_DEGENERATE_FACES, defaults.degenerate_faces, always),
        }
    }

    /// Like [`SessionConfig::from_env`] but unparsable or out of range values
    /// are errors.
    pub fn try_from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            large_coordinate_threshold: try_env(
                ENV_LARGE_COORDINATE_THRESHOLD,
                defaults.large_coordinate_threshold,
                valid_threshold,
            )?,
            epsilon: try_env(ENV_EPSILON, defaults.epsilon, valid_epsilon)?,
            degenerate_faces: try_env(ENV_DEGENERATE_FACES, defaults.degenerate_faces, always)?,
        })
    }

    pub fn with_degenerate_faces(mut self, policy: DegenerateFacePolicy) -> Self {
        self.degenerate_faces = policy;
        self
    }

    pub fn with_large_coordinate_threshold(mut self, threshold: f64) -> Self {
        self.large_coordinate_threshold = threshold;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            large_coordinate_threshold: 1_000_000.0,
            epsilon: 1e-10,
            degenerate_faces: DegenerateFacePolicy::Skip,
        }
    }
}

/// Tolerances must be finite and non-negative.
fn valid_epsilon(epsilon: &f64) -> bool {
    epsilon.is_finite() && *epsilon >= 0.0
}

/// Rejects zero, negative and NaN thresholds.
fn valid_threshold(threshold: &f64) -> bool {
    *threshold > 0.0
}

fn always<T>(_: &T) -> bool {
    true
}

/// `None` when `key` is unset.
fn read_env<T: FromStr>(key: &'static str, valid: fn(&T) -> bool) -> Option<Result<T>> {
    let value = std::env::var(key).ok()?;
    Some(match value.parse::<T>() {
        Ok(parsed) if valid(&parsed) => Ok(parsed),
        _ => Err(Error::InvalidConfig { key, value }),
    })
}

fn env_or<T: FromStr>(key: &'static str, default: T, valid: fn(&T) -> bool) -> T {
    match read_env(key, valid) {
        Some(Ok(value)) => value,
        Some(Err(err)) => {
            tracing::warn!(key, error = %err, "Ignoring configuration value");
            default
        }
        None => default,
    }
}

fn try_env<T: FromStr>(key: &'static str, default: T, valid: fn(&T) -> bool) -> Result<T> {
    read_env(key, valid).unwrap_or(Ok(default))
}
