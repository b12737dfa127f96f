//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`CrowdError`] covers all failure modes including:
//! - Malformed crowd input (missing per-point variables, wrong object type)
//! - Missing agent, agent-type or pose records at an agent location
//! - Configuration loading errors
//!
//! Degraded results (empty poses, absent skin-binding data) are not errors;
//! they are absorbed where they occur and reported through `log::warn!`.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, CrowdError>`.
//!
//! ```rust,ignore
//! use crowd_scene::errors::{CrowdError, Result};
//!
//! fn bound_of(generator: &CrowdGenerator, path: &ScenePath) -> Result<BoundingBox> {
//!     generator.bound(path)
//! }
//! ```

use thiserror::Error;

use crate::scene::ScenePath;

/// The main error type for crowd expansion.
///
/// Every variant that relates to a particular location carries the
/// offending [`ScenePath`], so the failure can be traced back to the query
/// that produced it.
#[derive(Error, Debug)]
pub enum CrowdError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The upstream crowd or template data is inconsistent with the request.
    #[error("Invalid input at {path}: {reason}")]
    InvalidInput {
        /// Location being evaluated when the problem was found
        path: ScenePath,
        /// Human readable description
        reason: String,
    },

    /// An agent record exists but lacks a field required at this location.
    #[error("Missing pose data at {path}: no \"{field}\" found")]
    MissingPose {
        /// Location being evaluated when the problem was found
        path: ScenePath,
        /// Name of the missing record member
        field: &'static str,
    },

    /// The configured grouping mode is not one the generator knows.
    #[error("Unsupported grouping mode: {0}")]
    UnsupportedMode(i32),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// JSON parsing error while loading settings.
    #[error("Settings parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrowdError {
    pub(crate) fn invalid(path: &ScenePath, reason: impl Into<String>) -> Self {
        CrowdError::InvalidInput {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing_pose(path: &ScenePath, field: &'static str) -> Self {
        CrowdError::MissingPose {
            path: path.clone(),
            field,
        }
    }

    /// Returns `true` for the fatal input class, which includes
    /// [`CrowdError::MissingPose`] as a special case.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            CrowdError::InvalidInput { .. }
                | CrowdError::MissingPose { .. }
                | CrowdError::UnsupportedMode(_)
        )
    }

    /// The location the error was raised for, if any.
    #[must_use]
    pub fn path(&self) -> Option<&ScenePath> {
        match self {
            CrowdError::InvalidInput { path, .. } | CrowdError::MissingPose { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

/// Alias for `Result<T, CrowdError>`.
pub type Result<T> = std::result::Result<T, CrowdError>;
