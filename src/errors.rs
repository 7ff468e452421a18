//! Error Types
//!
//! This module defines the error types used throughout the renderer.
//!
//! # Overview
//!
//! [`RenderError`] covers the failure modes that are surfaced to callers:
//! - Resource creation failures reported by the graphics core
//! - Out-of-range frame indices and render modes
//! - Invalid renderer settings
//!
//! Missing pipelines or textures are **not** errors. Passes that depend on an
//! asset which is not yet available skip themselves for the frame.
//!
//! # Usage
//!
//! ```rust,ignore
//! use deferred_renderer::errors::{RenderError, Result};
//!
//! fn build() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the deferred renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // GPU Resource Errors
    // ========================================================================
    /// The graphics core failed to create an object.
    ///
    /// Allocation failures are fatal for the renderer; they are propagated
    /// unchanged to the caller.
    #[error("Failed to create {kind} '{label}': {reason}")]
    ResourceCreation {
        /// Kind of object (image, buffer, descriptor set, ...)
        kind: &'static str,
        /// Debug label of the object
        label: String,
        /// Backend-provided reason
        reason: String,
    },

    // ========================================================================
    // Frame & Mode Errors
    // ========================================================================
    /// A frame index outside the range of allocated frame resource sets.
    #[error("Frame index {index} out of range (frames in flight: {count})")]
    FrameIndexOutOfRange {
        /// Requested frame index
        index: usize,
        /// Number of frame resource sets
        count: usize,
    },

    /// A render mode value that does not name any [`RenderMode`](crate::RenderMode).
    #[error("Invalid render mode: {0}")]
    InvalidRenderMode(u16),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Renderer settings rejected by validation.
    #[error("Invalid renderer settings: {0}")]
    InvalidSettings(String),
}

impl RenderError {
    /// Convenience constructor used by graphics-core implementations.
    #[must_use]
    pub fn resource_creation(
        kind: &'static str,
        label: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ResourceCreation {
            kind,
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
