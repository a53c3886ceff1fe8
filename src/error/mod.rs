//! Error handling module for ReelForge

use thiserror::Error;

use crate::domain::errors::DomainError;
use crate::slides::SlideRenderError;

/// Main error type for render pipeline operations
#[derive(Error, Debug)]
pub enum RenderError {
    /// Codec engine failed to initialize; the caller may retry
    #[error("Failed to load encoder: {message}")]
    EncoderLoad { message: String },

    /// Slide surface or image encode failure
    #[error("Failed to render slide {index}: {source}")]
    SlideRender {
        index: usize,
        #[source]
        source: SlideRenderError,
    },

    /// Engine invocation failed for one segment
    #[error("Failed to encode segment {index}: {message}")]
    SegmentEncode { index: usize, message: String },

    /// Concatenation of the segment clips failed
    #[error("Failed to stitch timeline: {message}")]
    Stitch { message: String },

    /// Output could not be read back after a successful stitch
    #[error("Failed to read rendered output: {message}")]
    OutputRead { message: String },

    /// Render requested before any plan was accepted
    #[error("No storyboard available; generate a plan first")]
    NoPlan,

    /// Render requested before the encoder finished loading
    #[error("Encoder is not loaded yet")]
    EncoderNotReady,

    /// Another render currently owns the engine
    #[error("A render is already in progress")]
    RenderBusy,

    /// Plan failed validation
    #[error("Invalid plan: {0}")]
    InvalidPlan(DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RenderError {
    /// True for rejections that leave the orchestrator state untouched
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RenderError::NoPlan
                | RenderError::EncoderNotReady
                | RenderError::RenderBusy
                | RenderError::InvalidPlan(_)
        )
    }
}

/// Result type alias for render operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;
