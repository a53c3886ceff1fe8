//! ReelForge Library
//!
//! Renders storyboard plans into vertical short-form MP4 videos: one slide per
//! beat, one encoded clip per slide, then a lossless concat of all clips.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod slides;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{Plan, PlanStyle, RenderPhase, Segment, StatusEntry};
pub use error::{RenderError, RenderResult};
