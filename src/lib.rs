//! Slides Export Server Library
//!
//! Converts a remote presentation into a portable zip bundle:
//! - one PNG thumbnail per slide
//! - 4:3 and 16:9 letterboxed variants of every thumbnail
//! - `slides_data.json` mapping `slide_<n>` to its images and speaker notes
//!
//! The bundle is produced by the `export_presentation` MCP tool.

pub mod auth;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod server;
pub mod slides;

pub use error::{Error, Result};
pub use pipeline::{create_archive, process_presentation, Manifest, PipelineOutput, SlideRecord};
pub use server::{
    run_server, run_server_with_config, ErrorResponse, ExportPresentationParams,
    ExportPresentationResult, ServerConfig, SlidesServer,
};
