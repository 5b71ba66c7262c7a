//! Error types for the slides export server

use thiserror::Error;

/// Result type alias for the slides export server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the slides export server
#[derive(Error, Debug)]
pub enum Error {
    /// No presentation id in the request
    #[error("No presentation_id provided")]
    MissingPresentationId,

    /// Aspect ratio tag other than "4:3" or "16:9"
    #[error("Unsupported aspect ratio: {ratio}")]
    UnsupportedAspectRatio { ratio: String },

    /// Rendered slide image absent on disk (thumbnail fetch failed earlier)
    #[error("Image for slide {slide} not found: {path}")]
    SlideImageMissing { slide: usize, path: String },

    /// Image decode or encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Presentation API returned a non-success status
    #[error("Presentation API error ({status}): {reason}")]
    Api { status: u16, reason: String },

    /// Credentials file does not exist
    #[error("Credentials file not found: {path}")]
    CredentialsNotFound { path: String },

    /// Credentials file could not be used
    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    /// Access token could not be obtained for a service account
    #[error("Authorization failed: {reason}")]
    Authorization { reason: String },

    /// Output directory that names no folder of its own (`/`, `..`)
    #[error("Invalid output directory: {path}")]
    InvalidOutputDir { path: String },

    /// Letterboxed canvas would exceed the configured pixel limit
    #[error("Image dimensions exceed limit: {detail}")]
    ImageDimensionExceeded { detail: String },

    /// Download body larger than the configured limit
    #[error("Download too large: {size} bytes exceeds limit of {max_size} bytes")]
    DownloadTooLarge { size: u64, max_size: u64 },

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Zip archive error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Background task failed to complete
    #[error("Task error: {reason}")]
    Task { reason: String },

    /// Any failure inside the export pipeline, with the original message attached
    #[error("An error occurred: {message}")]
    Processing { message: String },

    /// Archive file absent after the bundle step
    #[error("Failed to create ZIP file: {path}")]
    ArchiveMissing { path: String },
}

impl Error {
    /// Return a message safe to send to clients.
    /// Pipeline failures keep the original message, matching what the caller sees
    /// from the export tool; transport and library details are dropped elsewhere.
    pub fn client_message(&self) -> String {
        match self {
            Error::MissingPresentationId => "No presentation_id provided".to_string(),
            Error::UnsupportedAspectRatio { ratio } => {
                format!("Unsupported aspect ratio: {}", ratio)
            }
            Error::SlideImageMissing { slide, .. } => {
                format!("Image for slide {} not found", slide)
            }
            Error::Image(_) => "Image processing error".to_string(),
            Error::Api { status, .. } => format!("Presentation API error ({})", status),
            Error::CredentialsNotFound { .. } => "Credentials not found".to_string(),
            Error::InvalidCredentials { .. } => "Invalid credentials".to_string(),
            Error::Authorization { .. } => "Authorization failed".to_string(),
            Error::InvalidOutputDir { .. } => "Invalid output directory".to_string(),
            Error::ImageDimensionExceeded { detail } => {
                format!("Image dimensions exceed limit: {}", detail)
            }
            Error::DownloadTooLarge { size, max_size } => format!(
                "Download too large: {} bytes exceeds limit of {} bytes",
                size, max_size
            ),
            Error::HttpRequest(_) => "HTTP request failed".to_string(),
            Error::InvalidUrl(_) => "Invalid URL".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
            Error::Zip(_) => "Archive error".to_string(),
            Error::Task { .. } => "Internal error".to_string(),
            Error::Processing { message } => format!("An error occurred: {}", message),
            Error::ArchiveMissing { .. } => "Failed to create ZIP file".to_string(),
        }
    }

    /// HTTP-style status signal: 400 for bad client input, 500 otherwise
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingPresentationId => 400,
            _ => 500,
        }
    }
}
