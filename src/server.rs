//! MCP Server implementation using rmcp

use crate::auth::{Credentials, SCOPES};
use crate::error::Error;
use crate::pipeline::{
    create_archive, process_presentation, ARCHIVE_DOWNLOAD_NAME, ARCHIVE_MIME_TYPE,
};
use crate::render::{ImageFetcher, DEFAULT_MAX_DOWNLOAD_BYTES};
use crate::slides::{SlidesApiClient, DEFAULT_API_BASE_URL};
use anyhow::Result;
use base64::Engine;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Runtime configuration for the slides export server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Working directory of an export run; its slide images and manifest are
    /// replaced on every run (default: ./Slides)
    pub output_dir: PathBuf,
    /// Service-account key file, or JSON with an `access_token` or `api_key`
    /// (default: credentials.json)
    pub credentials_path: PathBuf,
    /// Presentation API endpoint
    pub api_base_url: String,
    /// Timeout for thumbnail downloads (default: none)
    pub download_timeout: Option<Duration>,
    /// Maximum size of a single thumbnail download (default: 100MB)
    pub max_download_bytes: u64,
    /// Inline the archive as base64 in responses unless the request says otherwise
    pub inline_archive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            output_dir: cwd.join("Slides"),
            credentials_path: PathBuf::from("credentials.json"),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_timeout: None,
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            inline_archive: false,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `SLIDES_*` environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("SLIDES_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(path) = lookup("SLIDES_CREDENTIALS_FILE") {
            config.credentials_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("SLIDES_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(secs) = lookup("SLIDES_DOWNLOAD_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(0) => config.download_timeout = None,
                Ok(secs) => config.download_timeout = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(value = %secs, "Ignoring invalid SLIDES_DOWNLOAD_TIMEOUT_SECS"),
            }
        }
        if let Some(bytes) = lookup("SLIDES_MAX_DOWNLOAD_BYTES") {
            match bytes.trim().parse::<u64>() {
                Ok(bytes) if bytes > 0 => config.max_download_bytes = bytes,
                _ => tracing::warn!(value = %bytes, "Ignoring invalid SLIDES_MAX_DOWNLOAD_BYTES"),
            }
        }
        if let Some(flag) = lookup("SLIDES_INLINE_ARCHIVE") {
            config.inline_archive = matches!(flag.trim(), "1" | "true" | "yes");
        }

        config
    }
}

/// Slides export MCP server
#[derive(Clone)]
pub struct SlidesServer {
    service: Arc<SlidesApiClient>,
    fetcher: Arc<ImageFetcher>,
    /// Runs share the output directory, so only one may execute at a time
    run_lock: Arc<Mutex<()>>,
    tool_router: ToolRouter<Self>,
    config: Arc<ServerConfig>,
}

// ============================================================================
// Request/Response types for export_presentation
// ============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExportPresentationParams {
    /// Identifier of the presentation to export
    #[serde(default)]
    pub presentation_id: Option<String>,
    /// Include the archive content (base64) in the response
    #[serde(default)]
    pub include_archive_data: Option<bool>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ExportPresentationResult {
    pub presentation_id: String,
    /// Identifier of this export run (appears in logs)
    pub run_id: String,
    /// Location of the zip bundle on the server
    pub archive_path: String,
    /// Download name of the bundle
    pub file_name: String,
    pub mime_type: String,
    pub archive_size: u64,
    pub manifest_path: String,
    pub slide_count: u32,
    /// Completion time (RFC 3339)
    pub completed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_base64: Option<String>,
}

/// Error body shared by input and processing failures
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// 400 for invalid input, 500 for processing or archive failures
    pub status: u16,
}

impl From<&Error> for ErrorResponse {
    fn from(e: &Error) -> Self {
        Self {
            error: e.client_message(),
            status: e.status_code(),
        }
    }
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl SlidesServer {
    /// Create a server from configuration, loading credentials once
    pub fn try_with_config(config: ServerConfig) -> crate::error::Result<Self> {
        let credentials = Credentials::from_file(&config.credentials_path)?;
        tracing::info!(
            path = %config.credentials_path.display(),
            scopes = ?SCOPES,
            "Loaded credentials"
        );

        let service = SlidesApiClient::new(&config.api_base_url, credentials)?;
        let fetcher = ImageFetcher::new(config.download_timeout)?
            .with_max_download_bytes(config.max_download_bytes);
        Ok(Self::with_parts(config, service, fetcher))
    }

    /// Create a server from already constructed collaborators
    pub fn with_parts(config: ServerConfig, service: SlidesApiClient, fetcher: ImageFetcher) -> Self {
        Self {
            service: Arc::new(service),
            fetcher: Arc::new(fetcher),
            run_lock: Arc::new(Mutex::new(())),
            tool_router: Self::tool_router(),
            config: Arc::new(config),
        }
    }

    /// Export a presentation as a zip bundle
    #[tool(
        description = "Export a presentation as a zip bundle: one PNG per slide, 4:3 and 16:9 letterboxed variants, and slides_data.json mapping slide_<n> to its images and speaker notes.

Returns the archive location (download name slides_data.zip). Set include_archive_data to receive the archive as base64.
Errors are returned as {\"error\": \"...\", \"status\": 400|500}."
    )]
    async fn export_presentation(
        &self,
        Parameters(params): Parameters<ExportPresentationParams>,
    ) -> String {
        match self.process_export(&params).await {
            Ok(result) => serde_json::to_string_pretty(&result).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "export_presentation failed");
                serde_json::to_string_pretty(&ErrorResponse::from(&e)).unwrap_or_default()
            }
        }
    }
}

impl SlidesServer {
    pub async fn process_export(
        &self,
        params: &ExportPresentationParams,
    ) -> crate::error::Result<ExportPresentationResult> {
        let presentation_id = params
            .presentation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingPresentationId)?;

        let _run = self.run_lock.lock().await;

        let output = process_presentation(
            self.service.as_ref(),
            self.fetcher.as_ref(),
            presentation_id,
            &self.config.output_dir,
        )
        .await?;

        let base_dir = output.base_dir.clone();
        let archive_path = tokio::task::spawn_blocking(move || create_archive(&base_dir))
            .await
            .map_err(|e| Error::Task {
                reason: format!("Task join error: {}", e),
            })??;
        let archive_size = tokio::fs::metadata(&archive_path).await?.len();
        tracing::debug!(archive = %archive_path.display(), bytes = archive_size, "Archive ready");

        let include_data = params
            .include_archive_data
            .unwrap_or(self.config.inline_archive);
        let data_base64 = if include_data {
            let data = tokio::fs::read(&archive_path).await?;
            Some(base64::engine::general_purpose::STANDARD.encode(data))
        } else {
            None
        };

        Ok(ExportPresentationResult {
            presentation_id: output.presentation_id,
            run_id: output.run_id.to_string(),
            archive_path: archive_path.display().to_string(),
            file_name: ARCHIVE_DOWNLOAD_NAME.to_string(),
            mime_type: ARCHIVE_MIME_TYPE.to_string(),
            archive_size,
            manifest_path: output.manifest_path.display().to_string(),
            slide_count: output.manifest.len() as u32,
            completed_at: chrono::Utc::now().to_rfc3339(),
            data_base64,
        })
    }
}

#[tool_handler]
impl ServerHandler for SlidesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Slides export server converts a presentation into a zip bundle of slide images, \
                 letterboxed 4:3 and 16:9 variants and speaker notes."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server with configuration from the environment
pub async fn run_server() -> Result<()> {
    run_server_with_config(ServerConfig::from_env()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let server = SlidesServer::try_with_config(config)?;

    tracing::info!("Slides export server ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
