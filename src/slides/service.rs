//! Presentation API client

use super::model::{Presentation, Thumbnail};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::future::Future;
use url::Url;

/// Default endpoint of the presentation API
pub const DEFAULT_API_BASE_URL: &str = "https://slides.googleapis.com/v1/";

/// Remote presentation service the exporter reads from
pub trait PresentationService {
    /// Fetch a presentation's structure, slides in display order
    fn get_presentation(
        &self,
        presentation_id: &str,
    ) -> impl Future<Output = Result<Presentation>> + Send;

    /// Render a thumbnail of one slide and return where to download it
    fn get_slide_thumbnail(
        &self,
        presentation_id: &str,
        slide_id: &str,
    ) -> impl Future<Output = Result<Thumbnail>> + Send;
}

/// HTTP client for the presentation API
#[derive(Debug, Clone)]
pub struct SlidesApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl SlidesApiClient {
    /// Create a client against `base_url` with a default HTTP client
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(Error::HttpRequest)?;
        Self::with_client(http, base_url, credentials)
    }

    /// Create a client with a preconfigured HTTP client
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in the constructor
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(url = %url, "Presentation API request");

        let request = self.credentials.authorize(self.http.get(url)).await?;
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                reason: api_error_message(&body).unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl PresentationService for SlidesApiClient {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation> {
        let url = self.endpoint(&["presentations", presentation_id]);
        self.get_json(url).await
    }

    async fn get_slide_thumbnail(&self, presentation_id: &str, slide_id: &str) -> Result<Thumbnail> {
        let url = self.endpoint(&[
            "presentations",
            presentation_id,
            "pages",
            slide_id,
            "thumbnail",
        ]);
        self.get_json(url).await
    }
}

/// Pull `error.message` out of an API error body
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
