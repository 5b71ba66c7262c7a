//! Slide thumbnail rendering

use super::fetcher::ImageFetcher;
use crate::error::Result;
use crate::slides::{PresentationService, Slide};
use std::path::{Path, PathBuf};

/// A slide thumbnail on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSlide {
    /// 1-based display number
    pub number: usize,
    /// `slide_<number>.png` inside the output folder
    pub path: PathBuf,
    /// False when the thumbnail download failed and `path` does not exist
    pub fetched: bool,
}

/// File name of a slide image
pub fn slide_image_name(number: usize) -> String {
    format!("slide_{}.png", number)
}

/// Download a thumbnail of every slide into `output_folder`, in slide order.
///
/// A failed download does not stop the loop; the slide is returned with
/// `fetched: false`. Errors from the presentation service are fatal.
pub async fn save_slides_as_images<S>(
    presentation_id: &str,
    slides: &[Slide],
    service: &S,
    fetcher: &ImageFetcher,
    output_folder: &Path,
) -> Result<Vec<RenderedSlide>>
where
    S: PresentationService + Sync,
{
    tokio::fs::create_dir_all(output_folder).await?;

    let mut rendered = Vec::with_capacity(slides.len());
    for (i, slide) in slides.iter().enumerate() {
        let number = i + 1;
        tracing::debug!(slide = number, slide_id = %slide.object_id, "Processing slide");

        let thumbnail = service
            .get_slide_thumbnail(presentation_id, &slide.object_id)
            .await?;

        let path = output_folder.join(slide_image_name(number));
        let outcome = fetcher.fetch(&thumbnail.content_url, &path).await?;
        if !outcome.is_saved() {
            tracing::warn!(slide = number, "Slide thumbnail missing, continuing");
        }

        rendered.push(RenderedSlide {
            number,
            path,
            fetched: outcome.is_saved(),
        });
    }

    Ok(rendered)
}
