//! Export pipeline
//!
//! Fetches a presentation, downloads one thumbnail per slide, extracts
//! speaker notes, letterboxes every thumbnail to 4:3 and 16:9 and writes the
//! manifest. The bundle step zips the resulting directory.
//!
//! A run replaces only its own artifacts in the output directory (slide
//! images, ratio variants and the manifest); other files there are left in
//! place. Callers serialize runs that share a directory.

mod bundle;
mod manifest;

pub use bundle::{
    archive_path_for, create_archive, resolve_output_dir, ARCHIVE_DOWNLOAD_NAME,
    ARCHIVE_MIME_TYPE,
};
pub use manifest::{Manifest, SlideRecord};

use crate::error::{Error, Result};
use crate::render::{add_black_bars, save_slides_as_images, AspectRatio, ImageFetcher};
use crate::slides::{extract_speaker_notes, slide_key, PresentationService};
use std::path::{Path, PathBuf};
use tracing::Instrument;
use uuid::Uuid;

/// Name of the manifest file inside the output directory
pub const MANIFEST_FILE_NAME: &str = "slides_data.json";

/// Directory layout of one export run
#[derive(Debug, Clone)]
pub struct RunLayout {
    base: PathBuf,
}

impl RunLayout {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base: base.into() }
    }

    /// Directory holding the original thumbnails and the manifest
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory holding the variants for `ratio`
    pub fn ratio_dir(&self, ratio: AspectRatio) -> PathBuf {
        self.base.join(ratio.folder_name())
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.base.join(MANIFEST_FILE_NAME)
    }

    /// Create the base and ratio directories, removing slide images and the
    /// manifest left by a previous run. Unrelated files are kept.
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.base).await?;

        let mut stale = slide_images(&self.base)?;
        for ratio in AspectRatio::ALL {
            let dir = self.ratio_dir(ratio);
            tokio::fs::create_dir_all(&dir).await?;
            stale.extend(slide_images(&dir)?);
        }
        stale.push(self.manifest_path());

        let mut removed = 0usize;
        for path in stale {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::Io(e)),
            }
        }
        if removed > 0 {
            tracing::debug!(path = %self.base.display(), removed, "Cleared previous output");
        }
        Ok(())
    }
}

/// `slide_*.png` files directly inside `dir`
fn slide_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/slide_*.png", glob::Pattern::escape(&dir.to_string_lossy()));
    let paths = glob::glob(&pattern).map_err(|e| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid slide pattern: {}", e),
        ))
    })?;

    Ok(paths.filter_map(|p| p.ok()).filter(|p| p.is_file()).collect())
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub run_id: Uuid,
    pub presentation_id: String,
    pub base_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
}

/// Export `presentation_id` into `output_dir`.
///
/// Any failure is logged once here and returned as [`Error::Processing`]
/// carrying the original message. Files written before the failure stay on
/// disk.
pub async fn process_presentation<S>(
    service: &S,
    fetcher: &ImageFetcher,
    presentation_id: &str,
    output_dir: &Path,
) -> Result<PipelineOutput>
where
    S: PresentationService + Sync,
{
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("export", %run_id, presentation_id);

    async move {
        tracing::debug!("Starting process for presentation");

        match run(service, fetcher, presentation_id, output_dir).await {
            Ok((layout, manifest)) => Ok(PipelineOutput {
                run_id,
                presentation_id: presentation_id.to_string(),
                base_dir: layout.base().to_path_buf(),
                manifest_path: layout.manifest_path(),
                manifest,
            }),
            Err(e) => {
                tracing::error!(error = ?e, "An error occurred in process_presentation");
                Err(Error::Processing {
                    message: e.to_string(),
                })
            }
        }
    }
    .instrument(span)
    .await
}

async fn run<S>(
    service: &S,
    fetcher: &ImageFetcher,
    presentation_id: &str,
    output_dir: &Path,
) -> Result<(RunLayout, Manifest)>
where
    S: PresentationService + Sync,
{
    let layout = RunLayout::new(resolve_output_dir(output_dir)?);
    let presentation = service.get_presentation(presentation_id).await?;
    let slides = presentation.slides;
    tracing::debug!(slides = slides.len(), "Retrieved presentation");

    layout.prepare().await?;

    let rendered =
        save_slides_as_images(presentation_id, &slides, service, fetcher, layout.base()).await?;
    let mut notes = extract_speaker_notes(&slides);

    let mut manifest = Manifest::new();
    for slide in rendered {
        if !slide.fetched {
            return Err(Error::SlideImageMissing {
                slide: slide.number,
                path: slide.path.display().to_string(),
            });
        }

        let standard = normalize(&slide.path, &layout, AspectRatio::Standard).await?;
        let widescreen = normalize(&slide.path, &layout, AspectRatio::Widescreen).await?;

        manifest.push(SlideRecord {
            original: slide.path.display().to_string(),
            notes: notes.remove(&slide_key(slide.number)).unwrap_or_default(),
            standard: standard.display().to_string(),
            widescreen: widescreen.display().to_string(),
        });
    }

    let manifest_path = layout.manifest_path();
    manifest.write(&manifest_path).await?;

    Ok((layout, manifest))
}

/// Letterbox one image off the async runtime
async fn normalize(image_path: &Path, layout: &RunLayout, ratio: AspectRatio) -> Result<PathBuf> {
    let image_path = image_path.to_path_buf();
    let folder = layout.ratio_dir(ratio);

    tokio::task::spawn_blocking(move || add_black_bars(&image_path, &folder, ratio.tag()))
        .await
        .map_err(|e| Error::Task {
            reason: format!("Task join error: {}", e),
        })?
}
