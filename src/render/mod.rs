//! Slide image layer
//!
//! Downloads slide thumbnails and derives the letterboxed aspect-ratio
//! variants from them.

mod aspect;
mod fetcher;
mod renderer;

pub use aspect::{add_black_bars, add_black_bars_with_limit, AspectRatio, MAX_CANVAS_PIXELS};
pub use fetcher::{FetchOutcome, ImageFetcher, DEFAULT_MAX_DOWNLOAD_BYTES};
pub use renderer::{save_slides_as_images, slide_image_name, RenderedSlide};
