//! Presentation service layer
//!
//! Data model of the presentation API, the HTTP client that talks to it, and
//! speaker note extraction.

mod model;
mod notes;
mod service;

pub use model::{
    NotesPage, PageElement, Presentation, Shape, Slide, SlideProperties, TextContent, TextElement,
    TextRun, Thumbnail,
};
pub use notes::{extract_speaker_notes, slide_key, slide_notes_text};
pub use service::{PresentationService, SlidesApiClient, DEFAULT_API_BASE_URL};
