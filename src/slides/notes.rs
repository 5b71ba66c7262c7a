//! Speaker note extraction

use super::model::Slide;
use std::collections::HashMap;

/// Manifest key for a 1-based slide number
pub fn slide_key(number: usize) -> String {
    format!("slide_{}", number)
}

/// Plain text of a slide's speaker notes.
///
/// Concatenates the content of every text run in every shape on the notes
/// page, in document order. Missing structure at any level yields an empty
/// string.
pub fn slide_notes_text(slide: &Slide) -> String {
    let Some(notes_page) = slide
        .slide_properties
        .as_ref()
        .and_then(|props| props.notes_page.as_ref())
    else {
        return String::new();
    };

    notes_page
        .page_elements
        .iter()
        .filter_map(|element| element.shape.as_ref()?.text.as_ref())
        .flat_map(|text| text.text_elements.iter())
        .filter_map(|te| te.text_run.as_ref())
        .map(|run| run.content.as_str())
        .collect()
}

/// Speaker notes for every slide, keyed `slide_1..slide_n`.
/// Slides without notes map to an empty string.
pub fn extract_speaker_notes(slides: &[Slide]) -> HashMap<String, String> {
    slides
        .iter()
        .enumerate()
        .map(|(i, slide)| {
            let text = slide_notes_text(slide);
            tracing::debug!(slide = i + 1, chars = text.len(), "Extracted speaker notes");
            (slide_key(i + 1), text)
        })
        .collect()
}
