//! Export manifest

use crate::error::Result;
use crate::render::AspectRatio;
use crate::slides::slide_key;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Artifacts and notes of one slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// Downloaded thumbnail
    pub original: String,
    /// Speaker notes, empty when the slide has none
    pub notes: String,
    /// Letterboxed 4:3 variant
    #[serde(rename = "4:3")]
    pub standard: String,
    /// Letterboxed 16:9 variant
    #[serde(rename = "16:9")]
    pub widescreen: String,
}

impl SlideRecord {
    /// Path of the variant for `ratio`
    pub fn variant(&self, ratio: AspectRatio) -> &str {
        match ratio {
            AspectRatio::Standard => &self.standard,
            AspectRatio::Widescreen => &self.widescreen,
        }
    }
}

/// Slide records of one export, in slide order.
///
/// Serializes as a JSON object keyed `slide_1..slide_n`, keys in slide order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    records: Vec<SlideRecord>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the record of the next slide and return its 1-based number
    pub fn push(&mut self, record: SlideRecord) -> usize {
        self.records.push(record);
        self.records.len()
    }

    /// Record of a 1-based slide number
    pub fn get(&self, number: usize) -> Option<&SlideRecord> {
        number.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(slide_<n>, record)` pairs in slide order
    pub fn entries(&self) -> impl Iterator<Item = (String, &SlideRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (slide_key(i + 1), record))
    }

    /// Human-readable JSON with four-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Write the manifest to `path`, replacing any previous file
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        tokio::fs::write(path, json).await?;
        tracing::debug!(path = %path.display(), slides = self.len(), "Saved manifest");
        Ok(())
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (key, record) in self.entries() {
            map.serialize_entry(&key, record)?;
        }
        map.end()
    }
}
