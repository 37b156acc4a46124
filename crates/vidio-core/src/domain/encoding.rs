//! Encoding descriptors and resolved media metadata.

use serde::Serialize;

/// Identifier of the synthetic on-demand mp3 transcode option.
pub const AUDIO_EXTRACT_ID: &str = "mp3";

/// One selectable quality/container/codec combination of a media source.
///
/// Field names on the wire follow the format list clients already consume
/// (`format_id`, `ext`, `resolution`, ...). The direct media URL is kept for
/// the orchestrator and never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingDescriptor {
    /// Identifier, unique within one resolution response.
    #[serde(rename = "format_id")]
    pub id: String,
    /// Container / file extension (e.g. `mp4`, `webm`, `m4a`).
    #[serde(rename = "ext")]
    pub container: String,
    /// Human-readable label (`720p`, `audio only`, ...).
    #[serde(rename = "resolution")]
    pub resolution_label: String,
    #[serde(rename = "height")]
    pub height_px: Option<u32>,
    /// Exact or approximate size as reported by the resolver.
    #[serde(rename = "filesize")]
    pub approx_size_bytes: Option<u64>,
    pub format_note: Option<String>,
    pub has_audio: bool,
    pub audio_only: bool,
    pub language: Option<String>,
    /// Pre-resolved URL serving raw media bytes, when the resolver has one.
    #[serde(skip)]
    pub direct_url: Option<String>,
}

impl EncodingDescriptor {
    /// The synthetic descriptor representing an on-demand mp3 transcode.
    pub fn audio_extract() -> Self {
        Self {
            id: AUDIO_EXTRACT_ID.to_string(),
            container: "mp3".to_string(),
            resolution_label: "audio".to_string(),
            height_px: None,
            approx_size_bytes: None,
            format_note: Some("Converted to MP3 (ffmpeg required)".to_string()),
            has_audio: true,
            audio_only: true,
            language: None,
            direct_url: None,
        }
    }

    /// Whether this is the synthetic transcode option rather than a real stream.
    pub fn is_audio_extract(&self) -> bool {
        self.id == AUDIO_EXTRACT_ID
    }
}

/// Metadata returned by the resolver for one source URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub uploader: Option<String>,
    pub formats: Vec<EncodingDescriptor>,
}

impl MediaInfo {
    /// Look up a real descriptor by id.
    pub fn find(&self, id: &str) -> Option<&EncodingDescriptor> {
        self.formats.iter().find(|f| f.id == id)
    }

    /// True if at least one real (non-synthetic) descriptor carries audio.
    pub fn has_audio(&self) -> bool {
        self.formats
            .iter()
            .any(|f| f.has_audio && !f.is_audio_extract())
    }

    /// Append the synthetic mp3 option when any real descriptor has audio.
    ///
    /// Idempotent: never produces a second `mp3` entry.
    #[must_use]
    pub fn with_audio_extract_option(mut self) -> Self {
        let already_present = self.formats.iter().any(EncodingDescriptor::is_audio_extract);
        if self.has_audio() && !already_present {
            self.formats.push(EncodingDescriptor::audio_extract());
        }
        self
    }
}
