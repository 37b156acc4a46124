//! yt-dlp backed metadata resolver.
//!
//! Runs `yt-dlp -J --no-playlist -- <url>` and validates the JSON dump once,
//! here, into fixed-shape [`MediaInfo`] values.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use vidio_core::{EncodingDescriptor, MediaInfo, MetadataResolverPort, ResolveError};

use crate::ytdlp::{YtDlp, YtDlpError};

/// Time budget for one metadata dump.
pub const RESOLVE_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// Raw yt-dlp output
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawInfo {
    title: Option<String>,
    thumbnail: Option<String>,
    uploader: Option<String>,
    #[serde(default)]
    formats: Vec<RawFormat>,
}

#[derive(Debug, Deserialize)]
struct RawFormat {
    format_id: Option<String>,
    format: Option<String>,
    ext: Option<String>,
    height: Option<u32>,
    filesize: Option<u64>,
    filesize_approx: Option<u64>,
    format_note: Option<String>,
    acodec: Option<String>,
    vcodec: Option<String>,
    language: Option<String>,
    url: Option<String>,
}

impl RawFormat {
    fn resolution_label(&self) -> String {
        if let Some(height) = self.height.filter(|h| *h > 0) {
            return format!("{height}p");
        }
        non_empty(self.format_note.as_deref())
            .or_else(|| non_empty(self.format.as_deref()))
            .unwrap_or_default()
            .to_string()
    }

    fn into_descriptor(self) -> Option<EncodingDescriptor> {
        let id = non_empty(self.format_id.as_deref())?.to_string();
        let has_audio = is_codec(self.acodec.as_deref());
        let audio_only = has_audio && !is_codec(self.vcodec.as_deref());

        Some(EncodingDescriptor {
            resolution_label: self.resolution_label(),
            container: self.ext.unwrap_or_default(),
            height_px: self.height,
            approx_size_bytes: self.filesize.or(self.filesize_approx),
            format_note: self.format_note,
            has_audio,
            audio_only,
            language: self.language.filter(|l| !l.is_empty()),
            direct_url: self.url.filter(|u| !u.is_empty()),
            id,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// yt-dlp reports a missing stream as the codec `"none"`.
fn is_codec(codec: Option<&str>) -> bool {
    matches!(codec, Some(c) if !c.is_empty() && c != "none")
}

/// Parse a `yt-dlp -J` dump.
///
/// Formats without an id are dropped; a dump with no usable formats is
/// [`ResolveError::NoFormats`].
pub fn parse_media_info(json: &[u8]) -> Result<MediaInfo, ResolveError> {
    let raw: RawInfo =
        serde_json::from_slice(json).map_err(|e| ResolveError::Malformed(e.to_string()))?;

    let formats: Vec<EncodingDescriptor> = raw
        .formats
        .into_iter()
        .filter_map(RawFormat::into_descriptor)
        .collect();

    if formats.is_empty() {
        return Err(ResolveError::NoFormats);
    }

    Ok(MediaInfo {
        title: raw.title,
        thumbnail: raw.thumbnail,
        uploader: raw.uploader,
        formats,
    })
}

// ============================================================================
// Port implementation
// ============================================================================

/// [`MetadataResolverPort`] implementation backed by yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    ytdlp: YtDlp,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(ytdlp: YtDlp) -> Self {
        Self {
            ytdlp,
            timeout: RESOLVE_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MetadataResolverPort for YtDlpResolver {
    async fn resolve(&self, source_url: &str) -> Result<MediaInfo, ResolveError> {
        let args = vec![
            "-J".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--".into(),
            source_url.into(),
        ];

        let stdout = self
            .ytdlp
            .run(args, Some(self.timeout))
            .await
            .map_err(|e| match e {
                YtDlpError::Failed(reason) => ResolveError::Unsupported(reason),
                YtDlpError::Timeout(limit) => ResolveError::Timeout(limit),
                other @ (YtDlpError::NotFound(_) | YtDlpError::Spawn(_)) => {
                    ResolveError::Unavailable(other.to_string())
                }
            })?;

        let info = parse_media_info(&stdout)?;
        debug!(source = source_url, formats = info.formats.len(), "yt-dlp resolved source");
        Ok(info)
    }
}
