//! Local materializer port.
//!
//! Runs an external download (optionally with audio transcoding) into a
//! fresh [`ScratchWorkspace`] and hands the produced file back together with
//! ownership of that workspace.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::delivery::FormatSelector;
use crate::domain::ScratchWorkspace;

/// Audio transcode target for extraction jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTranscode {
    pub codec: &'static str,
    pub bitrate_kbps: u32,
}

impl AudioTranscode {
    /// mp3 at 192 kbit/s.
    pub const MP3: Self = Self {
        codec: "mp3",
        bitrate_kbps: 192,
    };
}

/// One materialization job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeJob {
    pub source_url: String,
    pub selector: FormatSelector,
    pub transcode: Option<AudioTranscode>,
}

impl MaterializeJob {
    /// Plain download of the given selector.
    pub fn download(source_url: impl Into<String>, selector: FormatSelector) -> Self {
        Self {
            source_url: source_url.into(),
            selector,
            transcode: None,
        }
    }

    /// Best available audio, transcoded.
    pub fn extract_audio(source_url: impl Into<String>, transcode: AudioTranscode) -> Self {
        Self {
            source_url: source_url.into(),
            selector: FormatSelector::BestAudio,
            transcode: Some(transcode),
        }
    }
}

/// A file produced by a successful job.
///
/// Owns the workspace the file lives in; dropping this value deletes both.
#[derive(Debug)]
pub struct MaterializedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// MIME type sniffed from the produced file.
    pub content_type: String,
    pub workspace: ScratchWorkspace,
}

impl MaterializedFile {
    /// Extension of the produced file, if any.
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// Errors from local materialization.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The scratch workspace could not be created or scanned.
    #[error("Scratch workspace error: {0}")]
    Workspace(#[from] io::Error),

    /// The external job failed.
    #[error("Download job failed: {0}")]
    JobFailed(String),

    /// The job reported success but left no file behind.
    #[error("Download job produced no output file")]
    NoOutput,
}

/// Port for materializing media on local storage.
///
/// On any failure the workspace is destroyed before returning; on success
/// its ownership moves to the caller inside [`MaterializedFile`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaterializerPort: Send + Sync {
    async fn materialize(&self, job: MaterializeJob) -> Result<MaterializedFile, MaterializeError>;
}
