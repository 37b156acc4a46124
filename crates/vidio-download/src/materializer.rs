//! yt-dlp backed local materializer.
//!
//! Each job gets its own [`ScratchWorkspace`]. On success the workspace
//! travels with the [`MaterializedFile`]; on any failure it is released
//! before the error is returned.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};
use vidio_core::{
    FormatSelector, MaterializeError, MaterializeJob, MaterializedFile, MaterializerPort,
    ScratchWorkspace,
};

use crate::ytdlp::YtDlp;

/// yt-dlp output template, relative to the workspace.
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Format expression for audio extraction.
const BEST_AUDIO: &str = "bestaudio/best";

/// Leftovers of an interrupted or in-progress download.
const PARTIAL_SUFFIXES: &[&str] = &["part", "ytdl", "temp"];

/// [`MaterializerPort`] implementation backed by yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpMaterializer {
    ytdlp: YtDlp,
    scratch_root: Option<PathBuf>,
}

impl YtDlpMaterializer {
    pub fn new(ytdlp: YtDlp) -> Self {
        Self {
            ytdlp,
            scratch_root: None,
        }
    }

    /// Create workspaces under `root` instead of the system temp dir.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn create_workspace(&self) -> Result<ScratchWorkspace, MaterializeError> {
        let workspace = match &self.scratch_root {
            Some(root) => ScratchWorkspace::create_in(root)?,
            None => ScratchWorkspace::create()?,
        };
        Ok(workspace)
    }
}

/// Command line for one job, writing into `workspace`.
pub(crate) fn job_args(job: &MaterializeJob, workspace: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--no-playlist".into(),
        "--no-progress".into(),
        "-o".into(),
        workspace.join(OUTPUT_TEMPLATE).into_os_string(),
        "-f".into(),
    ];

    match &job.selector {
        FormatSelector::Encoding(id) => args.push(id.into()),
        FormatSelector::BestAudio => args.push(BEST_AUDIO.into()),
    }

    if let Some(transcode) = job.transcode {
        args.extend([
            "-x".into(),
            "--audio-format".into(),
            transcode.codec.into(),
            "--audio-quality".into(),
            format!("{}K", transcode.bitrate_kbps).into(),
        ]);
    }

    args.push("--".into());
    args.push(job.source_url.as_str().into());
    args
}

fn is_partial(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PARTIAL_SUFFIXES.contains(&e))
}

/// Locate the produced file, depth first.
///
/// When `preferred_ext` is given a file with that extension wins over the
/// first file found (yt-dlp may leave the pre-conversion source behind).
pub(crate) async fn find_output(
    root: &Path,
    preferred_ext: Option<&str>,
) -> std::io::Result<Option<PathBuf>> {
    let mut stack = vec![root.to_path_buf()];
    let mut first = None;

    while let Some(dir) = stack.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.path());
        }
        names.sort();

        for path in names {
            let file_type = tokio::fs::metadata(&path).await?;
            if file_type.is_dir() {
                stack.push(path);
                continue;
            }
            if is_partial(&path) {
                continue;
            }
            let matches_preferred = preferred_ext.is_some_and(|ext| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(ext))
            });
            if matches_preferred {
                return Ok(Some(path));
            }
            if first.is_none() {
                first = Some(path);
            }
        }
    }

    Ok(first)
}

/// Sniffed MIME type of a produced file.
pub(crate) fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[async_trait]
impl MaterializerPort for YtDlpMaterializer {
    async fn materialize(&self, job: MaterializeJob) -> Result<MaterializedFile, MaterializeError> {
        let mut workspace = self.create_workspace()?;
        let args = job_args(&job, workspace.path());

        if let Err(e) = self.ytdlp.run(args, None).await {
            warn!(source = %job.source_url, error = %e, "yt-dlp download failed");
            workspace.release();
            return Err(MaterializeError::JobFailed(e.to_string()));
        }

        let preferred = job.transcode.map(|t| t.codec);
        let path = match find_output(workspace.path(), preferred).await {
            Ok(Some(path)) => path,
            Ok(None) => {
                workspace.release();
                return Err(MaterializeError::NoOutput);
            }
            Err(e) => {
                workspace.release();
                return Err(MaterializeError::Workspace(e));
            }
        };

        let size_bytes = match tokio::fs::metadata(&path).await {
            Ok(meta) => meta.len(),
            Err(e) => {
                workspace.release();
                return Err(MaterializeError::Workspace(e));
            }
        };

        debug!(path = %path.display(), bytes = size_bytes, "Materialized media");
        Ok(MaterializedFile {
            content_type: content_type_for(&path),
            path,
            size_bytes,
            workspace,
        })
    }
}
