//! In-process fake ports and a router builder wired to them.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use tempfile::TempDir;
use vidio_axum::{AxumContext, create_router, rate_limiter_for};
use vidio_core::{
    DownloadOrchestrator, EncodingDescriptor, FetchError, ForwardedHeaders, MaterializeError,
    MaterializeJob, MaterializedFile, MaterializerPort, MediaInfo, MetadataResolverPort,
    RateLimiterPort, RemoteFetcherPort, RemoteResponse, ResolveError, ScratchWorkspace,
    ServiceSettings,
};

pub const SOURCE: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const DIRECT_BODY: &[u8] = b"direct media bytes";
pub const LOCAL_BODY: &[u8] = b"locally materialized media";

fn descriptor(id: &str, ext: &str, has_audio: bool, direct_url: Option<&str>) -> EncodingDescriptor {
    EncodingDescriptor {
        id: id.to_string(),
        container: ext.to_string(),
        resolution_label: "360p".to_string(),
        height_px: Some(360),
        approx_size_bytes: Some(1024),
        format_note: None,
        has_audio,
        audio_only: false,
        language: None,
        direct_url: direct_url.map(str::to_string),
    }
}

/// Two encodings: `18` with a direct URL, `137` without.
pub fn sample_info() -> MediaInfo {
    MediaInfo {
        title: Some("Test Clip".to_string()),
        thumbnail: Some("https://i.example/thumb.jpg".to_string()),
        uploader: Some("Uploader".to_string()),
        formats: vec![
            descriptor("18", "mp4", true, Some("https://cdn.example/18")),
            descriptor("137", "mp4", false, None),
        ],
    }
}

pub struct FakeResolver {
    pub info: Option<MediaInfo>,
}

#[async_trait]
impl MetadataResolverPort for FakeResolver {
    async fn resolve(&self, _source_url: &str) -> Result<MediaInfo, ResolveError> {
        self.info
            .clone()
            .ok_or_else(|| ResolveError::Unsupported("Unsupported URL".to_string()))
    }
}

/// What the fake remote server answers.
#[derive(Debug, Clone, Copy)]
pub enum RemoteMode {
    /// 200, or 206 when a Range is forwarded.
    Media,
    /// 403 with an HTML error page.
    Forbidden,
    /// Connection failure.
    Unreachable,
}

pub struct FakeFetcher {
    pub mode: RemoteMode,
    pub calls: AtomicUsize,
    pub last_headers: Mutex<Option<ForwardedHeaders>>,
}

#[async_trait]
impl RemoteFetcherPort for FakeFetcher {
    async fn fetch(
        &self,
        _url: &str,
        headers: &ForwardedHeaders,
    ) -> Result<RemoteResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_headers.lock().unwrap() = Some(headers.clone());

        let body = |bytes: &'static [u8]| -> vidio_core::ByteStream {
            Box::pin(futures_util::stream::iter(vec![Ok(Bytes::from_static(bytes))]))
        };

        match self.mode {
            RemoteMode::Media if headers.range.is_some() => Ok(RemoteResponse {
                status: 206,
                content_type: Some("video/mp4".to_string()),
                content_length: Some(4),
                content_range: Some(format!("bytes 0-3/{}", DIRECT_BODY.len())),
                accept_ranges: Some("bytes".to_string()),
                body: body(&DIRECT_BODY[..4]),
            }),
            RemoteMode::Media => Ok(RemoteResponse {
                status: 200,
                content_type: Some("video/mp4".to_string()),
                content_length: Some(DIRECT_BODY.len() as u64),
                content_range: None,
                accept_ranges: Some("bytes".to_string()),
                body: body(DIRECT_BODY),
            }),
            RemoteMode::Forbidden => Ok(RemoteResponse {
                status: 403,
                content_type: Some("text/html; charset=utf-8".to_string()),
                content_length: None,
                content_range: None,
                accept_ranges: None,
                body: body(b"<html>Forbidden</html>"),
            }),
            RemoteMode::Unreachable => Err(FetchError::Request("connection refused".to_string())),
        }
    }
}

/// Writes a file into a fresh workspace under `root`, or fails.
pub struct FakeMaterializer {
    pub root: PathBuf,
    pub fail: bool,
    pub jobs: Mutex<Vec<MaterializeJob>>,
}

#[async_trait]
impl MaterializerPort for FakeMaterializer {
    async fn materialize(&self, job: MaterializeJob) -> Result<MaterializedFile, MaterializeError> {
        self.jobs.lock().unwrap().push(job.clone());

        let workspace = ScratchWorkspace::create_in(&self.root)?;
        if self.fail {
            return Err(MaterializeError::JobFailed(
                "ERROR: Requested format is not available".to_string(),
            ));
        }

        let (name, content_type) = if job.transcode.is_some() {
            ("clip.mp3", "audio/mpeg")
        } else {
            ("clip.webm", "video/webm")
        };
        let path = workspace.path().join(name);
        std::fs::write(&path, LOCAL_BODY)?;

        Ok(MaterializedFile {
            path,
            size_bytes: LOCAL_BODY.len() as u64,
            content_type: content_type.to_string(),
            workspace,
        })
    }
}

/// Router plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub fetcher: Arc<FakeFetcher>,
    pub materializer: Arc<FakeMaterializer>,
    pub scratch: TempDir,
}

impl TestApp {
    /// Number of entries left under the scratch root.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.scratch.path()).unwrap().count()
    }

    pub fn materialize_calls(&self) -> usize {
        self.materializer.jobs.lock().unwrap().len()
    }
}

pub struct TestAppBuilder {
    settings: ServiceSettings,
    info: Option<MediaInfo>,
    remote: RemoteMode,
    fail_materialize: bool,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self {
            settings: ServiceSettings {
                rate_limit_enabled: false,
                ..ServiceSettings::default()
            },
            info: Some(sample_info()),
            remote: RemoteMode::Media,
            fail_materialize: false,
        }
    }
}

impl TestAppBuilder {
    pub fn api_key(mut self, key: &str) -> Self {
        self.settings = self.settings.with_api_key(Some(key.to_string()));
        self
    }

    pub fn rate_limit(mut self, per_minute: u32) -> Self {
        self.settings.rate_limit_enabled = true;
        self.settings.rate_limit_per_minute = per_minute;
        self
    }

    pub fn info(mut self, info: Option<MediaInfo>) -> Self {
        self.info = info;
        self
    }

    pub fn remote(mut self, mode: RemoteMode) -> Self {
        self.remote = mode;
        self
    }

    pub fn failing_materializer(mut self) -> Self {
        self.fail_materialize = true;
        self
    }

    pub fn build(self) -> TestApp {
        let scratch = TempDir::new().unwrap();
        let fetcher = Arc::new(FakeFetcher {
            mode: self.remote,
            calls: AtomicUsize::new(0),
            last_headers: Mutex::new(None),
        });
        let materializer = Arc::new(FakeMaterializer {
            root: scratch.path().to_path_buf(),
            fail: self.fail_materialize,
            jobs: Mutex::new(Vec::new()),
        });

        let orchestrator = DownloadOrchestrator::new(
            Arc::new(FakeResolver { info: self.info }),
            Arc::clone(&fetcher) as Arc<dyn RemoteFetcherPort>,
            Arc::clone(&materializer) as Arc<dyn MaterializerPort>,
        );
        let limiter =
            rate_limiter_for(&self.settings).map(|l| l as Arc<dyn RateLimiterPort>);
        let ctx = AxumContext::new(orchestrator, self.settings.api_key.clone(), limiter);

        TestApp {
            router: create_router(ctx),
            fetcher,
            materializer,
            scratch,
        }
    }
}
