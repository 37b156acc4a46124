//! Stream relay: turns a [`Delivery`] into a streamed HTTP response.
//!
//! Both producers are read through an `AsyncRead` in fixed 8 KiB chunks, so
//! the payload is never buffered whole and the transport's backpressure
//! reaches the producer. The backing resource (the remote connection or the
//! scratch workspace) is owned by [`RelayStream`] and released exactly once:
//! at end of stream, on a read error, or when hyper drops the body because
//! the client went away.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use futures_core::Stream;
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{info, warn};
use vidio_core::{
    ByteStream, Delivery, MaterializedFile, RemoteResponse, ScratchWorkspace, content_disposition,
};

use crate::error::HttpError;

/// Relay chunk size.
pub const RELAY_CHUNK_SIZE: usize = 8 * 1024;

const OCTET_STREAM: &str = "application/octet-stream";

type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Complete,
    ReadError,
    Disconnected,
}

impl Exit {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::ReadError => "read-error",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Chunked body stream that owns its backing resource.
pub struct RelayStream {
    inner: Option<ReaderStream<BoxedReader>>,
    workspace: Option<ScratchWorkspace>,
    source: &'static str,
    bytes: u64,
}

impl RelayStream {
    /// Relay a live remote body. Dropping the inner reader closes the
    /// connection.
    pub fn live(body: ByteStream) -> Self {
        Self::new(Box::pin(StreamReader::new(body)), None, "live")
    }

    /// Relay an opened file, deleting `workspace` when done.
    pub fn file(file: tokio::fs::File, workspace: ScratchWorkspace) -> Self {
        Self::new(Box::pin(file), Some(workspace), "file")
    }

    fn new(reader: BoxedReader, workspace: Option<ScratchWorkspace>, source: &'static str) -> Self {
        Self {
            inner: Some(ReaderStream::with_capacity(reader, RELAY_CHUNK_SIZE)),
            workspace,
            source,
            bytes: 0,
        }
    }

    fn finish(&mut self, exit: Exit) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        drop(inner);

        let workspace_removed = self.workspace.take().map(|mut ws| ws.release());
        match exit {
            Exit::Complete => info!(
                source = self.source,
                bytes = self.bytes,
                exit = exit.as_str(),
                workspace_removed = ?workspace_removed,
                "Relay finished"
            ),
            Exit::ReadError | Exit::Disconnected => warn!(
                source = self.source,
                bytes = self.bytes,
                exit = exit.as_str(),
                workspace_removed = ?workspace_removed,
                "Relay ended early"
            ),
        }
    }
}

impl Stream for RelayStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match Pin::new(inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.bytes += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                // No retry: the status is already committed.
                warn!(source = this.source, error = %e, "Relay read failed");
                this.finish(Exit::ReadError);
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish(Exit::Complete);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for RelayStream {
    fn drop(&mut self) {
        self.finish(Exit::Disconnected);
    }
}

fn header_value(value: &str) -> Result<HeaderValue, HttpError> {
    HeaderValue::from_str(value)
        .map_err(|e| HttpError::Internal(format!("invalid header value {value:?}: {e}")))
}

/// Build the streamed response for a delivery.
///
/// Every header is decided here, before the first body byte.
pub async fn relay(delivery: Delivery) -> Result<Response, HttpError> {
    match delivery {
        Delivery::Live { response, filename } => relay_live(response, &filename),
        Delivery::File {
            file,
            filename,
            content_type,
        } => relay_file(file, &filename, &content_type).await,
    }
}

fn relay_live(remote: RemoteResponse, filename: &str) -> Result<Response, HttpError> {
    let status = StatusCode::from_u16(remote.status).unwrap_or(StatusCode::OK);
    let content_type = remote.content_type.as_deref().unwrap_or(OCTET_STREAM);

    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, header_value(content_type)?);
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&content_disposition(filename))?,
    );
    if let Some(length) = remote.content_length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    if let Some(range) = remote.content_range.as_deref() {
        headers.insert(header::CONTENT_RANGE, header_value(range)?);
    }
    if let Some(accept) = remote.accept_ranges.as_deref() {
        headers.insert(header::ACCEPT_RANGES, header_value(accept)?);
    }

    *response.body_mut() = Body::from_stream(RelayStream::live(remote.body));
    Ok(response)
}

async fn relay_file(
    file: MaterializedFile,
    filename: &str,
    content_type: &str,
) -> Result<Response, HttpError> {
    let MaterializedFile {
        path,
        size_bytes,
        workspace,
        ..
    } = file;

    // On failure `workspace` drops here and removes the directory.
    let handle = tokio::fs::File::open(&path)
        .await
        .map_err(|e| HttpError::Internal(format!("cannot open materialized file: {e}")))?;

    let mut response = Response::new(Body::empty());
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, header_value(content_type)?);
    headers.insert(
        header::CONTENT_DISPOSITION,
        header_value(&content_disposition(filename))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size_bytes));

    *response.body_mut() = Body::from_stream(RelayStream::file(handle, workspace));
    Ok(response)
}
