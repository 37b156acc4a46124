//! Infrastructure adapters for the vidio core ports.
//!
//! - [`YtDlpResolver`] - metadata via `yt-dlp -J`
//! - [`YtDlpMaterializer`] - local downloads and mp3 extraction via yt-dlp
//! - [`HttpRemoteFetcher`] - direct media URLs via `reqwest`

mod fetcher;
mod materializer;
mod resolver;
mod ytdlp;

pub use fetcher::{DEFAULT_USER_AGENT, FETCH_HEADERS_TIMEOUT, HttpRemoteFetcher};
pub use materializer::YtDlpMaterializer;
pub use resolver::{RESOLVE_TIMEOUT, YtDlpResolver, parse_media_info};
pub use ytdlp::{YTDLP_BINARY, YtDlp, YtDlpError};
