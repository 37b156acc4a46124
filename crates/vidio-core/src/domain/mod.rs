//! Domain types for media resolution and delivery.
//!
//! These are pure data types with no infrastructure dependencies, apart from
//! [`ScratchWorkspace`] which owns a temporary directory on disk.

mod encoding;
mod filename;
mod request;
mod workspace;

pub use encoding::{AUDIO_EXTRACT_ID, EncodingDescriptor, MediaInfo};
pub use filename::{attachment_filename, content_disposition, sanitize_filename};
pub use request::{ForwardedHeaders, MediaRequest, validate_source_url};
pub use workspace::ScratchWorkspace;
