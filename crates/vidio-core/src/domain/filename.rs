//! Attachment filename sanitizing and `Content-Disposition` values.

/// Longest stem kept from a title, in characters.
const MAX_STEM_CHARS: usize = 180;

/// Characters that must never reach a filename (path separators and
/// characters most filesystems or header parsers reject).
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Make a title safe to use as a filename stem.
///
/// Control characters are dropped, path separators and reserved characters
/// become `_`, and leading/trailing dots and whitespace are trimmed so the
/// result can't name a parent or hidden file. Returns `fallback` when nothing
/// usable is left.
pub fn sanitize_filename(title: &str, fallback: &str) -> String {
    let replaced: String = title
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let stem: String = trimmed.chars().take(MAX_STEM_CHARS).collect();
    let stem = stem.trim_end();

    if stem.is_empty() || stem.chars().all(|c| c == '_') {
        fallback.to_string()
    } else {
        stem.to_string()
    }
}

/// Build `<sanitized-title>.<ext>` for an attachment.
pub fn attachment_filename(title: Option<&str>, fallback: &str, ext: &str) -> String {
    let stem = sanitize_filename(title.unwrap_or_default(), fallback);
    let ext = sanitize_filename(ext, "bin");
    format!("{stem}.{ext}")
}

/// `Content-Disposition` header value for a download.
///
/// The quoted `filename` is always plain ASCII; titles with other characters
/// additionally get an RFC 5987 `filename*` parameter carrying the exact name.
pub fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if ascii == filename {
        format!("attachment; filename=\"{ascii}\"")
    } else {
        format!(
            "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
            urlencoding::encode(filename)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_and_control_characters() {
        assert_eq!(
            sanitize_filename("../../etc/passwd", "video"),
            "_.._etc_passwd"
        );
        assert_eq!(sanitize_filename("a\\b\nc\u{7}d", "video"), "a_bcd");
        assert_eq!(sanitize_filename("say \"hi\"", "video"), "say _hi_");
    }

    #[test]
    fn falls_back_when_nothing_is_left() {
        assert_eq!(sanitize_filename("", "video"), "video");
        assert_eq!(sanitize_filename(" ... ", "audio"), "audio");
        assert_eq!(sanitize_filename("///", "video"), "video");
    }

    #[test]
    fn attachment_filename_joins_stem_and_extension() {
        assert_eq!(
            attachment_filename(Some("My Clip"), "video", "mp4"),
            "My Clip.mp4"
        );
        assert_eq!(attachment_filename(None, "audio", "mp3"), "audio.mp3");
    }

    #[test]
    fn long_titles_are_truncated() {
        let title = "x".repeat(500);
        assert_eq!(sanitize_filename(&title, "video").chars().count(), MAX_STEM_CHARS);
    }

    #[test]
    fn ascii_disposition_is_plain() {
        assert_eq!(
            content_disposition("clip.mp4"),
            "attachment; filename=\"clip.mp4\""
        );
    }

    #[test]
    fn unicode_disposition_carries_encoded_form() {
        let value = content_disposition("café.mp4");
        assert!(value.starts_with("attachment; filename=\"caf_.mp4\""));
        assert!(value.contains("filename*=UTF-8''caf%C3%A9.mp4"));
        assert!(value.is_ascii());
    }
}
