//! Destination filename derivation.
//!
//! The final name is the normalized title stem plus the original
//! extension, sanitized for common filesystems and truncated to a
//! byte-safe maximum without ever cutting the extension or splitting a
//! UTF-8 character.

use std::path::Path;

use crate::normalizer::normalize;
use crate::source::Candidate;

/// Maximum filename length in bytes (the common filesystem limit).
pub const MAX_FILENAME_BYTES: usize = 255;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Derives the destination filename for a candidate.
pub fn derive_filename(candidate: &Candidate) -> String {
    let raw = candidate
        .media
        .as_ref()
        .and_then(|m| m.filename.clone())
        .unwrap_or_else(|| fallback_name(candidate));

    let stem = Path::new(&raw)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = Path::new(&raw)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut name = sanitize(&normalize(&stem));
    if name.is_empty() {
        name = format!("file_{}", candidate.message_id);
    }

    truncate_preserving_extension(&name, &extension, MAX_FILENAME_BYTES)
}

/// Replaces characters that are invalid on common filesystems, drops
/// control characters, and trims spaces and dots from the ends.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    replaced.trim_matches(|c| c == ' ' || c == '.').to_string()
}

fn fallback_name(candidate: &Candidate) -> String {
    let ext = candidate
        .media
        .as_ref()
        .map(|m| extension_from_mime(&m.content_type))
        .unwrap_or("bin");
    format!("file_{}.{}", candidate.message_id, ext)
}

/// Maps common audio MIME types to filename extensions.
fn extension_from_mime(mime: &str) -> &'static str {
    match mime {
        "audio/flac" => "flac",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/aiff" | "audio/x-aiff" => "aiff",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/mpeg" | "audio/mp3" => "mp3",
        _ => "bin",
    }
}

/// Truncates `stem + extension` to at most `max_bytes`, cutting the stem
/// on a char boundary and keeping the extension intact.
fn truncate_preserving_extension(stem: &str, extension: &str, max_bytes: usize) -> String {
    if stem.len() + extension.len() <= max_bytes {
        return format!("{stem}{extension}");
    }
    let budget = max_bytes.saturating_sub(extension.len());
    let mut cut = budget.min(stem.len());
    while cut > 0 && !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &stem[..cut], extension)
}
