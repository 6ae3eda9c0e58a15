//! Fixed vocabularies consumed by the normalization pipeline.
//!
//! Order matters for both tables: phrases are matched and removed
//! sequentially, so longer phrases must come before their suffixes
//! ("Radio Edit" before "Edit").

/// Mix/edit/version phrases that get wrapped in parentheses and moved
/// to the end of the title.
pub(crate) const MIX_PHRASES: &[&str] = &[
    "Original Mix",
    "Radio Edit",
    "Extended Mix",
    "Club Mix",
    "Dub Mix",
    "Vocal Mix",
    "Instrumental Mix",
    "Remix",
    "VIP Mix",
    "Bootleg Mix",
    "Mashup",
    "Radio Mix",
    "Dance Mix",
    "Progressive Mix",
    "Deep Mix",
    "Tech Mix",
    "Minimal Mix",
    "Acoustic Mix",
    "Unplugged Mix",
    "Live Mix",
    "Studio Mix",
    "Demo Mix",
    "Alternative Mix",
    "Special Mix",
    "Bonus Mix",
    "Short Mix",
    "Long Mix",
    "Full Mix",
    "Edit",
    "Version",
    "Rework",
];

/// Audio/quality tag patterns removed as standalone tokens. These are
/// regex fragments (not literals) so bitrate tags can tolerate an
/// optional space, e.g. "320 kbps".
pub(crate) const AUDIO_TAG_PATTERNS: &[&str] = &[
    r"320\s?kbps",
    r"192\s?kbps",
    r"256\s?kbps",
    "flac",
    "web",
    "cdq",
    "promo",
    "cdm",
    "cd",
    "single",
    "ep",
    "lp",
    "vinyl",
    "album",
    "original",
    "mix",
    "edit",
    "extended",
    "full",
    "clean",
    "dirty",
    "instrumental",
    "acapella",
    "remix",
    "bootleg",
    "cover",
];
