//! Deterministic track-title normalization.
//!
//! [`normalize`] applies a fixed, ordered pipeline of text transforms that
//! turns a raw attachment title into a canonical, filesystem-friendly name.
//! The function is pure and total: it never fails, and re-running it on its
//! own output is a fixed point for every stage except the mix-phrase,
//! bracket-group and vinyl-id relocations, which are only meaningful on the
//! raw input.
//!
//! Stage order is load-bearing. Later stages assume the output shape of
//! earlier ones (e.g. bracket padding must be fixed before phrase adjacency
//! checks make sense), so the stages must not be reordered.

mod vocab;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use vocab::{AUDIO_TAG_PATTERNS, MIX_PHRASES};

static TRAILING_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"__\d+\b").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static OPEN_PAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\[(])\s+").unwrap());
static CLOSE_PAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([\])])").unwrap());
static GLUED_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\S)([\[(])").unwrap());
static GLUED_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\])])(\S)").unwrap());
static BRACKET_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]").unwrap());
static VINYL_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-D][0-9]{1,2}$").unwrap());
static VINYL_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:vinyl|lp|ep|single)\b").unwrap());
static CAMELOT_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([\s\[(])((?:1[0-2]|[1-9])[ab])([\s\])])").unwrap());
static EMPTY_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s*\]|\(\s*\)").unwrap());
static LEADING_RESIDUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-–—.\s]+").unwrap());
static TRAILING_RESIDUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-–—.\s]+$").unwrap());

static MIX_PHRASE_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    MIX_PHRASES
        .iter()
        .map(|p| Regex::new(&format!(r"(?i)\b{p}\b")).unwrap())
        .collect()
});

static AUDIO_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({})\b", AUDIO_TAG_PATTERNS.join("|"))).unwrap());

/// Normalizes a raw title through the full pipeline.
pub fn normalize(raw: &str) -> String {
    let mut name = strip_id_suffix(raw);
    name = collapse_spaces(&name);
    name = trim_inside_brackets(&name);
    name = pad_around_brackets(&name);
    name = collapse_spaces(&name.replace('_', " "));
    name = relocate_mix_phrases(&name);
    name = relocate_bracket_groups(&name);
    name = relocate_vinyl_id(&name);
    name = collapse_spaces(&VINYL_TAGS.replace_all(&name, ""));
    name = strip_camelot_keys(&name);
    name = strip_audio_tags(&name);
    strip_residue(&name)
}

/// Removes an upstream `__<digits>` id suffix embedded in the title.
fn strip_id_suffix(text: &str) -> String {
    TRAILING_ID.replace_all(text, "").into_owned()
}

/// Collapses whitespace runs to single spaces and trims both ends.
fn collapse_spaces(text: &str) -> String {
    MULTI_SPACE.replace_all(text, " ").trim().to_string()
}

/// Removes whitespace directly inside `[...]` and `(...)` groups.
fn trim_inside_brackets(text: &str) -> String {
    let text = OPEN_PAD.replace_all(text, "$1");
    CLOSE_PAD.replace_all(&text, "$1").into_owned()
}

/// Inserts a space before `[`/`(` and after `]`/`)` where missing, so
/// tokens are never glued to bracket groups.
fn pad_around_brackets(text: &str) -> String {
    let text = GLUED_OPEN.replace_all(text, "$1 $2");
    GLUED_CLOSE.replace_all(&text, "$1 $2").trim().to_string()
}

/// Detects known mix/edit phrases, removes them in place, and appends
/// each one title-cased and parenthesized at the end of the string.
///
/// Phrases already sitting against a bracket (e.g. `(Original Mix)`)
/// are left untouched.
fn relocate_mix_phrases(text: &str) -> String {
    let mut name = text.to_string();
    let mut found = Vec::new();

    for re in MIX_PHRASE_RES.iter() {
        let spans: Vec<(usize, usize)> = re
            .find_iter(&name)
            .filter(|m| !is_bracket_adjacent(&name, m.start(), m.end()))
            .map(|m| (m.start(), m.end()))
            .collect();
        if spans.is_empty() {
            continue;
        }
        for &(s, e) in &spans {
            found.push(format!("({})", capitalize_words(&name[s..e])));
        }
        name = remove_spans(&name, &spans);
    }

    if found.is_empty() {
        return name;
    }
    collapse_spaces(&format!("{} {}", collapse_spaces(&name), found.join(" ")))
}

/// Moves every `[...]` group to the end of the string, preserving their
/// original left-to-right order.
fn relocate_bracket_groups(text: &str) -> String {
    let groups: Vec<&str> = BRACKET_GROUP.find_iter(text).map(|m| m.as_str()).collect();
    if groups.is_empty() {
        return text.to_string();
    }
    let stripped = collapse_spaces(&BRACKET_GROUP.replace_all(text, ""));
    collapse_spaces(&format!("{} {}", stripped, groups.join(" ")))
}

/// Moves a standalone vinyl-side track id (`A1`..`D99`) to the front.
fn relocate_vinyl_id(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| VINYL_ID.is_match(t)) else {
        return text.to_string();
    };
    let id = tokens[pos].to_string();
    let rest: Vec<&str> = tokens
        .iter()
        .filter(|t| **t != id.as_str())
        .copied()
        .collect();
    collapse_spaces(&format!("{} {}", id, rest.join(" ")))
}

/// Removes Camelot musical-key tokens (`1A`..`12B`) that appear between
/// whitespace or brackets. Runs to a fixed point because a removal can
/// expose an adjacent key that shared a delimiter with the previous one.
fn strip_camelot_keys(text: &str) -> String {
    let mut name = text.to_string();
    loop {
        let next = CAMELOT_KEY.replace_all(&name, " ").into_owned();
        if next == name {
            break;
        }
        name = next;
    }
    collapse_spaces(&name)
}

/// Removes standalone audio/quality tags. Tokens inside parenthesized
/// groups are kept so relocated mix phrases survive this stage.
fn strip_audio_tags(text: &str) -> String {
    let spans: Vec<(usize, usize)> = AUDIO_TAGS
        .find_iter(text)
        .filter(|m| !inside_parens(text, m.start()))
        .map(|m| (m.start(), m.end()))
        .collect();
    if spans.is_empty() {
        return text.to_string();
    }
    collapse_spaces(&remove_spans(text, &spans))
}

/// Final cleanup: drops bracket/paren groups emptied by tag removal and
/// strips leading/trailing dashes, dots and whitespace.
fn strip_residue(text: &str) -> String {
    let mut name = text.to_string();
    loop {
        let next = EMPTY_GROUP.replace_all(&name, "").into_owned();
        if next == name {
            break;
        }
        name = next;
    }
    let name = LEADING_RESIDUE.replace_all(&name, "");
    let name = TRAILING_RESIDUE.replace_all(&name, "");
    collapse_spaces(&name)
}

/// True when the span sits directly against an opening bracket on the
/// left or a closing bracket on the right.
fn is_bracket_adjacent(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    matches!(before, Some('[') | Some('(')) || matches!(after, Some(']') | Some(')'))
}

/// True when the byte offset falls inside an unclosed `(...)` group.
fn inside_parens(text: &str, offset: usize) -> bool {
    let mut depth = 0i32;
    for c in text[..offset].chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}

fn remove_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for &(s, e) in spans {
        out.push_str(&text[pos..s]);
        pos = e;
    }
    out.push_str(&text[pos..]);
    out
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_id_suffix_and_underscores() {
        assert_eq!(normalize("My_Track__12345"), "My Track");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  A   B\t\tC  "), "A B C");
    }

    #[test]
    fn test_pads_glued_brackets() {
        assert_eq!(normalize("Track[Deeper]"), "Track [Deeper]");
    }

    #[test]
    fn test_trims_spaces_inside_brackets() {
        assert_eq!(normalize("Track [ Deeper ]"), "Track [Deeper]");
    }

    #[test]
    fn test_wraps_and_moves_mix_phrase() {
        assert_eq!(
            normalize("Dark Matter Original Mix Feat Someone"),
            "Dark Matter Feat Someone (Original Mix)"
        );
    }

    #[test]
    fn test_mix_phrase_already_wrapped_is_kept_in_place() {
        assert_eq!(
            normalize("Dark Matter (Original Mix) Feat Someone"),
            "Dark Matter (Original Mix) Feat Someone"
        );
    }

    #[test]
    fn test_mix_phrase_title_cased() {
        assert_eq!(normalize("Track RADIO EDIT"), "Track (Radio Edit)");
    }

    #[test]
    fn test_moves_bracket_groups_to_end() {
        assert_eq!(
            normalize("Track [Label Dub] Name [2020]"),
            "Track Name [Label Dub] [2020]"
        );
    }

    #[test]
    fn test_moves_vinyl_id_to_front() {
        assert_eq!(normalize("Some Track B2 Name"), "B2 Some Track Name");
    }

    #[test]
    fn test_removes_vinyl_tags() {
        assert_eq!(normalize("Track Name Vinyl"), "Track Name");
    }

    #[test]
    fn test_removes_camelot_keys() {
        assert_eq!(normalize("Track 5A Name 12B End"), "Track Name End");
    }

    #[test]
    fn test_removes_audio_tags() {
        assert_eq!(normalize("Track Name 320kbps WEB"), "Track Name");
    }

    #[test]
    fn test_audio_tags_inside_parens_survive() {
        assert_eq!(
            normalize("Track (Original Mix) flac"),
            "Track (Original Mix)"
        );
    }

    #[test]
    fn test_strips_residual_punctuation() {
        assert_eq!(normalize("- Track Name -.-"), "Track Name");
    }

    #[test]
    fn test_full_pipeline_example() {
        assert_eq!(
            normalize("My_Track__12345 (Original Mix) [320kbps][FLAC]"),
            "My Track (Original Mix)"
        );
    }

    #[test]
    fn test_empty_and_degenerate_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("___"), "");
    }

    #[test]
    fn test_fixed_point_without_relocating_stages() {
        let inputs = [
            "Artist - Some Title",
            "A B C",
            "Track Name (Original Mix)",
            "Plain",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not a fixed point for {input:?}");
        }
    }
}
