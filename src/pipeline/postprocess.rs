//! Post-processing: deterministic cleanup of OCR output.
//!
//! Engines leave layout artefacts behind. A vision model sometimes wraps its
//! answer in a code fence despite the prompt; tesseract emits form feeds,
//! `\r\n` on some builds and long runs of blank lines. These rules remove
//! the artefacts without touching the recognised characters.
//!
//! ZWJ (U+200D) and ZWNJ (U+200C) are *not* invisible noise in Indic text:
//! they select between conjunct and half forms, and the transliterator needs
//! them. Only the zero-width space, word joiner, soft hyphen and BOM go.
//!
//! ## Rule order
//!
//! Fences come off first so the fence regex sees the raw answer; line endings
//! are normalised before any per-line rule runs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the text of one OCR'd page.
///
/// 1. Strip an outer code fence
/// 2. Normalise line endings and form feeds to `\n`
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Strip invisible formatting characters (but keep ZWJ/ZWNJ)
/// 6. Trim leading and trailing blank lines
pub fn clean_ocr_text(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    trim_blank_edges(&s)
}

// ── Rule 1: Strip outer fence ────────────────────────────────────────────

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*\r?\n(.*?)\r?\n```\s*$").expect("valid regex"));

fn strip_outer_fence(input: &str) -> String {
    match RE_OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: Line endings ─────────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace(['\r', '\u{000C}'], "\n")
}

// ── Rule 3: Trailing whitespace ──────────────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Blank lines ──────────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").expect("valid regex"));

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").into_owned()
}

// ── Rule 5: Invisible characters ─────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{2060}'], "")
}

// ── Rule 6: Edges ────────────────────────────────────────────────────────

fn trim_blank_edges(input: &str) -> String {
    input.trim_matches('\n').to_string()
}
