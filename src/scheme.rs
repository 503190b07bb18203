//! Map a detected script to the source scheme handed to the transliterator.
//!
//! The lookup is deliberately small. Anything not in the table, including
//! [`Detected::Unknown`](crate::detect::Detected::Unknown), falls back to the
//! map's default Roman-like scheme: unrecognised input is assumed to be
//! romanised text.

use crate::detect::DetectionResult;

/// A fixed detected-script → source-scheme table with a fallback.
#[derive(Debug, Clone, Copy)]
pub struct SchemeMap {
    entries: &'static [(&'static str, &'static str)],
    fallback: &'static str,
}

/// Used with the Aksharamukha backend.
pub const AKSHARAMUKHA_SCHEMES: SchemeMap = SchemeMap {
    entries: &[
        ("Latin", "Roman"),
        ("Devanagari", "Devanagari"),
        ("Bengali", "Bengali"),
        ("Arabic", "Arabic"),
        ("Cyrillic", "Cyrillic"),
        ("Hebrew", "Hebrew"),
    ],
    fallback: "Roman",
};

/// Used with the built-in engine.
pub const INDIC_SCHEMES: SchemeMap = SchemeMap {
    entries: &[
        ("Latin", "ITRANS"),
        ("Devanagari", "DEVANAGARI"),
        ("Bengali", "BENGALI"),
        ("Gurmukhi", "GURMUKHI"),
        ("Gujarati", "GUJARATI"),
        ("Oriya", "ORIYA"),
        ("Tamil", "TAMIL"),
        ("Telugu", "TELUGU"),
        ("Kannada", "KANNADA"),
        ("Malayalam", "MALAYALAM"),
    ],
    fallback: "ITRANS",
};

impl SchemeMap {
    pub const fn new(
        entries: &'static [(&'static str, &'static str)],
        fallback: &'static str,
    ) -> Self {
        Self { entries, fallback }
    }

    /// Scheme for a detected script name, or the fallback.
    pub fn scheme_for(&self, script: &str) -> &'static str {
        self.entries
            .iter()
            .find(|(name, _)| *name == script)
            .map_or(self.fallback, |(_, scheme)| scheme)
    }

    /// Scheme for a detection result.
    pub fn infer(&self, detection: &DetectionResult) -> &'static str {
        self.scheme_for(detection.name())
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    /// `true` when `script` has its own entry (no fallback involved).
    pub fn is_mapped(&self, script: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{detect_script, ScriptTable, INDIC_SCRIPT_RANGES, WIDE_SCRIPT_RANGES};

    #[test]
    fn aksharamukha_map_matches_known_scripts() {
        assert_eq!(AKSHARAMUKHA_SCHEMES.scheme_for("Latin"), "Roman");
        assert_eq!(AKSHARAMUKHA_SCHEMES.scheme_for("Hebrew"), "Hebrew");
        assert_eq!(AKSHARAMUKHA_SCHEMES.scheme_for("Cyrillic"), "Cyrillic");
    }

    #[test]
    fn unmapped_and_unknown_fall_back_to_roman() {
        assert_eq!(AKSHARAMUKHA_SCHEMES.scheme_for("Tamil"), "Roman");
        assert_eq!(AKSHARAMUKHA_SCHEMES.scheme_for("Unknown"), "Roman");
        assert!(!AKSHARAMUKHA_SCHEMES.is_mapped("Thai"));

        let table = ScriptTable::new(WIDE_SCRIPT_RANGES).unwrap();
        let unknown = detect_script("1234", &table);
        assert_eq!(AKSHARAMUKHA_SCHEMES.infer(&unknown), "Roman");
    }

    #[test]
    fn indic_map_covers_every_indic_range() {
        let table = ScriptTable::new(INDIC_SCRIPT_RANGES).unwrap();
        for name in table.names() {
            assert!(INDIC_SCHEMES.is_mapped(name), "{name} has no scheme");
        }
        assert_eq!(INDIC_SCHEMES.scheme_for("Latin"), "ITRANS");
        assert_eq!(INDIC_SCHEMES.fallback(), "ITRANS");
    }
}
