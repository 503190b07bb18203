//! Best-effort script detection by Unicode code-point range.
//!
//! Every character of the text is looked up in an ordered table of inclusive
//! code-point ranges and the matching script's tally is incremented. The
//! script with the largest tally wins. This is a majority vote over raw code
//! points, not a language identifier: digits, punctuation and whitespace fall
//! in no range and are ignored, so mixed-script or punctuation-heavy text can
//! be misclassified.
//!
//! ## Tie-breaking
//!
//! Tallies are kept in table order and ties go to the earliest table entry.
//! Reordering a table therefore changes which script wins a tie; the built-in
//! tables document their order for that reason.
//!
//! ## Non-overlap
//!
//! A character must count towards at most one script. [`ScriptTable::new`]
//! rejects tables whose ranges overlap, so hand edits to a table fail at
//! startup instead of silently double-counting.

use crate::error::TranslitError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name reported when no character falls in any range.
pub const UNKNOWN_SCRIPT: &str = "Unknown";

/// One table entry: a script name and its inclusive code-point interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptRange {
    pub name: &'static str,
    pub low: u32,
    pub high: u32,
}

impl ScriptRange {
    pub const fn new(name: &'static str, low: u32, high: u32) -> Self {
        Self { name, low, high }
    }

    #[inline]
    pub fn contains(&self, cp: u32) -> bool {
        self.low <= cp && cp <= self.high
    }

    fn overlaps(&self, other: &ScriptRange) -> bool {
        self.low <= other.high && other.low <= self.high
    }
}

/// Broad table covering Latin and 20 other scripts.
///
/// Latin is listed first and spans 0x41–0x7A, which includes the six ASCII
/// symbols between `Z` and `a`.
pub const WIDE_SCRIPT_RANGES: &[ScriptRange] = &[
    ScriptRange::new("Latin", 0x0041, 0x007A),
    ScriptRange::new("Devanagari", 0x0900, 0x097F),
    ScriptRange::new("Bengali", 0x0980, 0x09FF),
    ScriptRange::new("Gurmukhi", 0x0A00, 0x0A7F),
    ScriptRange::new("Gujarati", 0x0A80, 0x0AFF),
    ScriptRange::new("Oriya", 0x0B00, 0x0B7F),
    ScriptRange::new("Tamil", 0x0B80, 0x0BFF),
    ScriptRange::new("Telugu", 0x0C00, 0x0C7F),
    ScriptRange::new("Kannada", 0x0C80, 0x0CFF),
    ScriptRange::new("Malayalam", 0x0D00, 0x0D7F),
    ScriptRange::new("Sinhala", 0x0D80, 0x0DFF),
    ScriptRange::new("Thai", 0x0E00, 0x0E7F),
    ScriptRange::new("Lao", 0x0E80, 0x0EFF),
    ScriptRange::new("Tibetan", 0x0F00, 0x0FFF),
    ScriptRange::new("Myanmar", 0x1000, 0x109F),
    ScriptRange::new("Georgian", 0x10A0, 0x10FF),
    ScriptRange::new("Hangul", 0xAC00, 0xD7AF),
    ScriptRange::new("Hebrew", 0x0590, 0x05FF),
    ScriptRange::new("Arabic", 0x0600, 0x06FF),
    ScriptRange::new("Cyrillic", 0x0400, 0x04FF),
    ScriptRange::new("Greek", 0x0370, 0x03FF),
];

/// Indic-only table: the nine ISCII-derived blocks, then Latin last.
pub const INDIC_SCRIPT_RANGES: &[ScriptRange] = &[
    ScriptRange::new("Devanagari", 0x0900, 0x097F),
    ScriptRange::new("Bengali", 0x0980, 0x09FF),
    ScriptRange::new("Gurmukhi", 0x0A00, 0x0A7F),
    ScriptRange::new("Gujarati", 0x0A80, 0x0AFF),
    ScriptRange::new("Oriya", 0x0B00, 0x0B7F),
    ScriptRange::new("Tamil", 0x0B80, 0x0BFF),
    ScriptRange::new("Telugu", 0x0C00, 0x0C7F),
    ScriptRange::new("Kannada", 0x0C80, 0x0CFF),
    ScriptRange::new("Malayalam", 0x0D00, 0x0D7F),
    ScriptRange::new("Latin", 0x0041, 0x007A),
];

/// A validated, ordered script table.
#[derive(Debug, Clone)]
pub struct ScriptTable {
    ranges: Vec<ScriptRange>,
}

impl ScriptTable {
    /// Validate and wrap `ranges`.
    ///
    /// # Errors
    /// [`TranslitError::InvalidConfig`] if the table is empty, an entry has
    /// `low > high`, a name repeats, or two ranges overlap.
    pub fn new(ranges: &[ScriptRange]) -> Result<Self, TranslitError> {
        if ranges.is_empty() {
            return Err(TranslitError::InvalidConfig(
                "script table must not be empty".into(),
            ));
        }
        for (i, r) in ranges.iter().enumerate() {
            if r.low > r.high {
                return Err(TranslitError::InvalidConfig(format!(
                    "script range '{}' has low U+{:04X} above high U+{:04X}",
                    r.name, r.low, r.high
                )));
            }
            for other in &ranges[..i] {
                if other.name == r.name {
                    return Err(TranslitError::InvalidConfig(format!(
                        "script '{}' appears twice in the table",
                        r.name
                    )));
                }
                if other.overlaps(r) {
                    return Err(TranslitError::InvalidConfig(format!(
                        "script ranges '{}' (U+{:04X}–U+{:04X}) and '{}' (U+{:04X}–U+{:04X}) overlap",
                        other.name, other.low, other.high, r.name, r.low, r.high
                    )));
                }
            }
        }
        Ok(Self {
            ranges: ranges.to_vec(),
        })
    }

    pub fn ranges(&self) -> &[ScriptRange] {
        &self.ranges
    }

    /// Index of the range containing `cp`, if any.
    pub fn position(&self, cp: u32) -> Option<usize> {
        self.ranges.iter().position(|r| r.contains(cp))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ranges.iter().map(|r| r.name)
    }
}

/// The winning script, or [`Detected::Unknown`] when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Detected {
    Script(String),
    Unknown,
}

impl Detected {
    pub fn name(&self) -> &str {
        match self {
            Detected::Script(name) => name,
            Detected::Unknown => UNKNOWN_SCRIPT,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Detected::Unknown)
    }
}

impl fmt::Display for Detected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One tally line, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCount {
    pub script: String,
    pub count: usize,
}

/// Outcome of [`detect_script`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected: Detected,
    /// Non-zero tallies, in table order.
    pub counts: Vec<ScriptCount>,
    /// Characters that fell in some range.
    pub matched_chars: usize,
    /// All characters scanned.
    pub total_chars: usize,
}

impl DetectionResult {
    pub fn name(&self) -> &str {
        self.detected.name()
    }

    /// Tally for `script`, zero when absent.
    pub fn count_of(&self, script: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.script == script)
            .map_or(0, |c| c.count)
    }

    /// Share of matched characters that went to the winner (0.0 when Unknown).
    pub fn winner_share(&self) -> f64 {
        if self.matched_chars == 0 {
            return 0.0;
        }
        self.count_of(self.name()) as f64 / self.matched_chars as f64
    }
}

/// Classify `text` against `table`. See the module docs for the rules.
pub fn detect_script(text: &str, table: &ScriptTable) -> DetectionResult {
    let mut tallies = vec![0usize; table.ranges.len()];
    let mut total_chars = 0usize;

    for ch in text.chars() {
        total_chars += 1;
        if let Some(idx) = table.position(ch as u32) {
            tallies[idx] += 1;
        }
    }

    let matched_chars: usize = tallies.iter().sum();

    // Strict `>` keeps the earliest entry on ties.
    let mut best: Option<usize> = None;
    for (idx, &count) in tallies.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match best {
            Some(b) if tallies[b] >= count => {}
            _ => best = Some(idx),
        }
    }

    let detected = match best {
        Some(idx) => Detected::Script(table.ranges[idx].name.to_string()),
        None => Detected::Unknown,
    };

    let counts = table
        .ranges
        .iter()
        .zip(&tallies)
        .filter(|(_, &n)| n > 0)
        .map(|(r, &n)| ScriptCount {
            script: r.name.to_string(),
            count: n,
        })
        .collect();

    DetectionResult {
        detected,
        counts,
        matched_chars,
        total_chars,
    }
}
