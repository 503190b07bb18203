//! Built-in scheme-table transliterator.
//!
//! Devanagari is the pivot. Every request is turned into Devanagari first and
//! then rendered into the target:
//!
//! ```text
//! Roman ──parse──▶ Devanagari ──offset + gap substitution──▶ Brahmic
//! Brahmic ──offset──▶ Devanagari ──render──▶ Roman
//! ```
//!
//! The nine Brahmic scripts share the ISCII-derived block layout: the same
//! letter sits at the same offset inside each 128-code-point block, so most
//! conversions are a subtraction and an addition. Letters a script lacks
//! (Tamil has no voiced or aspirated stops, Bengali no separate `va`) are
//! replaced by their nearest neighbour before the offset is applied.
//!
//! Roman schemes are token tables. Parsing is longest-match; a virama is
//! inserted whenever a consonant is followed by anything other than a vowel,
//! and rendering appends the inherent `a` to a consonant without a vowel sign.
//!
//! Output depends only on `(source, target, text)`.

use super::{TransliterationBackend, TransliterationRequest};
use crate::error::TransliterationError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;

const VIRAMA: char = '\u{094D}';
const NUKTA: char = '\u{093C}';
const DEVANAGARI_BASE: u32 = 0x0900;

// ── Schemes ──────────────────────────────────────────────────────────────

/// Brahmic scripts laid out on the ISCII block pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brahmic {
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Oriya,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
}

impl Brahmic {
    fn base(self) -> u32 {
        match self {
            Brahmic::Devanagari => 0x0900,
            Brahmic::Bengali => 0x0980,
            Brahmic::Gurmukhi => 0x0A00,
            Brahmic::Gujarati => 0x0A80,
            Brahmic::Oriya => 0x0B00,
            Brahmic::Tamil => 0x0B80,
            Brahmic::Telugu => 0x0C00,
            Brahmic::Kannada => 0x0C80,
            Brahmic::Malayalam => 0x0D00,
        }
    }
}

/// A scheme the built-in engine can read and write.
#[derive(Clone, Copy)]
pub enum Scheme {
    Brahmic(Brahmic),
    Roman(&'static RomanTable),
}

impl std::fmt::Debug for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::Brahmic(b) => write!(f, "Brahmic({:?})", b),
            Scheme::Roman(r) => write!(f, "Roman({})", r.name),
        }
    }
}

impl Scheme {
    /// Resolve a scheme name.
    ///
    /// Case, `_`, `-` and spaces are ignored, and an Aksharamukha-style
    /// `Roman_` prefix is accepted, so `Roman_Harvard-Kyoto`, `hk` and
    /// `HARVARD KYOTO` all name the same scheme. Plain `Roman` means IAST.
    pub fn parse(name: &str) -> Option<Scheme> {
        let lower = name.trim().to_ascii_lowercase();
        let stripped = lower
            .strip_prefix("roman_")
            .or_else(|| lower.strip_prefix("roman-"))
            .or_else(|| lower.strip_prefix("roman "))
            .unwrap_or(&lower);
        let key: String = stripped
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();

        let scheme = match key.as_str() {
            "devanagari" => Scheme::Brahmic(Brahmic::Devanagari),
            "bengali" | "bangla" => Scheme::Brahmic(Brahmic::Bengali),
            "gurmukhi" | "punjabi" => Scheme::Brahmic(Brahmic::Gurmukhi),
            "gujarati" => Scheme::Brahmic(Brahmic::Gujarati),
            "oriya" | "odia" => Scheme::Brahmic(Brahmic::Oriya),
            "tamil" => Scheme::Brahmic(Brahmic::Tamil),
            "telugu" => Scheme::Brahmic(Brahmic::Telugu),
            "kannada" => Scheme::Brahmic(Brahmic::Kannada),
            "malayalam" => Scheme::Brahmic(Brahmic::Malayalam),
            "iast" | "roman" => Scheme::Roman(&IAST),
            "itrans" => Scheme::Roman(&ITRANS),
            "hk" | "harvardkyoto" => Scheme::Roman(&HK),
            "slp1" => Scheme::Roman(&SLP1),
            "velthuis" => Scheme::Roman(&VELTHUIS),
            _ => return None,
        };
        Some(scheme)
    }

    fn to_devanagari(self, text: &str) -> String {
        match self {
            Scheme::Brahmic(script) => brahmic_to_devanagari(text, script),
            Scheme::Roman(table) => table.parse(text),
        }
    }

    fn from_devanagari(self, text: &str) -> String {
        match self {
            Scheme::Brahmic(script) => devanagari_to_brahmic(text, script),
            Scheme::Roman(table) => table.render(text),
        }
    }
}

// ── Engine ───────────────────────────────────────────────────────────────

/// In-process transliterator for the Indic profile.
#[derive(Debug, Default, Clone, Copy)]
pub struct SanscriptEngine;

impl SanscriptEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether `name` resolves to a scheme this engine knows.
    pub fn supports(name: &str) -> bool {
        Scheme::parse(name).is_some()
    }

    /// Synchronous core of [`TransliterationBackend::transliterate`].
    pub fn convert(
        &self,
        source: &str,
        target: &str,
        text: &str,
    ) -> Result<String, TransliterationError> {
        let from = Scheme::parse(source).ok_or_else(|| TransliterationError::UnsupportedScheme {
            scheme: source.to_string(),
        })?;
        let to = Scheme::parse(target).ok_or_else(|| TransliterationError::UnsupportedScheme {
            scheme: target.to_string(),
        })?;

        if let (Scheme::Brahmic(a), Scheme::Brahmic(b)) = (from, to) {
            if a == b {
                return Ok(text.to_string());
            }
        }

        let pivot = from.to_devanagari(text);
        Ok(to.from_devanagari(&pivot))
    }
}

#[async_trait]
impl TransliterationBackend for SanscriptEngine {
    fn name(&self) -> &str {
        "builtin"
    }

    async fn probe(&self) -> Result<(), TransliterationError> {
        Ok(())
    }

    async fn transliterate(
        &self,
        request: &TransliterationRequest,
    ) -> Result<String, TransliterationError> {
        self.convert(&request.source, &request.target, &request.text)
    }
}

// ── Brahmic ↔ Devanagari ─────────────────────────────────────────────────

/// Offsets that carry a letter, sign or digit in every block.
fn in_parallel_range(offset: u32) -> bool {
    (0x01..=0x63).contains(&offset) || (0x66..=0x6F).contains(&offset)
}

fn shift(c: char, from_base: u32, to_base: u32) -> char {
    let cp = c as u32;
    if cp >= from_base && in_parallel_range(cp - from_base) {
        char::from_u32(cp - from_base + to_base).unwrap_or(c)
    } else {
        c
    }
}

/// Split a precomposed nukta letter (U+0958–U+095F).
fn decompose_nukta(c: char) -> Option<[char; 2]> {
    let base = match c {
        '\u{0958}' => '\u{0915}',
        '\u{0959}' => '\u{0916}',
        '\u{095A}' => '\u{0917}',
        '\u{095B}' => '\u{091C}',
        '\u{095C}' => '\u{0921}',
        '\u{095D}' => '\u{0922}',
        '\u{095E}' => '\u{092B}',
        '\u{095F}' => '\u{092F}',
        _ => return None,
    };
    Some([base, NUKTA])
}

fn is_consonant(c: char) -> bool {
    matches!(c, '\u{0915}'..='\u{0939}' | '\u{0958}'..='\u{095F}')
}

fn is_vowel_sign(c: char) -> bool {
    matches!(c, '\u{093E}'..='\u{094C}' | '\u{0962}' | '\u{0963}')
}

fn brahmic_to_devanagari(text: &str, script: Brahmic) -> String {
    if script == Brahmic::Devanagari {
        return text.to_string();
    }
    let base = script.base();
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let special = match (script, c) {
            (Brahmic::Bengali, '\u{09CE}') => Some("त्"),
            (Brahmic::Bengali, '\u{09F0}') => Some("र"),
            (Brahmic::Bengali, '\u{09F1}') => Some("व"),
            (Brahmic::Gurmukhi, '\u{0A70}') => Some("ं"),
            (Brahmic::Malayalam, '\u{0D7A}') => Some("ण्"),
            (Brahmic::Malayalam, '\u{0D7B}') => Some("न्"),
            (Brahmic::Malayalam, '\u{0D7C}') => Some("र्"),
            (Brahmic::Malayalam, '\u{0D7D}') => Some("ल्"),
            (Brahmic::Malayalam, '\u{0D7E}') => Some("ळ्"),
            (Brahmic::Malayalam, '\u{0D7F}') => Some("क्"),
            _ => None,
        };
        if let Some(s) = special {
            out.push_str(s);
            continue;
        }

        // Gurmukhi addak doubles the consonant that follows it.
        if script == Brahmic::Gurmukhi && c == '\u{0A71}' {
            if let Some(&next) = chars.peek() {
                let dev = shift(next, base, DEVANAGARI_BASE);
                if is_consonant(dev) {
                    out.push(dev);
                    out.push(VIRAMA);
                }
            }
            continue;
        }

        out.push(shift(c, base, DEVANAGARI_BASE));
    }
    out
}

/// Nearest available spelling for a Devanagari letter the target lacks.
fn substitute(script: Brahmic, c: char) -> Option<&'static str> {
    use Brahmic::*;
    match (script, c) {
        (Devanagari, _) => None,

        (Gujarati, 'ऍ' | 'ऑ' | 'ॅ' | 'ॉ') => None,
        (_, 'ऍ') => Some("ए"),
        (_, 'ऑ') => Some("ओ"),
        (_, 'ॅ') => Some("े"),
        (_, 'ॉ') => Some("ो"),

        (Bengali | Gurmukhi | Gujarati | Oriya, 'ऎ') => Some("ए"),
        (Bengali | Gurmukhi | Gujarati | Oriya, 'ऒ') => Some("ओ"),
        (Bengali | Gurmukhi | Gujarati | Oriya, 'ॆ') => Some("े"),
        (Bengali | Gurmukhi | Gujarati | Oriya, 'ॊ') => Some("ो"),

        (Bengali | Gurmukhi | Gujarati | Oriya | Telugu | Kannada, 'ऩ') => Some("न"),
        (Bengali | Gurmukhi | Gujarati | Oriya, 'ऱ') => Some("र"),
        (Bengali, 'ळ' | 'ऴ') => Some("ल"),
        (Gurmukhi | Gujarati | Oriya | Kannada, 'ऴ') => Some("ळ"),
        (Bengali, 'व') => Some("ब"),

        (Gurmukhi, 'ऋ') => Some("रि"),
        (Gurmukhi, 'ॠ') => Some("री"),
        (Gurmukhi, 'ऌ') => Some("लि"),
        (Gurmukhi, 'ॡ') => Some("ली"),
        (Gurmukhi, 'ृ') => Some("्रि"),
        (Gurmukhi, 'ॄ') => Some("्री"),
        (Gurmukhi, 'ॢ') => Some("्लि"),
        (Gurmukhi, 'ॣ') => Some("्ली"),
        (Gurmukhi, 'ष') => Some("श"),

        (Tamil, 'ख' | 'ग' | 'घ') => Some("क"),
        (Tamil, 'छ') => Some("च"),
        (Tamil, 'झ') => Some("ज"),
        (Tamil, 'ठ' | 'ड' | 'ढ') => Some("ट"),
        (Tamil, 'थ' | 'द' | 'ध') => Some("त"),
        (Tamil, 'फ' | 'ब' | 'भ') => Some("प"),
        (Tamil, 'ऋ') => Some("रु"),
        (Tamil, 'ॠ') => Some("रू"),
        (Tamil, 'ऌ') => Some("लु"),
        (Tamil, 'ॡ') => Some("लू"),
        (Tamil, 'ृ') => Some("्रु"),
        (Tamil, 'ॄ') => Some("्रू"),
        (Tamil, 'ॢ') => Some("्लु"),
        (Tamil, 'ॣ') => Some("्लू"),
        (Tamil, 'ं' | 'ँ') => Some("म्"),

        (Kannada, 'ँ') => Some("ं"),
        (Gurmukhi | Tamil, 'ऽ') => Some(""),
        (Tamil | Telugu | Malayalam, '\u{093C}') => Some(""),
        (Bengali | Oriya, 'ॐ') => Some("ओँ"),
        (Gurmukhi | Telugu | Kannada | Malayalam, 'ॐ') => Some("ओं"),
        _ => None,
    }
}

fn devanagari_to_brahmic(text: &str, script: Brahmic) -> String {
    if script == Brahmic::Devanagari {
        return text.to_string();
    }
    let base = script.base();
    let mut out = String::with_capacity(text.len());

    let emit = |c: char, out: &mut String| match substitute(script, c) {
        Some(replacement) => out.extend(
            replacement
                .chars()
                .map(|r| shift(r, DEVANAGARI_BASE, base)),
        ),
        None => out.push(shift(c, DEVANAGARI_BASE, base)),
    };

    for c in text.chars() {
        match decompose_nukta(c) {
            Some(pair) => pair.iter().for_each(|&p| emit(p, &mut out)),
            None => emit(c, &mut out),
        }
    }
    out
}

// ── Roman schemes ────────────────────────────────────────────────────────

/// One entry of a Roman scheme table. Devanagari strings are decomposed.
#[derive(Debug, Clone, Copy)]
enum Token {
    /// Independent letter and dependent sign (empty for the inherent `a`).
    Vowel(&'static str, &'static str),
    Consonant(&'static str),
    /// Attaches to the preceding syllable: anusvara, visarga, candrabindu.
    Mark(&'static str),
    /// Stands alone: digits, danda, avagraha, om.
    Symbol(&'static str),
}

use Token::{Consonant as C, Mark as M, Symbol as S, Vowel as V};

/// A compiled Roman scheme.
pub struct RomanTable {
    pub name: &'static str,
    case_insensitive: bool,
    forward: HashMap<String, Token>,
    max_token_chars: usize,
    reverse: HashMap<String, &'static str>,
}

impl RomanTable {
    fn compile(
        name: &'static str,
        case_insensitive: bool,
        tokens: &[(&'static str, Token)],
        reverse_extra: &[(&'static str, &'static str)],
    ) -> Self {
        let mut forward = HashMap::new();
        let mut reverse: HashMap<String, &'static str> = HashMap::new();

        for &(roman, token) in tokens.iter().chain(DIGITS.iter()) {
            forward.entry(roman.to_string()).or_insert(token);
            let devs: [&str; 2] = match token {
                Token::Vowel(letter, sign) => [letter, sign],
                Token::Consonant(dev) if !dev.contains(VIRAMA) => [dev, ""],
                Token::Consonant(_) => ["", ""],
                Token::Mark(dev) | Token::Symbol(dev) => [dev, ""],
            };
            for dev in devs.into_iter().filter(|d| !d.is_empty()) {
                reverse.entry(dev.to_string()).or_insert(roman);
            }
        }
        for &(dev, roman) in reverse_extra.iter().chain(SHORT_VOWELS.iter()) {
            reverse.entry(dev.to_string()).or_insert(roman);
        }

        let max_token_chars = forward.keys().map(|k| k.chars().count()).max().unwrap_or(1);
        Self {
            name,
            case_insensitive,
            forward,
            max_token_chars,
            reverse,
        }
    }

    /// Roman → Devanagari.
    fn parse(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let keys: Vec<char> = if self.case_insensitive {
            chars.iter().map(|&c| fold_case(c)).collect()
        } else {
            chars.clone()
        };

        let mut out = String::with_capacity(text.len() * 3);
        let mut had_consonant = false;
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_token_chars.min(chars.len() - i);
            let matched = (1..=longest).rev().find_map(|len| {
                let candidate: String = keys[i..i + len].iter().collect();
                self.forward.get(&candidate).map(|t| (len, *t))
            });

            match matched {
                Some((len, Token::Consonant(dev))) => {
                    if had_consonant {
                        out.push(VIRAMA);
                    }
                    out.push_str(dev);
                    had_consonant = true;
                    i += len;
                }
                Some((len, Token::Vowel(letter, sign))) => {
                    out.push_str(if had_consonant { sign } else { letter });
                    had_consonant = false;
                    i += len;
                }
                Some((len, Token::Mark(dev))) => {
                    out.push_str(dev);
                    had_consonant = false;
                    i += len;
                }
                Some((len, Token::Symbol(dev))) => {
                    if had_consonant {
                        out.push(VIRAMA);
                    }
                    out.push_str(dev);
                    had_consonant = false;
                    i += len;
                }
                None => {
                    if had_consonant {
                        out.push(VIRAMA);
                    }
                    out.push(chars[i]);
                    had_consonant = false;
                    i += 1;
                }
            }
        }
        if had_consonant {
            out.push(VIRAMA);
        }
        out
    }

    /// Devanagari → Roman.
    fn render(&self, text: &str) -> String {
        let chars: Vec<char> = text
            .chars()
            .flat_map(|c| match decompose_nukta(c) {
                Some(pair) => pair.to_vec(),
                None => vec![c],
            })
            .collect();

        let mut out = String::with_capacity(text.len());
        let mut pending_a = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if is_consonant(c) {
                if pending_a {
                    out.push('a');
                }
                let with_nukta = chars.get(i + 1) == Some(&NUKTA);
                let pair: String = chars[i..(i + 2).min(chars.len())].iter().collect();
                match self.reverse.get(&pair).filter(|_| with_nukta) {
                    Some(roman) => {
                        out.push_str(roman);
                        i += 2;
                    }
                    None => {
                        self.push_reverse(c, &mut out);
                        i += 1;
                    }
                }
                pending_a = true;
                continue;
            }

            match c {
                VIRAMA => pending_a = false,
                NUKTA | '\u{200C}' | '\u{200D}' => {}
                _ if is_vowel_sign(c) => {
                    self.push_reverse(c, &mut out);
                    pending_a = false;
                }
                _ => {
                    if pending_a {
                        out.push('a');
                    }
                    self.push_reverse(c, &mut out);
                    pending_a = false;
                }
            }
            i += 1;
        }
        if pending_a {
            out.push('a');
        }
        out
    }

    fn push_reverse(&self, c: char, out: &mut String) {
        let mut buf = [0u8; 4];
        match self.reverse.get(c.encode_utf8(&mut buf) as &str) {
            Some(roman) => out.push_str(roman),
            None => out.push(c),
        }
    }
}

fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

const DIGITS: &[(&str, Token)] = &[
    ("0", S("०")),
    ("1", S("१")),
    ("2", S("२")),
    ("3", S("३")),
    ("4", S("४")),
    ("5", S("५")),
    ("6", S("६")),
    ("7", S("७")),
    ("8", S("८")),
    ("9", S("९")),
];

/// Dravidian short e/o and the candra vowels, output only.
const SHORT_VOWELS: &[(&str, &str)] = &[
    ("ऎ", "e"),
    ("ॆ", "e"),
    ("ऒ", "o"),
    ("ॊ", "o"),
    ("ऍ", "e"),
    ("ॅ", "e"),
    ("ऑ", "o"),
    ("ॉ", "o"),
];

static IAST: Lazy<RomanTable> = Lazy::new(|| {
    RomanTable::compile(
        "IAST",
        true,
        &[
            ("a", V("अ", "")),
            ("ā", V("आ", "ा")),
            ("i", V("इ", "ि")),
            ("ī", V("ई", "ी")),
            ("u", V("उ", "ु")),
            ("ū", V("ऊ", "ू")),
            ("ṛ", V("ऋ", "ृ")),
            ("ṝ", V("ॠ", "ॄ")),
            ("ḷ", V("ऌ", "ॢ")),
            ("ḹ", V("ॡ", "ॣ")),
            ("e", V("ए", "े")),
            ("ai", V("ऐ", "ै")),
            ("o", V("ओ", "ो")),
            ("au", V("औ", "ौ")),
            ("k", C("क")),
            ("kh", C("ख")),
            ("g", C("ग")),
            ("gh", C("घ")),
            ("ṅ", C("ङ")),
            ("c", C("च")),
            ("ch", C("छ")),
            ("j", C("ज")),
            ("jh", C("झ")),
            ("ñ", C("ञ")),
            ("ṭ", C("ट")),
            ("ṭh", C("ठ")),
            ("ḍ", C("ड")),
            ("ḍh", C("ढ")),
            ("ṇ", C("ण")),
            ("t", C("त")),
            ("th", C("थ")),
            ("d", C("द")),
            ("dh", C("ध")),
            ("n", C("न")),
            ("p", C("प")),
            ("ph", C("फ")),
            ("b", C("ब")),
            ("bh", C("भ")),
            ("m", C("म")),
            ("y", C("य")),
            ("r", C("र")),
            ("l", C("ल")),
            ("v", C("व")),
            ("ś", C("श")),
            ("ṣ", C("ष")),
            ("s", C("स")),
            ("h", C("ह")),
            ("ḻ", C("ळ")),
            ("ṃ", M("ं")),
            ("ḥ", M("ः")),
            ("m\u{310}", M("ँ")),
            ("'", S("ऽ")),
            ("|", S("।")),
            ("||", S("॥")),
            // Alternative spellings and combining-mark forms.
            ("ṁ", M("ं")),
            ("r\u{325}", V("ऋ", "ृ")),
            ("r\u{325}\u{304}", V("ॠ", "ॄ")),
            ("l\u{325}", V("ऌ", "ॢ")),
            ("l\u{325}\u{304}", V("ॡ", "ॣ")),
            ("a\u{304}", V("आ", "ा")),
            ("i\u{304}", V("ई", "ी")),
            ("u\u{304}", V("ऊ", "ू")),
            ("r\u{323}", V("ऋ", "ृ")),
            ("r\u{323}\u{304}", V("ॠ", "ॄ")),
            ("l\u{323}", V("ऌ", "ॢ")),
            ("l\u{323}\u{304}", V("ॡ", "ॣ")),
            ("n\u{307}", C("ङ")),
            ("n\u{303}", C("ञ")),
            ("t\u{323}", C("ट")),
            ("t\u{323}h", C("ठ")),
            ("d\u{323}", C("ड")),
            ("d\u{323}h", C("ढ")),
            ("n\u{323}", C("ण")),
            ("s\u{301}", C("श")),
            ("s\u{323}", C("ष")),
            ("m\u{323}", M("ं")),
            ("m\u{307}", M("ं")),
            ("h\u{323}", M("ः")),
        ],
        &[
            ("ऩ", "ṉ"),
            ("ऱ", "ṟ"),
            ("ऴ", "ḻ"),
            ("ॐ", "oṃ"),
            ("\u{0915}\u{093C}", "q"),
            ("\u{0916}\u{093C}", "k͟h"),
            ("\u{0917}\u{093C}", "ġ"),
            ("\u{091C}\u{093C}", "z"),
            ("\u{0921}\u{093C}", "ṙ"),
            ("\u{0922}\u{093C}", "ṙh"),
            ("\u{092B}\u{093C}", "f"),
            ("\u{092F}\u{093C}", "ẏ"),
        ],
    )
});

static ITRANS: Lazy<RomanTable> = Lazy::new(|| {
    RomanTable::compile(
        "ITRANS",
        false,
        &[
            ("a", V("अ", "")),
            ("A", V("आ", "ा")),
            ("aa", V("आ", "ा")),
            ("i", V("इ", "ि")),
            ("I", V("ई", "ी")),
            ("ii", V("ई", "ी")),
            ("u", V("उ", "ु")),
            ("U", V("ऊ", "ू")),
            ("uu", V("ऊ", "ू")),
            ("RRi", V("ऋ", "ृ")),
            ("R^i", V("ऋ", "ृ")),
            ("RRI", V("ॠ", "ॄ")),
            ("R^I", V("ॠ", "ॄ")),
            ("LLi", V("ऌ", "ॢ")),
            ("L^i", V("ऌ", "ॢ")),
            ("LLI", V("ॡ", "ॣ")),
            ("L^I", V("ॡ", "ॣ")),
            ("e", V("ए", "े")),
            ("ai", V("ऐ", "ै")),
            ("o", V("ओ", "ो")),
            ("au", V("औ", "ौ")),
            ("k", C("क")),
            ("kh", C("ख")),
            ("g", C("ग")),
            ("gh", C("घ")),
            ("~N", C("ङ")),
            ("N^", C("ङ")),
            ("ch", C("च")),
            ("c", C("च")),
            ("Ch", C("छ")),
            ("chh", C("छ")),
            ("j", C("ज")),
            ("jh", C("झ")),
            ("~n", C("ञ")),
            ("JN", C("ञ")),
            ("T", C("ट")),
            ("Th", C("ठ")),
            ("D", C("ड")),
            ("Dh", C("ढ")),
            ("N", C("ण")),
            ("t", C("त")),
            ("th", C("थ")),
            ("d", C("द")),
            ("dh", C("ध")),
            ("n", C("न")),
            ("p", C("प")),
            ("ph", C("फ")),
            ("b", C("ब")),
            ("bh", C("भ")),
            ("m", C("म")),
            ("y", C("य")),
            ("r", C("र")),
            ("l", C("ल")),
            ("v", C("व")),
            ("w", C("व")),
            ("sh", C("श")),
            ("Sh", C("ष")),
            ("shh", C("ष")),
            ("s", C("स")),
            ("h", C("ह")),
            ("L", C("ळ")),
            ("ld", C("ळ")),
            ("x", C("क्ष")),
            ("kSh", C("क्ष")),
            ("GY", C("ज्ञ")),
            ("dny", C("ज्ञ")),
            ("q", C("\u{0915}\u{093C}")),
            ("K", C("\u{0916}\u{093C}")),
            ("G", C("\u{0917}\u{093C}")),
            ("z", C("\u{091C}\u{093C}")),
            ("J", C("\u{091C}\u{093C}")),
            (".D", C("\u{0921}\u{093C}")),
            (".Dh", C("\u{0922}\u{093C}")),
            ("f", C("\u{092B}\u{093C}")),
            ("Y", C("\u{092F}\u{093C}")),
            ("M", M("ं")),
            (".n", M("ं")),
            ("H", M("ः")),
            (".N", M("ँ")),
            (".a", S("ऽ")),
            ("|", S("।")),
            ("||", S("॥")),
            ("OM", S("ॐ")),
            ("AUM", S("ॐ")),
        ],
        &[("ऩ", "n"), ("ऱ", "r"), ("ऴ", "zh")],
    )
});

static HK: Lazy<RomanTable> = Lazy::new(|| {
    RomanTable::compile(
        "HK",
        false,
        &[
            ("a", V("अ", "")),
            ("A", V("आ", "ा")),
            ("i", V("इ", "ि")),
            ("I", V("ई", "ी")),
            ("u", V("उ", "ु")),
            ("U", V("ऊ", "ू")),
            ("R", V("ऋ", "ृ")),
            ("RR", V("ॠ", "ॄ")),
            ("lR", V("ऌ", "ॢ")),
            ("lRR", V("ॡ", "ॣ")),
            ("e", V("ए", "े")),
            ("ai", V("ऐ", "ै")),
            ("o", V("ओ", "ो")),
            ("au", V("औ", "ौ")),
            ("k", C("क")),
            ("kh", C("ख")),
            ("g", C("ग")),
            ("gh", C("घ")),
            ("G", C("ङ")),
            ("c", C("च")),
            ("ch", C("छ")),
            ("j", C("ज")),
            ("jh", C("झ")),
            ("J", C("ञ")),
            ("T", C("ट")),
            ("Th", C("ठ")),
            ("D", C("ड")),
            ("Dh", C("ढ")),
            ("N", C("ण")),
            ("t", C("त")),
            ("th", C("थ")),
            ("d", C("द")),
            ("dh", C("ध")),
            ("n", C("न")),
            ("p", C("प")),
            ("ph", C("फ")),
            ("b", C("ब")),
            ("bh", C("भ")),
            ("m", C("म")),
            ("y", C("य")),
            ("r", C("र")),
            ("l", C("ल")),
            ("v", C("व")),
            ("z", C("श")),
            ("S", C("ष")),
            ("s", C("स")),
            ("h", C("ह")),
            ("L", C("ळ")),
            ("M", M("ं")),
            ("H", M("ः")),
            ("~", M("ँ")),
            ("'", S("ऽ")),
            ("|", S("।")),
            ("||", S("॥")),
        ],
        &[("ऩ", "n"), ("ऱ", "r"), ("ऴ", "L"), ("ॐ", "OM")],
    )
});

static SLP1: Lazy<RomanTable> = Lazy::new(|| {
    RomanTable::compile(
        "SLP1",
        false,
        &[
            ("a", V("अ", "")),
            ("A", V("आ", "ा")),
            ("i", V("इ", "ि")),
            ("I", V("ई", "ी")),
            ("u", V("उ", "ु")),
            ("U", V("ऊ", "ू")),
            ("f", V("ऋ", "ृ")),
            ("F", V("ॠ", "ॄ")),
            ("x", V("ऌ", "ॢ")),
            ("X", V("ॡ", "ॣ")),
            ("e", V("ए", "े")),
            ("E", V("ऐ", "ै")),
            ("o", V("ओ", "ो")),
            ("O", V("औ", "ौ")),
            ("k", C("क")),
            ("K", C("ख")),
            ("g", C("ग")),
            ("G", C("घ")),
            ("N", C("ङ")),
            ("c", C("च")),
            ("C", C("छ")),
            ("j", C("ज")),
            ("J", C("झ")),
            ("Y", C("ञ")),
            ("w", C("ट")),
            ("W", C("ठ")),
            ("q", C("ड")),
            ("Q", C("ढ")),
            ("R", C("ण")),
            ("t", C("त")),
            ("T", C("थ")),
            ("d", C("द")),
            ("D", C("ध")),
            ("n", C("न")),
            ("p", C("प")),
            ("P", C("फ")),
            ("b", C("ब")),
            ("B", C("भ")),
            ("m", C("म")),
            ("y", C("य")),
            ("r", C("र")),
            ("l", C("ल")),
            ("v", C("व")),
            ("S", C("श")),
            ("z", C("ष")),
            ("s", C("स")),
            ("h", C("ह")),
            ("L", C("ळ")),
            ("M", M("ं")),
            ("H", M("ः")),
            ("~", M("ँ")),
            ("'", S("ऽ")),
            (".", S("।")),
            ("..", S("॥")),
        ],
        &[("ऩ", "n"), ("ऱ", "r"), ("ऴ", "L"), ("ॐ", "oM")],
    )
});

static VELTHUIS: Lazy<RomanTable> = Lazy::new(|| {
    RomanTable::compile(
        "VELTHUIS",
        false,
        &[
            ("a", V("अ", "")),
            ("aa", V("आ", "ा")),
            ("i", V("इ", "ि")),
            ("ii", V("ई", "ी")),
            ("u", V("उ", "ु")),
            ("uu", V("ऊ", "ू")),
            (".r", V("ऋ", "ृ")),
            (".rr", V("ॠ", "ॄ")),
            (".l", V("ऌ", "ॢ")),
            (".ll", V("ॡ", "ॣ")),
            ("e", V("ए", "े")),
            ("ai", V("ऐ", "ै")),
            ("o", V("ओ", "ो")),
            ("au", V("औ", "ौ")),
            ("k", C("क")),
            ("kh", C("ख")),
            ("g", C("ग")),
            ("gh", C("घ")),
            ("\"n", C("ङ")),
            ("c", C("च")),
            ("ch", C("छ")),
            ("j", C("ज")),
            ("jh", C("झ")),
            ("~n", C("ञ")),
            (".t", C("ट")),
            (".th", C("ठ")),
            (".d", C("ड")),
            (".dh", C("ढ")),
            (".n", C("ण")),
            ("t", C("त")),
            ("th", C("थ")),
            ("d", C("द")),
            ("dh", C("ध")),
            ("n", C("न")),
            ("p", C("प")),
            ("ph", C("फ")),
            ("b", C("ब")),
            ("bh", C("भ")),
            ("m", C("म")),
            ("y", C("य")),
            ("r", C("र")),
            ("l", C("ल")),
            ("v", C("व")),
            ("\"s", C("श")),
            (".s", C("ष")),
            ("s", C("स")),
            ("h", C("ह")),
            ("L", C("ळ")),
            (".m", M("ं")),
            (".h", M("ः")),
            ("/", M("ँ")),
            (".a", S("ऽ")),
            ("|", S("।")),
            ("||", S("॥")),
        ],
        &[("ऩ", "n"), ("ऱ", "r"), ("ऴ", "L"), ("ॐ", "o.m")],
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    fn tr(source: &str, target: &str, text: &str) -> String {
        SanscriptEngine::new()
            .convert(source, target, text)
            .unwrap_or_else(|e| panic!("{source}→{target} failed: {e}"))
    }

    #[test]
    fn itrans_namaste_to_devanagari() {
        assert_eq!(tr("ITRANS", "DEVANAGARI", "namaste"), "नमस्ते");
    }

    #[test]
    fn every_roman_scheme_spells_namaste_alike() {
        for scheme in ["IAST", "HK", "SLP1", "VELTHUIS"] {
            assert_eq!(tr(scheme, "DEVANAGARI", "namaste"), "नमस्ते", "{scheme}");
        }
    }

    #[test]
    fn devanagari_to_iast() {
        assert_eq!(tr("DEVANAGARI", "IAST", "नमस्ते"), "namaste");
        assert_eq!(tr("DEVANAGARI", "IAST", "संस्कृतम्"), "saṃskṛtam");
        assert_eq!(tr("DEVANAGARI", "ITRANS", "रामः"), "rAmaH");
    }

    #[test]
    fn iast_to_devanagari_with_final_virama() {
        assert_eq!(tr("IAST", "DEVANAGARI", "saṃskṛtam"), "संस्कृतम्");
        assert_eq!(tr("IAST", "DEVANAGARI", "so'ham"), "सोऽहम्");
    }

    #[test]
    fn iast_ignores_case_and_accepts_combining_marks() {
        assert_eq!(tr("IAST", "DEVANAGARI", "Rāma"), "राम");
        assert_eq!(tr("IAST", "DEVANAGARI", "ra\u{304}ma"), "राम");
    }

    #[test]
    fn slp1_visarga() {
        assert_eq!(tr("SLP1", "DEVANAGARI", "rAmaH"), "रामः");
    }

    #[test]
    fn devanagari_to_bengali_and_tamil() {
        assert_eq!(tr("DEVANAGARI", "BENGALI", "नमस्ते"), "নমস্তে");
        assert_eq!(tr("DEVANAGARI", "TAMIL", "नमस्ते"), "நமஸ்தே");
    }

    #[test]
    fn tamil_folds_voiced_and_aspirated_stops() {
        assert_eq!(tr("DEVANAGARI", "TAMIL", "भारत"), "பாரத");
        assert_eq!(tr("DEVANAGARI", "TAMIL", "संगम"), "ஸம்கம");
    }

    #[test]
    fn bengali_has_no_separate_va() {
        assert_eq!(tr("DEVANAGARI", "BENGALI", "विश्व"), "বিশ্ব");
    }

    #[test]
    fn gurmukhi_vocalic_r_and_ssa() {
        assert_eq!(
            tr("DEVANAGARI", "GURMUKHI", "कृष्ण"),
            "\u{0A15}\u{0A4D}\u{0A30}\u{0A3F}\u{0A36}\u{0A4D}\u{0A23}"
        );
    }

    #[test]
    fn brahmic_to_brahmic_goes_through_pivot() {
        assert_eq!(tr("TAMIL", "DEVANAGARI", "நமஸ்தே"), "नमस्ते");
        assert_eq!(tr("BENGALI", "TELUGU", "নমস্তে"), "నమస్తే");
    }

    #[test]
    fn malayalam_chillu_is_a_dead_consonant() {
        assert_eq!(tr("MALAYALAM", "DEVANAGARI", "അവൻ"), "अवन्");
        assert_eq!(tr("MALAYALAM", "IAST", "അവൻ"), "avan");
    }

    #[test]
    fn roman_to_roman() {
        assert_eq!(tr("ITRANS", "IAST", "kRRiShNa"), "kṛṣṇa");
        assert_eq!(tr("IAST", "HK", "kṛṣṇa"), "kRSNa");
    }

    #[test]
    fn nukta_letters_round_trip_through_itrans() {
        let dev = tr("ITRANS", "DEVANAGARI", "zarA");
        assert_eq!(dev, "\u{091C}\u{093C}\u{0930}\u{093E}");
        assert_eq!(tr("DEVANAGARI", "ITRANS", "\u{095B}रा"), "zarA");
    }

    #[test]
    fn digits_and_danda() {
        assert_eq!(tr("ITRANS", "DEVANAGARI", "108"), "१०८");
        assert_eq!(tr("ITRANS", "DEVANAGARI", "rAma ||"), "राम ॥");
        assert_eq!(tr("DEVANAGARI", "BENGALI", "राम।"), "রাম।");
    }

    #[test]
    fn unmapped_characters_pass_through() {
        assert_eq!(tr("ITRANS", "DEVANAGARI", "namaste!"), "नमस्ते!");
        assert_eq!(tr("DEVANAGARI", "TAMIL", "abc नम"), "abc நம");
    }

    #[test]
    fn same_brahmic_script_is_identity() {
        assert_eq!(tr("BENGALI", "Bengali", "ভাষা"), "ভাষা");
    }

    #[test]
    fn aliases_resolve() {
        for name in [
            "Roman_IAST",
            "roman",
            "Harvard-Kyoto",
            "Roman_Harvard-Kyoto",
            "Punjabi",
            "Odia",
            "roman_itrans",
            "Velthuis",
        ] {
            assert!(SanscriptEngine::supports(name), "{name}");
        }
    }

    #[test]
    fn unknown_scheme_is_reported_by_name() {
        let err = SanscriptEngine::new()
            .convert("ITRANS", "Klingon", "namaste")
            .unwrap_err();
        assert_eq!(
            err,
            TransliterationError::UnsupportedScheme {
                scheme: "Klingon".into()
            }
        );
    }

    #[test]
    fn output_is_deterministic() {
        let engine = SanscriptEngine::new();
        let a = engine.convert("DEVANAGARI", "KANNADA", "संस्कृतम्").unwrap();
        let b = engine.convert("DEVANAGARI", "KANNADA", "संस्कृतम्").unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn backend_trait_delegates() {
        let engine = SanscriptEngine::new();
        engine.probe().await.unwrap();
        let out = engine
            .transliterate(&TransliterationRequest::new("ITRANS", "DEVANAGARI", "namaste"))
            .await
            .unwrap();
        assert_eq!(out, "नमस्ते");
    }
}
