//! Enumerated script and scheme catalogs offered to the user.
//!
//! Two catalogs exist because two backends exist: Aksharamukha knows well
//! over a hundred scripts, the built-in engine knows the Brahmic scripts of
//! the ISCII family plus five Roman schemes. Display names are what the user
//! picks; [`engine_name`] turns them into the identifiers a backend expects.

/// Target scripts understood by the Aksharamukha backend.
pub const AKSHARAMUKHA_SCRIPTS: &[&str] = &[
    "Ahom", "Arabic", "Ariyaka", "Assamese", "Avestan", "Balinese", "Batak_Karo",
    "Batak_Mandailing", "Batak_Pakpak", "Batak_Simalungun", "Batak_Toba", "Bengali",
    "Bhaiksuki", "Brahmi", "Buginese", "Buhid", "Burmese", "Chakma", "Cham", "Cyrillic",
    "Devanagari", "Dives_Akuru", "Dogra", "Elymaic", "Ethiopic", "Gondi_Gunjala",
    "Gondi_Masaram", "Grantha", "Grantha_Pandya", "Gujarati", "Hanunoo", "Hatran", "Hebrew",
    "Imperial_Aramaic", "Inscriptional_Pahlavi", "Inscriptional_Parthian", "Hiragana",
    "Katakana", "Javanese", "Kaithi", "Kannada", "Kawi", "Khamti_Shan", "Kharoshthi", "Khmer",
    "Khojki", "Khom_Thai", "Khudawadi", "Lao", "Lepcha", "Limbu", "Mahajani", "Makasar",
    "Malayalam", "Manichaean", "Marchen", "Meetei_Mayek", "Modi", "Mon", "Mongolian_Ali_Gali",
    "Mro", "Multani", "Nabataean", "Nandinagari", "Newa", "Old_North_Arabian", "Old_Persian",
    "Old_Sogdian", "Old_South_Arabian", "Oriya", "Pallava", "Palmyrene", "Persian", "PhagsPa",
    "Phoenician", "Psalter_Pahlavi", "Punjabi", "Ranjana", "Rejang", "Rohingya", "Roman",
    "Roman_DMG_Persian", "Roman_Harvard-Kyoto", "Roman_IAST", "Roman_IPA_Indic",
    "Roman_ISO_15919", "Roman_ITRANS", "Roman_SLP1", "Roman_Semitic", "Roman_Titus",
    "Roman_Velthuis", "Samaritan", "Santali", "Saurashtra", "Shahmukhi", "Shan", "Sharada",
    "Siddham", "Sinhala", "Sogdian", "Sora_Sompeng", "Soyombo", "Sundanese", "Syloti_Nagari",
    "Syriac_Eastern", "Syriac_Estrangela", "Syriac_Western", "Tagalog", "Tagbanwa", "Tai_Laing",
    "Takri", "Tamil", "Tamil_Extended", "Tamil_Brahmi", "Telugu", "Thaana", "Thai",
    "Tham_Lanna", "Tibetan", "Tirhuta", "Ugaritic", "Urdu", "Vatteluttu", "Wancho",
    "Warang_Citi", "Zanabazar_Square",
];

/// Default targets when the Aksharamukha profile is used without `--target`.
pub const AKSHARAMUKHA_DEFAULT_TARGETS: &[&str] = &["Devanagari", "Bengali", "Roman"];

/// Target schemes offered by the Indic profile.
pub const INDIC_TARGETS: &[&str] = &[
    "DEVANAGARI", "BENGALI", "GUJARATI", "ORIYA", "TAMIL", "TELUGU", "KANNADA", "MALAYALAM",
    "IAST", "ITRANS",
];

/// Default targets when the Indic profile is used without `--target`.
pub const INDIC_DEFAULT_TARGETS: &[&str] = &["DEVANAGARI", "BENGALI"];

/// Input schemes a user may pick instead of relying on detection.
pub const INDIC_SOURCE_SCHEMES: &[&str] = &[
    "ITRANS", "IAST", "HK", "SLP1", "VELTHUIS", "DEVANAGARI", "BENGALI", "GUJARATI", "TAMIL",
];

/// Separator that replaces spaces in display names.
pub const NAME_SEPARATOR: char = '_';

/// Normalise a display name into the identifier a backend expects.
///
/// Leading/trailing whitespace is dropped and every inner run of whitespace
/// becomes a single [`NAME_SEPARATOR`]: `"Tamil Extended"` → `"Tamil_Extended"`.
pub fn engine_name(display: &str) -> String {
    display
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(&NAME_SEPARATOR.to_string())
}

/// Find `name` in `catalog`, ignoring case and treating spaces as separators.
///
/// Returns the catalog's own spelling.
pub fn lookup<'a>(catalog: &'a [&'a str], name: &str) -> Option<&'a str> {
    let wanted = engine_name(name);
    catalog
        .iter()
        .copied()
        .find(|entry| entry.eq_ignore_ascii_case(&wanted))
}
