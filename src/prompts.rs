//! System prompts for vision-model OCR.
//!
//! The vision engine is asked for a literal transcription, not Markdown:
//! the text feeds a code-point classifier and a transliterator, so any
//! formatting the model adds becomes noise in both.

/// Default system prompt for transcribing a page image.
pub const DEFAULT_OCR_PROMPT: &str = r#"You are a precise OCR engine. Transcribe ALL text visible in the image exactly as written.

Rules:
1. Keep the original script. Never translate and never transliterate.
2. Preserve every diacritic, vowel sign, virama, nukta and conjunct exactly.
3. Keep the reading order and line breaks of the page; separate paragraphs with a blank line.
4. Do not add Markdown, headings, commentary or explanations.
5. Do not wrap the output in code fences.
6. If the image contains no text, output nothing."#;

/// Build the hint line appended when the user supplied an OCR language code.
///
/// The code is passed through verbatim; the model is told it is a hint, not
/// a constraint.
pub fn language_hint_context(language: &str) -> String {
    format!(
        "Language hint from the user: \"{}\". Text in other languages or scripts must still be transcribed as-is.",
        language
    )
}
