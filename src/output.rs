//! Result types for a transliteration run.
//!
//! A run either finds no text ([`RunOutcome::NoText`]) or produces one
//! [`TargetOutput`] per selected target, in selection order, collected in a
//! [`RunOutput`]. Everything here serialises to JSON for `--json`.

use crate::detect::DetectionResult;
use crate::error::{TranslitError, TransliterationError};
use crate::pipeline::acquire::ExtractedText;
use crate::pipeline::input::base_name;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default preview length for extracted text, in characters.
pub const TEXT_PREVIEW_CHARS: usize = 1000;

/// Default preview length for each output, in characters.
pub const OUTPUT_PREVIEW_CHARS: usize = 2000;

/// The first `max_chars` characters of `text`, cut on a character boundary.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Whether [`preview`] would cut `text`.
pub fn is_truncated(text: &str, max_chars: usize) -> bool {
    text.char_indices().nth(max_chars).is_some()
}

/// `"{upload_name}_{target}.txt"` as a single path component.
///
/// Directories in the upload name are dropped and any remaining `/` or `\\`
/// in either part becomes `_`, so the result always stays inside the
/// directory it is joined to.
pub fn download_file_name(upload_name: &str, target: &str) -> String {
    format!(
        "{}_{}.txt",
        without_separators(&base_name(upload_name)),
        without_separators(target)
    )
}

fn without_separators(s: &str) -> String {
    s.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

// ── Per-target output ────────────────────────────────────────────────────

/// Outcome of transliterating into one target.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetOutput {
    /// Display name as the user selected it.
    pub target: String,
    /// Identifier handed to the backend.
    pub engine_target: String,
    pub result: Result<String, TransliterationError>,
}

impl TargetOutput {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }

    pub fn text(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    pub fn error(&self) -> Option<&TransliterationError> {
        self.result.as_ref().err()
    }

    /// The output text, or an error marker naming the target.
    pub fn rendered_text(&self) -> Cow<'_, str> {
        match &self.result {
            Ok(text) => Cow::Borrowed(text),
            Err(e) => Cow::Owned(format!(
                "[ERROR transliteration to {}: {}]",
                self.target, e
            )),
        }
    }

    /// UTF-8 bytes of [`Self::rendered_text`].
    pub fn bytes(&self) -> Vec<u8> {
        self.rendered_text().into_owned().into_bytes()
    }

    pub fn file_name(&self, upload_name: &str) -> String {
        download_file_name(upload_name, &self.target)
    }
}

impl Serialize for TargetOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("TargetOutput", 5)?;
        s.serialize_field("target", &self.target)?;
        s.serialize_field("engine_target", &self.engine_target)?;
        s.serialize_field("ok", &self.is_ok())?;
        s.serialize_field("text", &self.text())?;
        s.serialize_field("error", &self.error().map(|e| e.to_string()))?;
        s.end()
    }
}

// ── Whole run ────────────────────────────────────────────────────────────

/// Where the source scheme came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeOrigin {
    /// Looked up from the detected script.
    Inferred,
    /// Picked by the user.
    Chosen,
}

/// Timing and counts for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub total_targets: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub acquire_duration_ms: u64,
    pub dispatch_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// Upload name of the document.
    pub document: String,
    pub extracted: ExtractedText,
    pub detection: DetectionResult,
    pub source_scheme: String,
    pub scheme_origin: SchemeOrigin,
    /// One entry per selected target, in selection order.
    pub outputs: Vec<TargetOutput>,
    pub stats: RunStats,
}

impl RunOutput {
    pub fn failed_targets(&self) -> impl Iterator<Item = &TargetOutput> {
        self.outputs.iter().filter(|o| o.is_err())
    }

    pub fn get(&self, target: &str) -> Option<&TargetOutput> {
        self.outputs.iter().find(|o| o.target == target)
    }

    /// Write every successful output into `dir` as `{document}_{target}.txt`.
    ///
    /// Each file is written to a temporary name and renamed into place.
    /// Failed targets are skipped. Returns the written paths in target order.
    pub async fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, TranslitError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| TranslitError::OutputWriteFailed {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let mut written = Vec::new();
        for output in &self.outputs {
            let Some(text) = output.text() else {
                debug!("Skipping failed target {}", output.target);
                continue;
            };
            let path = dir.join(output.file_name(&self.document));
            write_atomic(&path, text.as_bytes()).await?;
            written.push(path);
        }
        info!("Wrote {} output file(s) to {}", written.len(), dir.display());
        Ok(written)
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TranslitError> {
    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| TranslitError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| TranslitError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// What a run ended with.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Acquisition succeeded but found only whitespace. Nothing was dispatched.
    NoText {
        document: String,
        extracted: ExtractedText,
    },
    Transliterated(RunOutput),
}

impl RunOutcome {
    pub fn output(&self) -> Option<&RunOutput> {
        match self {
            RunOutcome::Transliterated(out) => Some(out),
            RunOutcome::NoText { .. } => None,
        }
    }

    pub fn into_output(self) -> Option<RunOutput> {
        match self {
            RunOutcome::Transliterated(out) => Some(out),
            RunOutcome::NoText { .. } => None,
        }
    }

    pub fn extracted(&self) -> &ExtractedText {
        match self {
            RunOutcome::Transliterated(out) => &out.extracted,
            RunOutcome::NoText { extracted, .. } => extracted,
        }
    }

    pub fn is_no_text(&self) -> bool {
        matches!(self, RunOutcome::NoText { .. })
    }
}
