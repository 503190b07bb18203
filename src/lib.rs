//! # edgequake-translit
//!
//! Take one document (plain text, an image, or a PDF), extract its text,
//! guess which writing system it is in, and transliterate it into one or
//! more target scripts.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Document
//!  │
//!  ├─ 1. Input     resolve local file or download from URL
//!  ├─ 2. Acquire   decode text | render PDF pages + OCR | decode image + OCR
//!  ├─ 3. Detect    majority vote over Unicode code-point ranges
//!  ├─ 4. Scheme    detected script → source scheme (or the user's choice)
//!  ├─ 5. Dispatch  one transliteration call per target, failures isolated
//!  └─ 6. Output    per-target text, previews, `{name}_{target}.txt` files
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_translit::{Pipeline, PipelineConfig, RunOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder()
//!         .targets(["DEVANAGARI", "TAMIL"])
//!         .build()?;
//!     let pipeline = Pipeline::new(config).await?;
//!     match pipeline.run_input("poem.txt").await? {
//!         RunOutcome::NoText { .. } => eprintln!("no text found"),
//!         RunOutcome::Transliterated(out) => {
//!             for target in &out.outputs {
//!                 println!("{}:\n{}", target.target, target.rendered_text());
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Profiles
//!
//! | Profile | Detection table | Source schemes | Default backend |
//! |---------|-----------------|----------------|-----------------|
//! | `indic` (default) | 9 Indic blocks + Latin | `ITRANS`, `DEVANAGARI`, ... | built-in tables |
//! | `aksharamukha` | 21 scripts, Latin first | `Roman`, `Devanagari`, ... | Aksharamukha API |
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `translit` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Script detection is a heuristic: it counts code points per range and
//! picks the largest tally. Mixed-script text may be misclassified; pass an
//! explicit source scheme when that matters.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod capability;
pub mod catalog;
pub mod config;
pub mod detect;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;
pub mod scheme;
pub mod translit;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use capability::{Capabilities, CapabilityReport};
pub use config::{
    BackendKind, OcrKind, PageSelection, PipelineConfig, PipelineConfigBuilder, Profile,
};
pub use detect::{detect_script, Detected, DetectionResult, ScriptRange, ScriptTable};
pub use document::{Document, DocumentKind};
pub use error::{AcquisitionError, OcrError, TranslitError, TransliterationError};
pub use output::{
    download_file_name, preview, RunOutcome, RunOutput, RunStats, SchemeOrigin, TargetOutput,
};
pub use pipeline::acquire::{acquire_text, AcquisitionPath, ExtractedText};
pub use pipeline::ocr::{OcrEngine, TesseractEngine, VisionOcrEngine};
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use run::{list_targets, transliterate_input, Classification, DetectReport, Pipeline};
pub use scheme::SchemeMap;
pub use translit::{
    transliterate_all, AksharamukhaClient, SanscriptEngine, TransliterationBackend,
    TransliterationRequest,
};
