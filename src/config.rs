//! Configuration types for a transliteration run.
//!
//! All behaviour is controlled through [`PipelineConfig`], built via its
//! [`PipelineConfigBuilder`]. The [`Profile`] picks the classification table,
//! the source-scheme map and the target catalog in one go; the backend kinds
//! pick which OCR engine and which transliterator do the work.

use crate::catalog;
use crate::detect::{ScriptRange, INDIC_SCRIPT_RANGES, WIDE_SCRIPT_RANGES};
use crate::error::TranslitError;
use crate::pipeline::ocr::OcrEngine;
use crate::progress::ProgressCallback;
use crate::scheme::{SchemeMap, AKSHARAMUKHA_SCHEMES, INDIC_SCHEMES};
use crate::translit::TransliterationBackend;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Public Aksharamukha API host.
pub const DEFAULT_AKSHARAMUKHA_URL: &str = "https://aksharamukha-plugin.appspot.com";

/// Configuration for one document → transliteration run.
///
/// Built via [`PipelineConfig::builder()`] or [`PipelineConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_translit::{PipelineConfig, Profile};
///
/// let config = PipelineConfig::builder()
///     .profile(Profile::Indic)
///     .targets(["DEVANAGARI", "TAMIL"])
///     .ocr_language("hin")
///     .build()
///     .unwrap();
/// assert_eq!(config.targets.len(), 2);
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Classification table, scheme map and catalogs. Default: [`Profile::Indic`].
    pub profile: Profile,

    /// Transliteration backend. `None` uses the profile's default.
    pub backend: Option<BackendKind>,

    /// Pre-constructed transliteration backend. Takes precedence over `backend`.
    pub transliterator: Option<Arc<dyn TransliterationBackend>>,

    /// Base URL of the Aksharamukha API.
    pub aksharamukha_url: String,

    /// Target display names, in the order outputs are produced.
    pub targets: Vec<String>,

    /// Source scheme chosen by the user. `None` infers it from detection.
    pub source_scheme: Option<String>,

    /// OCR engine kind. Default: [`OcrKind::Tesseract`].
    pub ocr: OcrKind,

    /// Pre-constructed OCR engine. Takes precedence over `ocr`.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,

    /// OCR language hint passed through verbatim (e.g. `hin`, `ben`, `eng`).
    /// Empty or `None` means engine default.
    pub ocr_language: Option<String>,

    /// Path or name of the tesseract executable. Default: `tesseract`.
    pub tesseract_path: PathBuf,

    /// Vision model identifier for [`OcrKind::Vision`].
    pub model: Option<String>,

    /// Vision provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed vision provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for vision OCR. Default: 0.0.
    pub temperature: f32,

    /// Maximum tokens the vision model may generate per page. Default: 4096.
    pub max_tokens: usize,

    /// Rendering DPI for PDF pages. Range: 72–400. Default: 200.
    pub dpi: u32,

    /// Cap on either dimension of a rendered page, in pixels. Default: 3000.
    pub max_rendered_pixels: u32,

    /// Pages to OCR. Default: all.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit pdfium library path. Falls back to `PDFIUM_LIB_PATH`, then the
    /// system loader.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Pages OCR'd at once. Default: 1 (strictly sequential).
    pub ocr_concurrency: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-request timeout for HTTP and vision backends in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Characters of extracted text shown in previews. Default: 1000.
    pub text_preview_chars: usize,

    /// Characters of each output shown in previews. Default: 2000.
    pub output_preview_chars: usize,

    /// Progress events for pages and targets.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let profile = Profile::default();
        Self {
            profile,
            backend: None,
            transliterator: None,
            aksharamukha_url: DEFAULT_AKSHARAMUKHA_URL.to_string(),
            targets: profile
                .default_targets()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source_scheme: None,
            ocr: OcrKind::default(),
            ocr_engine: None,
            ocr_language: None,
            tesseract_path: PathBuf::from("tesseract"),
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.0,
            max_tokens: 4096,
            dpi: 200,
            max_rendered_pixels: 3000,
            pages: PageSelection::default(),
            password: None,
            pdfium_lib_path: None,
            ocr_concurrency: 1,
            download_timeout_secs: 120,
            api_timeout_secs: 60,
            text_preview_chars: 1000,
            output_preview_chars: 2000,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("profile", &self.profile)
            .field("backend", &self.backend)
            .field(
                "transliterator",
                &self.transliterator.as_ref().map(|t| t.name().to_string()),
            )
            .field("aksharamukha_url", &self.aksharamukha_url)
            .field("targets", &self.targets)
            .field("source_scheme", &self.source_scheme)
            .field("ocr", &self.ocr)
            .field("ocr_engine", &self.ocr_engine.as_ref().map(|e| e.name().to_string()))
            .field("ocr_language", &self.ocr_language)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pages", &self.pages)
            .field("ocr_concurrency", &self.ocr_concurrency)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
            targets_set: false,
        }
    }

    /// Backend kind after applying the profile default.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.unwrap_or_else(|| self.profile.default_backend())
    }

    /// OCR hint with the empty string folded into `None`.
    pub fn language_hint(&self) -> Option<&str> {
        self.ocr_language.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Builder for [`PipelineConfig`].
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
    targets_set: bool,
}

impl fmt::Debug for PipelineConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl PipelineConfigBuilder {
    /// Switching profile resets the targets to the profile defaults unless
    /// targets were set explicitly.
    pub fn profile(mut self, profile: Profile) -> Self {
        self.config.profile = profile;
        if !self.targets_set {
            self.config.targets = profile
                .default_targets()
                .iter()
                .map(|s| s.to_string())
                .collect();
        }
        self
    }

    pub fn backend(mut self, kind: BackendKind) -> Self {
        self.config.backend = Some(kind);
        self
    }

    pub fn transliterator(mut self, backend: Arc<dyn TransliterationBackend>) -> Self {
        self.config.transliterator = Some(backend);
        self
    }

    pub fn aksharamukha_url(mut self, url: impl Into<String>) -> Self {
        self.config.aksharamukha_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.targets = targets.into_iter().map(Into::into).collect();
        self.targets_set = true;
        self
    }

    pub fn source_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.config.source_scheme = Some(scheme.into());
        self
    }

    pub fn ocr(mut self, kind: OcrKind) -> Self {
        self.config.ocr = kind;
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = Some(lang.into());
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn ocr_concurrency(mut self, n: usize) -> Self {
        self.config.ocr_concurrency = n.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn text_preview_chars(mut self, n: usize) -> Self {
        self.config.text_preview_chars = n;
        self
    }

    pub fn output_preview_chars(mut self, n: usize) -> Self {
        self.config.output_preview_chars = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    ///
    /// An empty target list is allowed here; it is reported as
    /// [`TranslitError::NoTargetsSelected`] when a run is attempted, so a
    /// detect-only caller can still use the config.
    pub fn build(self) -> Result<PipelineConfig, TranslitError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(TranslitError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.ocr_concurrency == 0 {
            return Err(TranslitError::InvalidConfig(
                "OCR concurrency must be ≥ 1".into(),
            ));
        }
        let catalog = c.profile.target_catalog();
        for target in &c.targets {
            if catalog::lookup(catalog, target).is_none() {
                return Err(TranslitError::InvalidConfig(format!(
                    "'{}' is not a target of the {} profile (see --list-targets)",
                    target,
                    c.profile.as_str()
                )));
            }
        }
        if let Some(ref scheme) = c.source_scheme {
            if catalog::lookup(c.profile.source_schemes(), scheme).is_none() {
                return Err(TranslitError::UnknownSourceScheme {
                    scheme: scheme.clone(),
                    profile: c.profile.as_str().to_string(),
                });
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// A bundle of classification table, scheme map and catalogs.
///
/// | Profile | Table | Unknown → | Targets | Default backend |
/// |---------|-------|-----------|---------|-----------------|
/// | `Aksharamukha` | 21 scripts, Latin first | `Roman` | ~120 scripts | Aksharamukha API |
/// | `Indic` | 9 Indic blocks, Latin last | `ITRANS` | 10 schemes | built-in |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Aksharamukha,
    #[default]
    Indic,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Aksharamukha => "aksharamukha",
            Profile::Indic => "indic",
        }
    }

    pub fn script_ranges(&self) -> &'static [ScriptRange] {
        match self {
            Profile::Aksharamukha => WIDE_SCRIPT_RANGES,
            Profile::Indic => INDIC_SCRIPT_RANGES,
        }
    }

    pub fn scheme_map(&self) -> SchemeMap {
        match self {
            Profile::Aksharamukha => AKSHARAMUKHA_SCHEMES,
            Profile::Indic => INDIC_SCHEMES,
        }
    }

    pub fn target_catalog(&self) -> &'static [&'static str] {
        match self {
            Profile::Aksharamukha => catalog::AKSHARAMUKHA_SCRIPTS,
            Profile::Indic => catalog::INDIC_TARGETS,
        }
    }

    /// Schemes a user may pick as input instead of relying on detection.
    pub fn source_schemes(&self) -> &'static [&'static str] {
        match self {
            Profile::Aksharamukha => catalog::AKSHARAMUKHA_SCRIPTS,
            Profile::Indic => catalog::INDIC_SOURCE_SCHEMES,
        }
    }

    pub fn default_targets(&self) -> &'static [&'static str] {
        match self {
            Profile::Aksharamukha => catalog::AKSHARAMUKHA_DEFAULT_TARGETS,
            Profile::Indic => catalog::INDIC_DEFAULT_TARGETS,
        }
    }

    pub fn default_backend(&self) -> BackendKind {
        match self {
            Profile::Aksharamukha => BackendKind::Aksharamukha,
            Profile::Indic => BackendKind::Builtin,
        }
    }
}

/// Which transliteration backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process scheme tables; always available.
    Builtin,
    /// Aksharamukha HTTP API.
    Aksharamukha,
}

/// Which OCR engine to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrKind {
    /// Local `tesseract` binary. (default)
    #[default]
    Tesseract,
    /// Vision LLM via edgequake-llm.
    Vision,
}

/// Specifies which pages of a PDF to OCR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// All pages (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_indic_profile() {
        let c = PipelineConfig::default();
        assert_eq!(c.profile, Profile::Indic);
        assert_eq!(c.targets, vec!["DEVANAGARI", "BENGALI"]);
        assert_eq!(c.backend_kind(), BackendKind::Builtin);
        assert_eq!(c.text_preview_chars, 1000);
        assert_eq!(c.output_preview_chars, 2000);
    }

    #[test]
    fn profile_switch_resets_default_targets() {
        let c = PipelineConfig::builder()
            .profile(Profile::Aksharamukha)
            .build()
            .unwrap();
        assert_eq!(c.targets, vec!["Devanagari", "Bengali", "Roman"]);
        assert_eq!(c.backend_kind(), BackendKind::Aksharamukha);
    }

    #[test]
    fn explicit_targets_survive_profile_switch() {
        let c = PipelineConfig::builder()
            .targets(["Tamil"])
            .profile(Profile::Aksharamukha)
            .build()
            .unwrap();
        assert_eq!(c.targets, vec!["Tamil"]);
    }

    #[test]
    fn target_outside_catalog_is_rejected() {
        let err = PipelineConfig::builder()
            .targets(["Thai"])
            .build()
            .unwrap_err();
        assert!(matches!(err, TranslitError::InvalidConfig(_)));
    }

    #[test]
    fn empty_targets_build() {
        let c = PipelineConfig::builder()
            .targets(Vec::<String>::new())
            .build()
            .unwrap();
        assert!(c.targets.is_empty());
    }

    #[test]
    fn source_scheme_must_be_in_catalog() {
        assert!(PipelineConfig::builder().source_scheme("hk").build().is_ok());
        let err = PipelineConfig::builder()
            .source_scheme("Klingon")
            .build()
            .unwrap_err();
        assert!(matches!(err, TranslitError::UnknownSourceScheme { .. }));
    }

    #[test]
    fn empty_language_hint_means_default() {
        let c = PipelineConfig::builder().ocr_language("  ").build().unwrap();
        assert_eq!(c.language_hint(), None);
        let c = PipelineConfig::builder().ocr_language("ben").build().unwrap();
        assert_eq!(c.language_hint(), Some("ben"));
    }

    #[test]
    fn dpi_is_clamped() {
        let c = PipelineConfig::builder().dpi(10).build().unwrap();
        assert_eq!(c.dpi, 72);
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(4).to_indices(3), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 9).to_indices(3), vec![1, 2]);
        assert_eq!(PageSelection::Set(vec![3, 1, 3]).to_indices(5), vec![0, 2]);
    }
}
