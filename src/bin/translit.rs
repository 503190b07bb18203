//! CLI binary for edgequake-translit.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `PipelineConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_translit::output::{is_truncated, OUTPUT_PREVIEW_CHARS, TEXT_PREVIEW_CHARS};
use edgequake_translit::{
    list_targets, preview, AcquisitionPath, BackendKind, OcrKind, PageSelection, Pipeline,
    PipelineConfig, Profile, ProgressCallback, RunOutcome, RunOutput, RunProgressCallback,
    TranslitError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar reused for both phases: pages while OCR runs, then targets.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading input…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize, prefix: &'static str, unit: &str) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  ⏱ {{elapsed_precise}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_position(0);
        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix(prefix);
        self.bar.reset_eta();
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_acquire_start(&self, document: &str, kind: &str) {
        self.bar.set_message(format!("{document} ({kind})"));
    }

    fn on_ocr_start(&self, total_pages: usize) {
        self.activate_bar(total_pages, "OCR", "pages");
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, text_len: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{text_len:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&shorten(error, 80)),
        ));
        self.bar.inc(1);
    }

    fn on_detected(&self, script: &str, source_scheme: &str) {
        self.bar.println(format!(
            "{} Detected {}  →  source scheme {}",
            cyan("◆"),
            bold(script),
            bold(source_scheme)
        ));
    }

    fn on_dispatch_start(&self, total_targets: usize) {
        self.activate_bar(total_targets, "Transliterating", "targets");
    }

    fn on_target_start(&self, target: &str) {
        self.bar.set_message(target.to_string());
    }

    fn on_target_complete(&self, target: &str, output_len: usize) {
        self.bar.println(format!(
            "  {} {:<20} {}",
            green("✓"),
            target,
            dim(&format!("{output_len:>6} bytes"))
        ));
        self.bar.inc(1);
    }

    fn on_target_error(&self, target: &str, error: &str) {
        self.bar.println(format!(
            "  {} {:<20} {}",
            red("✗"),
            target,
            red(&shorten(error, 80))
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total_targets: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_targets.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} target(s) transliterated",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} target(s) transliterated  ({} failed)",
                if success_count == 0 { red("✘") } else { yellow("⚠") },
                bold(&success_count.to_string()),
                total_targets,
                red(&failed.to_string()),
            );
        }
    }
}

fn shorten(s: &str, max_chars: usize) -> String {
    if is_truncated(s, max_chars) {
        format!("{}\u{2026}", preview(s, max_chars.saturating_sub(1)))
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # ITRANS text file into the default targets (DEVANAGARI, BENGALI)
  translit poem.txt

  # Pick targets, write one file per target
  translit poem.txt -t TAMIL -t KANNADA -o out/

  # Scanned page, Hindi OCR hint
  translit scan.png -l hin -t IAST

  # First three pages of a PDF through a vision model
  translit --ocr vision --model gpt-4.1-nano --pages 1-3 book.pdf

  # Aksharamukha profile and API
  translit --profile aksharamukha -t Tamil,Thai,Roman_IAST notes.txt

  # Only report the detected script and source scheme
  translit --detect-only scan.pdf

  # Input is Harvard-Kyoto, not ITRANS
  translit --source-scheme HK sutra.txt

  # Show the target names a profile accepts
  translit --list-targets --profile aksharamukha

ENVIRONMENT VARIABLES:
  TRANSLIT_PROFILE        Default for --profile
  TRANSLIT_TARGETS        Comma-separated default for --target
  TRANSLIT_OCR_LANG       Default for --lang
  TESSERACT_PATH          Path to the tesseract executable
  AKSHARAMUKHA_API_URL    Base URL of the Aksharamukha API
  EDGEQUAKE_LLM_PROVIDER  Vision provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Vision model ID
  OPENAI_API_KEY          OpenAI API key (vision OCR)
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Overrides the log filter

NOTES:
  Script detection counts Unicode code points per script block and picks the
  largest count. Mixed-script text can be misclassified; use --source-scheme
  when you know the input scheme.
"#;

/// Extract, detect and transliterate text from text, image and PDF documents.
#[derive(Parser, Debug)]
#[command(
    name = "translit",
    version,
    about = "Extract text from a document, detect its script, and transliterate it",
    long_about = "Read a text file, image or PDF (local path or URL), OCR it when needed, \
guess the writing system from Unicode code-point ranges, and transliterate the text into \
one or more target scripts with the built-in Indic tables or the Aksharamukha API.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL (.txt, .pdf, .png, .jpg, .jpeg, .tiff).
    input: Option<String>,

    /// Script tables and target catalog to use.
    #[arg(long, env = "TRANSLIT_PROFILE", value_enum, default_value = "indic")]
    profile: ProfileArg,

    /// Transliteration backend. Default: the profile's own.
    #[arg(long, env = "TRANSLIT_BACKEND", value_enum)]
    backend: Option<BackendArg>,

    /// Target script; repeat or comma-separate. Default: the profile's defaults.
    #[arg(short, long = "target", env = "TRANSLIT_TARGETS", value_delimiter = ',')]
    targets: Vec<String>,

    /// Source scheme of the input. Overrides detection.
    #[arg(long, env = "TRANSLIT_SOURCE_SCHEME")]
    source_scheme: Option<String>,

    /// OCR engine for images and PDFs.
    #[arg(long, env = "TRANSLIT_OCR", value_enum, default_value = "tesseract")]
    ocr: OcrArg,

    /// OCR language hint passed through to the engine (e.g. hin, ben, eng).
    #[arg(short, long = "lang", env = "TRANSLIT_OCR_LANG")]
    lang: Option<String>,

    /// Path to the tesseract executable.
    #[arg(long = "tesseract", env = "TESSERACT_PATH", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Vision model ID (with --ocr vision).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Vision provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Rendering DPI for PDF pages (72–400).
    #[arg(long, env = "TRANSLIT_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "TRANSLIT_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "TRANSLIT_PASSWORD")]
    password: Option<String>,

    /// Pages OCR'd at once.
    #[arg(long, env = "TRANSLIT_OCR_CONCURRENCY", default_value_t = 1)]
    ocr_concurrency: usize,

    /// Path to libpdfium.
    #[arg(long = "pdfium-lib", env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Base URL of the Aksharamukha API.
    #[arg(long, env = "AKSHARAMUKHA_API_URL")]
    aksharamukha_url: Option<String>,

    /// Write one `{input}_{target}.txt` file per successful target into DIR.
    #[arg(short, long = "output-dir", env = "TRANSLIT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Print the run as JSON instead of previews.
    #[arg(long, env = "TRANSLIT_JSON")]
    json: bool,

    /// Extract and classify only; no transliteration.
    #[arg(long)]
    detect_only: bool,

    /// Print the targets of the selected profile and exit.
    #[arg(long)]
    list_targets: bool,

    /// Disable progress bar.
    #[arg(long, env = "TRANSLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TRANSLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "TRANSLIT_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "TRANSLIT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-request timeout for the Aksharamukha and vision backends, in seconds.
    #[arg(long, env = "TRANSLIT_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ProfileArg {
    Indic,
    Aksharamukha,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Indic => Profile::Indic,
            ProfileArg::Aksharamukha => Profile::Aksharamukha,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Builtin,
    Aksharamukha,
}

impl From<BackendArg> for BackendKind {
    fn from(v: BackendArg) -> Self {
        match v {
            BackendArg::Builtin => BackendKind::Builtin,
            BackendArg::Aksharamukha => BackendKind::Aksharamukha,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OcrArg {
    Tesseract,
    Vision,
}

impl From<OcrArg> for OcrKind {
    fn from(v: OcrArg) -> Self {
        match v {
            OcrArg::Tesseract => OcrKind::Tesseract,
            OcrArg::Vision => OcrKind::Vision,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v brings them back.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let profile: Profile = cli.profile.into();

    // ── List-targets mode ────────────────────────────────────────────────
    if cli.list_targets {
        let targets = list_targets(profile);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(targets).context("Failed to serialise targets")?
            );
        } else {
            for t in targets {
                println!("{t}");
            }
        }
        return Ok(());
    }

    let input = cli
        .input
        .clone()
        .context("Missing INPUT (a file path or URL). See --help.")?;

    let progress_cb: Option<Arc<CliProgressCallback>> = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(
        &cli,
        profile,
        progress_cb.clone().map(|cb| cb as ProgressCallback),
    )?;

    // Detection never reaches the transliteration backend, so it is not checked.
    let pipeline = if cli.detect_only {
        Pipeline::for_detection(config).await
    } else {
        Pipeline::new(config).await
    }
    .context("Backend check failed")?;
    if cli.verbose {
        let report = pipeline.capabilities().report();
        let ocr = match (report.ocr_engine, report.ocr_unavailable_reason) {
            (Some(engine), _) => engine,
            (None, reason) => format!("unavailable ({})", reason.unwrap_or_default()),
        };
        eprintln!(
            "{} backend: {}  ocr: {}",
            dim("capabilities"),
            report.transliteration_backend,
            ocr
        );
    }

    // ── Detect-only mode ─────────────────────────────────────────────────
    if cli.detect_only {
        let document = edgequake_translit::pipeline::input::resolve_input(
            &input,
            cli.download_timeout,
        )
        .await
        .context("Failed to read input")?;
        let report = pipeline
            .detect_only(&document)
            .await
            .context("Text extraction failed")?;
        if let Some(cb) = progress_cb {
            cb.bar.finish_and_clear();
        }

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            print_extracted(&report.extracted.text, &report.extracted.source, TEXT_PREVIEW_CHARS);
            match report.classification {
                Some(c) => {
                    println!("Detected script:  {}", c.detection.name());
                    println!(
                        "Coverage:         {}/{} chars",
                        c.detection.matched_chars, c.detection.total_chars
                    );
                    for count in &c.detection.counts {
                        println!("  {:<12} {}", count.script, count.count);
                    }
                    println!("Source scheme:    {} ({:?})", c.source_scheme, c.scheme_origin);
                }
                None => eprintln!("{} No text found in {}", yellow("⚠"), report.document),
            }
        }
        return Ok(());
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let result = pipeline.run_input(&input).await;
    if let Some(cb) = progress_cb {
        cb.bar.finish_and_clear();
    }
    let outcome = match result {
        Err(TranslitError::NoTargetsSelected) => {
            eprintln!(
                "{} No target scripts selected. Pass at least one --target (see --list-targets).",
                yellow("⚠")
            );
            return Ok(());
        }
        other => other.context("Transliteration run failed")?,
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise output")?
        );
    }

    let output = match outcome {
        RunOutcome::NoText { document, .. } => {
            eprintln!(
                "{} No text found in {}. Nothing was transliterated.",
                yellow("⚠"),
                document
            );
            return Ok(());
        }
        RunOutcome::Transliterated(output) => output,
    };

    if !cli.json {
        let config = pipeline.config();
        print_run(&output, config.text_preview_chars, config.output_preview_chars);
    }

    if let Some(ref dir) = cli.output_dir {
        let written = output
            .write_to_dir(dir)
            .await
            .context("Failed to write output files")?;
        if !cli.quiet {
            for path in &written {
                eprintln!("{}  {}", green("→"), bold(&path.display().to_string()));
            }
        }
    }

    let failed: Vec<&str> = output.failed_targets().map(|o| o.target.as_str()).collect();
    if !failed.is_empty() && !cli.quiet {
        eprintln!(
            "{} {} target(s) failed: {}",
            yellow("⚠"),
            failed.len(),
            failed.join(", ")
        );
    }
    if !cli.quiet && !show_progress {
        eprintln!(
            "Transliterated into {}/{} targets in {}ms",
            output.stats.succeeded, output.stats.total_targets, output.stats.total_duration_ms
        );
    }

    Ok(())
}

fn print_extracted(text: &str, source: &AcquisitionPath, max_chars: usize) {
    let how = match source {
        AcquisitionPath::Text { encoding } => format!("decoded as {:?}", encoding),
        AcquisitionPath::Image { engine } => format!("OCR ({engine})"),
        AcquisitionPath::Pdf {
            engine,
            pages,
            total_pages,
        } => format!("OCR ({engine}) of {}/{} pages", pages.len(), total_pages),
    };
    println!("{}", bold(&format!("── Extracted text ({how}) ──")));
    print_preview(text, max_chars);
}

fn print_run(output: &RunOutput, text_chars: usize, output_chars: usize) {
    print_extracted(&output.extracted.text, &output.extracted.source, text_chars);
    println!(
        "{}",
        bold(&format!(
            "── {} → {} ({:?}) ──",
            output.detection.name(),
            output.source_scheme,
            output.scheme_origin
        ))
    );
    for target in &output.outputs {
        println!();
        match target.text() {
            Some(text) => {
                println!(
                    "{} {}  {}",
                    green("■"),
                    bold(&target.target),
                    dim(&target.file_name(&output.document))
                );
                print_preview(text, output_chars);
            }
            None => println!("{} {}", red("■"), red(&target.rendered_text())),
        }
    }
}

fn print_preview(text: &str, max_chars: usize) {
    println!("{}", preview(text, max_chars));
    if is_truncated(text, max_chars) {
        println!(
            "{}",
            dim(&format!(
                "… ({} more chars)",
                text.chars().count().saturating_sub(max_chars)
            ))
        );
    }
}

/// Map CLI args to `PipelineConfig`.
fn build_config(
    cli: &Cli,
    profile: Profile,
    progress: Option<ProgressCallback>,
) -> Result<PipelineConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = PipelineConfig::builder()
        .profile(profile)
        .ocr(cli.ocr.into())
        .tesseract_path(cli.tesseract.clone())
        .dpi(cli.dpi)
        .pages(pages)
        .ocr_concurrency(cli.ocr_concurrency)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout)
        .text_preview_chars(TEXT_PREVIEW_CHARS)
        .output_preview_chars(OUTPUT_PREVIEW_CHARS);

    let targets: Vec<String> = cli
        .targets
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if !cli.targets.is_empty() {
        builder = builder.targets(targets);
    }
    if let Some(backend) = cli.backend {
        builder = builder.backend(backend.into());
    }
    if let Some(ref scheme) = cli.source_scheme {
        builder = builder.source_scheme(scheme.clone());
    }
    if let Some(ref lang) = cli.lang {
        builder = builder.ocr_language(lang.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib.clone());
    }
    if let Some(ref url) = cli.aksharamukha_url {
        builder = builder.aksharamukha_url(url.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;
        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!("Invalid page range '{}-{}': start must be <= end", start, end);
        }
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        if pages.contains(&0) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got 0)");
        }
        return Ok(PageSelection::Set(pages));
    }

    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }
    Ok(PageSelection::Single(page))
}
