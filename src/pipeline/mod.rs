//! Text-acquisition stages.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//!              ┌─ text ──▶ decode ─────────────────────────┐
//! input ──▶ Document                                       ├──▶ ExtractedText
//! (path/URL)   ├─ image ─▶ decode image ──▶ ocr ──┐        │
//!              └─ pdf ───▶ render ───────▶ ocr ───┴─ postprocess
//! ```
//!
//! 1. [`input`]   — read a local path or download a URL into a [`crate::Document`]
//! 2. [`decode`]  — UTF-8 with Latin-1 fallback for text documents
//! 3. [`render`]  — rasterise PDF pages via pdfium in `spawn_blocking`
//! 4. [`encode`]  — PNG-encode page images for the OCR engines
//! 5. [`ocr`]     — the [`ocr::OcrEngine`] trait and its tesseract / vision backends
//! 6. [`postprocess`] — light, script-safe cleanup of OCR output
//! 7. [`acquire`] — ties the above together per document kind

pub mod acquire;
pub mod decode;
pub mod encode;
pub mod input;
pub mod ocr;
pub mod postprocess;
pub mod render;
