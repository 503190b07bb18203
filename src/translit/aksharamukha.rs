//! HTTP client for the Aksharamukha public API.
//!
//! `GET {base}/api/public?source=<S>&target=<T>&text=<TEXT>` answers with the
//! transliterated text as the plain response body. Scheme names are
//! Aksharamukha's own (`Devanagari`, `Roman_IAST`, ...), so the client does
//! no name mapping of its own.
//!
//! The text travels in the query string, so long documents are sent as
//! several requests of at most [`MAX_CHUNK_BYTES`] each. Chunks end on line
//! breaks where possible, then on whitespace. The breaks themselves are
//! never sent and are copied back between the converted pieces.

use super::{TransliterationBackend, TransliterationRequest};
use crate::error::TransliterationError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const ENGINE: &str = "aksharamukha";

/// Upper bound on the UTF-8 text carried by one request.
///
/// Indic text percent-encodes to roughly three times its byte length, which
/// keeps each URL well under the 8 KiB most front-ends accept.
pub const MAX_CHUNK_BYTES: usize = 2000;

/// Split `text` into `(piece, separator)` pairs no longer than `max_bytes`.
///
/// Concatenating every piece followed by its separator gives back `text`.
/// Separators are a single newline or whitespace character, or empty where a
/// run without whitespace had to be cut on a character boundary.
pub fn chunk_text(text: &str, max_bytes: usize) -> Vec<(&str, &str)> {
    let max_bytes = max_bytes.max(4);
    let mut chunks = Vec::new();
    // Byte range of the chunk being grown: whole lines so far.
    let mut current: Option<(usize, usize)> = None;
    let mut offset = 0;

    for line in text.split('\n') {
        let (line_start, line_end) = (offset, offset + line.len());
        offset = line_end + 1;

        if let Some((start, end)) = current {
            if line_end - start <= max_bytes {
                current = Some((start, line_end));
                continue;
            }
            chunks.push((&text[start..end], &text[end..end + 1]));
        }

        let mut start = line_start;
        while line_end - start > max_bytes {
            let (cut, sep_len) = cut_point(&text[start..line_end], max_bytes);
            chunks.push((&text[start..start + cut], &text[start + cut..start + cut + sep_len]));
            start += cut + sep_len;
        }
        current = Some((start, line_end));
    }
    if let Some((start, end)) = current {
        chunks.push((&text[start..end], ""));
    }
    chunks
}

/// Where to cut an over-long line: `(piece_len, separator_len)`.
fn cut_point(line: &str, max_bytes: usize) -> (usize, usize) {
    let mut limit = max_bytes.min(line.len());
    while !line.is_char_boundary(limit) {
        limit -= 1;
    }
    let ws = line[..limit]
        .char_indices()
        .rev()
        .find(|(i, c)| *i > 0 && c.is_whitespace());
    match ws {
        Some((i, c)) => (i, c.len_utf8()),
        None if limit > 0 => (limit, 0),
        None => (line.chars().next().map_or(0, char::len_utf8), 0),
    }
}

/// Aksharamukha over HTTP.
#[derive(Debug, Clone)]
pub struct AksharamukhaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AksharamukhaClient {
    /// `base_url` is the host root, e.g. `https://aksharamukha-plugin.appspot.com`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, TransliterationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .user_agent(concat!("edgequake-translit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransliterationError::BackendUnavailable {
                backend: ENGINE.to_string(),
                detail: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: Self::endpoint_for(base_url),
        })
    }

    /// Full API endpoint for a base URL.
    pub fn endpoint_for(base_url: &str) -> String {
        format!("{}/api/public", base_url.trim().trim_end_matches('/'))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, source: &str, target: &str, text: &str) -> Result<String, String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("source", source), ("target", target), ("text", text)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("request timed out: {}", e)
                } else {
                    e.to_string()
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(format!("HTTP {}: {}", status, snippet.trim()));
        }
        Ok(body)
    }
}

#[async_trait]
impl TransliterationBackend for AksharamukhaClient {
    fn name(&self) -> &str {
        ENGINE
    }

    async fn probe(&self) -> Result<(), TransliterationError> {
        self.call("Roman", "Devanagari", "a")
            .await
            .map(|_| ())
            .map_err(|detail| TransliterationError::BackendUnavailable {
                backend: format!("{} ({})", ENGINE, self.endpoint),
                detail,
            })
    }

    async fn transliterate(
        &self,
        request: &TransliterationRequest,
    ) -> Result<String, TransliterationError> {
        debug!(
            "aksharamukha: {} → {} ({} chars)",
            request.source,
            request.target,
            request.text.chars().count()
        );
        let chunks = chunk_text(&request.text, MAX_CHUNK_BYTES);
        if chunks.len() > 1 {
            debug!("aksharamukha: sending {} chunks", chunks.len());
        }

        let mut out = String::with_capacity(request.text.len());
        for (piece, separator) in chunks {
            if !piece.is_empty() {
                let converted = self
                    .call(&request.source, &request.target, piece)
                    .await
                    .map_err(|message| TransliterationError::EngineFailed {
                        engine: ENGINE.to_string(),
                        message,
                    })?;
                out.push_str(&converted);
            }
            out.push_str(separator);
        }
        Ok(out)
    }
}
