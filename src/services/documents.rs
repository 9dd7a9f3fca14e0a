use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;

use crate::services::ai::LlmProvider;

pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";

const CHUNK_SIZE: usize = 200;
const CHUNK_OVERLAP: usize = 50;
const TOP_K: usize = 3;

/// Answers questions about ingested documents. An empty search result is an
/// answer (`NO_RELEVANT_INFORMATION`), not an error.
#[async_trait]
pub trait DocumentQuery: Send + Sync {
    async fn query_document(&self, text: &str) -> anyhow::Result<String>;
}

/// Plain-text documents from a directory, ranked by word overlap.
pub struct LocalDocuments {
    chunks: Vec<String>,
    llm: Arc<dyn LlmProvider>,
}

impl LocalDocuments {
    pub fn new(chunks: Vec<String>, llm: Arc<dyn LlmProvider>) -> Self {
        Self { chunks, llm }
    }

    /// Loads and chunks every `.txt` file in `dir`. A missing directory gives
    /// an empty corpus.
    pub fn load(dir: &Path, llm: Arc<dyn LlmProvider>) -> anyhow::Result<Self> {
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "documents directory not found, no documents loaded");
            return Ok(Self::new(Vec::new(), llm));
        }

        let mut entries: Vec<_> = fs::read_dir(dir)
            .context("failed to read documents directory")?
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "txt")
                    .unwrap_or(false)
            })
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut chunks = Vec::new();
        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            let text = match fs::read_to_string(entry.path()) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read document {name}, skipping");
                    continue;
                }
            };
            let pieces = chunk_text(&text, CHUNK_SIZE, CHUNK_OVERLAP);
            if pieces.is_empty() {
                tracing::warn!("document {name} produced no chunks, skipping");
                continue;
            }
            tracing::info!("ingested document {name} ({} chunks)", pieces.len());
            chunks.extend(pieces);
        }

        Ok(Self::new(chunks, llm))
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[async_trait]
impl DocumentQuery for LocalDocuments {
    async fn query_document(&self, text: &str) -> anyhow::Result<String> {
        let context = top_chunks(text, &self.chunks, TOP_K);
        if context.is_empty() {
            return Ok(NO_RELEVANT_INFORMATION.to_string());
        }

        let prompt = format!(
            "Context:\n{}\n\nQuestion: {text}\nAnswer:",
            context.join("\n")
        );
        let answer = self.llm.complete(&prompt).await?;
        Ok(answer.trim().to_string())
    }
}

/// Fixed-size character windows, each sharing `overlap` characters with the
/// previous one.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let step = size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

/// The `k` chunks sharing the most words with `question`. Chunks with no
/// shared word are never returned.
pub fn top_chunks<'a>(question: &str, chunks: &'a [String], k: usize) -> Vec<&'a str> {
    let query_words = words(question);

    let mut scored: Vec<(usize, &str)> = chunks
        .iter()
        .map(|c| (words(c).intersection(&query_words).count(), c.as_str()))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored.into_iter().take(k).map(|(_, c)| c).collect()
}
