//! Optional knowledge retrieval used to enrich dimension prompts.
//!
//! [`DirectoryKnowledge`] is a small in-memory implementation: every `*.md`
//! and `*.txt` file in a directory is split on blank lines into snippets, and
//! queries rank snippets by how many distinct query terms they contain.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf}
};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppResult, file_read_error};

/// A ranked piece of reference text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub content:   String,
    pub source_id: String
}

/// Source of reference snippets for prompt enrichment
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Return up to `top_k` snippets, best first
    async fn query(&self, query: &str, top_k: usize) -> AppResult<Vec<Snippet>>;
}

/// Terms shorter than this carry no ranking signal
const MIN_TERM_LEN: usize = 3;

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.len() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

struct IndexedSnippet {
    snippet: Snippet,
    terms:   HashSet<String>
}

/// Snippets loaded from a directory of plain-text or markdown files
pub struct DirectoryKnowledge {
    snippets: Vec<IndexedSnippet>
}

impl DirectoryKnowledge {
    /// Load every `*.md` and `*.txt` file in `dir` (non-recursive)
    pub fn load(dir: &Path) -> AppResult<Self> {
        let entries =
            fs::read_dir(dir).map_err(|e| file_read_error(&dir.display().to_string(), e))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == "md" || ext == "txt")
            })
            .collect();
        files.sort();
        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let content = fs::read_to_string(&path)
                .map_err(|e| file_read_error(&path.display().to_string(), e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            documents.push((name, content));
        }
        let knowledge = Self::from_documents(documents);
        debug!(dir = %dir.display(), snippets = knowledge.len(), "loaded knowledge snippets");
        Ok(knowledge)
    }

    /// Build from `(name, content)` pairs
    pub fn from_documents<I, N, C>(documents: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>
    {
        let mut snippets = Vec::new();
        for (name, content) in documents {
            let paragraphs = content
                .as_ref()
                .split("\n\n")
                .map(str::trim)
                .filter(|p| !p.is_empty());
            for (n, paragraph) in paragraphs.enumerate() {
                snippets.push(IndexedSnippet {
                    terms:   terms(paragraph),
                    snippet: Snippet {
                        content:   paragraph.to_string(),
                        source_id: format!("{}#{}", name.as_ref(), n + 1)
                    }
                });
            }
        }
        Self {
            snippets
        }
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    fn rank(&self, query: &str, top_k: usize) -> Vec<Snippet> {
        let query_terms = terms(query);
        let mut scored: Vec<(usize, usize)> = self
            .snippets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.terms.intersection(&query_terms).count(), i))
            .filter(|(score, _)| *score > 0)
            .collect();
        // stable on load order for equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(top_k)
            .map(|(_, i)| self.snippets[i].snippet.clone())
            .collect()
    }
}

#[async_trait]
impl KnowledgeSource for DirectoryKnowledge {
    async fn query(&self, query: &str, top_k: usize) -> AppResult<Vec<Snippet>> {
        Ok(self.rank(query, top_k))
    }
}
