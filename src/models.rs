//! Data models for the research agent.
//!
//! This module contains the core data structures carried through a run:
//! documents gathered from search, the reflection verdict, the final
//! cited answer, and the per-run state owned by the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single search result document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Source URL; documents are de-duplicated by this field.
    pub url: String,
    /// Page title as reported by the search provider.
    pub title: String,
    /// Snippet or extracted content.
    #[serde(alias = "content")]
    pub snippet: String,
}

/// A numbered reference tying a claim in the answer to a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based citation id; ids are contiguous within an answer.
    pub id: usize,
    pub url: String,
    pub title: String,
}

/// The terminal output of a run.
///
/// Serializes to the process's stdout object:
/// `{"answer": "...", "citations": [{"id": 1, "url": "...", "title": "..."}]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub citations: Vec<Citation>,
}

/// Reflection's judgment of the accumulated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionVerdict {
    /// Whether the documents adequately answer the original question.
    pub sufficient: bool,
    /// Refined queries to run next; non-empty only when not sufficient.
    pub refined_queries: Vec<String>,
}

impl ReflectionVerdict {
    /// A verdict that terminates the loop.
    pub fn sufficient() -> Self {
        Self {
            sufficient: true,
            refined_queries: Vec::new(),
        }
    }
}

/// State carried through one run of the research loop.
///
/// Created at orchestration start, mutated at each stage, discarded at
/// process exit. The document set only grows within a run.
#[derive(Debug, Clone)]
pub struct RunState {
    /// The immutable input question.
    pub question: String,
    /// Queries for the next search pass.
    pub queries: Vec<String>,
    /// Cumulative document set, de-duplicated by url.
    pub documents: Vec<Document>,
    /// Number of times the loop re-entered search; never exceeds `max_cycles`.
    pub cycle_count: usize,
    /// Maximum number of refinement cycles.
    pub max_cycles: usize,
}

impl RunState {
    /// Create fresh state for a question.
    pub fn new(question: impl Into<String>, max_cycles: usize) -> Self {
        Self {
            question: question.into(),
            queries: Vec::new(),
            documents: Vec::new(),
            cycle_count: 0,
            max_cycles,
        }
    }

    /// Union new documents into the cumulative set, de-duplicating by url.
    ///
    /// Returns the number of documents actually added. Existing documents
    /// are never removed or replaced.
    pub fn absorb(&mut self, incoming: Vec<Document>) -> usize {
        let mut seen: HashSet<String> = self.documents.iter().map(|d| d.url.clone()).collect();
        let before = self.documents.len();

        for doc in incoming {
            if seen.insert(doc.url.clone()) {
                self.documents.push(doc);
            }
        }

        self.documents.len() - before
    }

    /// True when the refinement-cycle cap has been reached.
    pub fn cap_reached(&self) -> bool {
        self.cycle_count >= self.max_cycles
    }
}

/// Metadata about a completed run, used by the text rendering.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// The question that was researched.
    pub question: String,
    /// Language model that produced the answer.
    pub model: String,
    /// Search provider that supplied the documents.
    pub search_provider: String,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}
