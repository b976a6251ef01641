//! The research loop.
//!
//! Owns the per-run state and drives the four stages through an explicit
//! phase machine: generate queries, search, reflect, and either loop back
//! to search (bounded by the refinement-cycle cap) or synthesize the
//! final answer. The cap makes termination provable by construction:
//! every transition either advances toward synthesis or consumes one of
//! a fixed number of refinement cycles.

use crate::agent::queries::generate_queries;
use crate::agent::reflect::reflect;
use crate::agent::synthesize::synthesize;
use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::models::{Answer, RunState};
use crate::search::{search_all, SearchProvider};
use indicatif::ProgressBar;
use tracing::{debug, info};

/// Phases of the research loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Searching,
    Reflecting,
    Synthesizing,
}

/// The research agent: wires the stages together over one run's state.
pub struct ResearchAgent {
    llm: Box<dyn LanguageModel>,
    search: Box<dyn SearchProvider>,
    max_cycles: usize,
    progress: Option<ProgressBar>,
}

impl ResearchAgent {
    /// Create an agent from the selected providers.
    pub fn new(
        llm: Box<dyn LanguageModel>,
        search: Box<dyn SearchProvider>,
        max_cycles: usize,
    ) -> Self {
        info!(
            "Initializing research agent (model: {}, search: {}, max cycles: {})",
            llm.model(),
            search.name(),
            max_cycles
        );

        Self {
            llm,
            search,
            max_cycles,
            progress: None,
        }
    }

    /// Attach a spinner that receives per-phase status messages.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Name of the active language model backend.
    pub fn model_name(&self) -> String {
        format!("{} ({})", self.llm.model(), self.llm.name())
    }

    /// Name of the active search backend.
    pub fn search_name(&self) -> &str {
        self.search.name()
    }

    /// Research a question and produce a cited answer.
    pub async fn run(&self, question: &str) -> Result<Answer, AgentError> {
        let mut state = RunState::new(question, self.max_cycles);
        self.drive(&mut state).await
    }

    /// Drive the phase machine over externally owned state.
    async fn drive(&self, state: &mut RunState) -> Result<Answer, AgentError> {
        let mut phase = Phase::Init;

        loop {
            debug!("Entering phase {:?}", phase);

            phase = match phase {
                Phase::Init => {
                    self.set_status("Generating search queries...");
                    state.queries = generate_queries(self.llm.as_ref(), &state.question).await?;
                    Phase::Searching
                }

                Phase::Searching => {
                    self.set_status(format!(
                        "Searching the web (pass {})...",
                        state.cycle_count + 1
                    ));

                    let gathered = search_all(self.search.as_ref(), &state.queries).await;
                    let added = state.absorb(gathered);
                    info!(
                        "Search pass added {} documents ({} total)",
                        added,
                        state.documents.len()
                    );

                    state.queries.clear();
                    Phase::Reflecting
                }

                Phase::Reflecting => {
                    self.set_status("Assessing coverage...");
                    let verdict = reflect(self.llm.as_ref(), &state.question, &state.documents)
                        .await?;

                    if verdict.sufficient {
                        Phase::Synthesizing
                    } else if state.cap_reached() {
                        // Insufficiency is never fatal, only bounded.
                        info!(
                            "Refinement cap reached after {} cycles, forcing synthesis",
                            state.cycle_count
                        );
                        Phase::Synthesizing
                    } else {
                        state.cycle_count += 1;
                        state.queries = verdict.refined_queries;
                        info!("Refining search (cycle {})", state.cycle_count);
                        Phase::Searching
                    }
                }

                Phase::Synthesizing => {
                    self.set_status("Synthesizing answer...");
                    return synthesize(self.llm.as_ref(), &state.question, &state.documents).await;
                }
            };
        }
    }

    fn set_status(&self, message: impl Into<String>) {
        if let Some(pb) = &self.progress {
            pb.set_message(message.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::search::MockSearch;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Model that replays a scripted sequence of replies.
    #[derive(Debug)]
    struct ScriptedModel {
        replies: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for Arc<ScriptedModel> {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted model ran out of replies");
            Ok(reply)
        }
    }

    /// Search provider that counts passes; optionally fails every call.
    struct CountingSearch {
        calls: AtomicUsize,
        fail_all: bool,
    }

    impl CountingSearch {
        fn new(fail_all: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_all,
            })
        }
    }

    #[async_trait]
    impl SearchProvider for Arc<CountingSearch> {
        fn name(&self) -> &str {
            "counting"
        }

        async fn search(&self, query: &str) -> Result<Vec<Document>, AgentError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_all {
                return Err(AgentError::provider("counting", "simulated failure"));
            }

            Ok(vec![Document {
                url: format!("https://example.com/{}/{}", query, call),
                title: query.to_string(),
                snippet: format!("result for {}", query),
            }])
        }
    }

    #[tokio::test]
    async fn test_happy_path_single_cycle() {
        // Mock search returns a fixed 3-document set; reflection is
        // immediately satisfied; synthesis cites all three.
        let llm = ScriptedModel::new(&[
            r#"{"queries": ["2022 FIFA World Cup winner"]}"#,
            r#"{"sufficient": true}"#,
            r#"{"answer": "Argentina won the 2022 FIFA World Cup.", "cited_ids": [1, 2, 3]}"#,
        ]);
        let agent = ResearchAgent::new(Box::new(llm), Box::new(MockSearch::new(3)), 2);

        let mut state = RunState::new("Who won the 2022 FIFA World Cup?", 2);
        let answer = agent.drive(&mut state).await.unwrap();

        assert_eq!(state.cycle_count, 0);
        assert_eq!(state.documents.len(), 3);

        let ids: Vec<usize> = answer.citations.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        for (citation, doc) in answer.citations.iter().zip(&state.documents) {
            assert_eq!(citation.url, doc.url);
            assert_eq!(citation.title, doc.title);
        }
        assert!(answer.answer.ends_with("[1][2][3]"));
    }

    #[tokio::test]
    async fn test_insufficiency_is_bounded_by_cycle_cap() {
        // Reflection never reports sufficiency: the loop must run the
        // initial pass plus exactly two refinements, then force synthesis.
        let llm = ScriptedModel::new(&[
            r#"{"queries": ["first"]}"#,
            r#"{"sufficient": false, "refined_queries": ["second"]}"#,
            r#"{"sufficient": false, "refined_queries": ["third"]}"#,
            r#"{"sufficient": false, "refined_queries": ["fourth"]}"#,
            r#"{"answer": "Best effort.", "cited_ids": [1]}"#,
        ]);
        let search = CountingSearch::new(false);
        let agent = ResearchAgent::new(Box::new(llm), Box::new(Arc::clone(&search)), 2);

        let mut state = RunState::new("question", 2);
        let answer = agent.drive(&mut state).await.unwrap();

        assert_eq!(state.cycle_count, 2);
        // One query per pass, three passes: initial + two refinements.
        assert_eq!(search.calls.load(Ordering::SeqCst), 3);
        assert_eq!(state.documents.len(), 3);
        assert!(!answer.answer.is_empty());
    }

    #[tokio::test]
    async fn test_all_searches_failing_still_reaches_reflection() {
        let llm = ScriptedModel::new(&[
            r#"{"queries": ["a", "b"]}"#,
            r#"{"sufficient": true}"#,
            // No synthesis reply: with zero documents no model call is made.
        ]);
        let agent = ResearchAgent::new(
            Box::new(Arc::clone(&llm)),
            Box::new(CountingSearch::new(true)),
            2,
        );

        let mut state = RunState::new("question", 2);
        let answer = agent.drive(&mut state).await.unwrap();

        // Query generation and reflection both ran.
        assert_eq!(llm.calls.load(Ordering::SeqCst), 2);
        assert!(state.documents.is_empty());
        assert_eq!(answer.answer, "No information found.");
        assert!(answer.citations.is_empty());
    }

    #[tokio::test]
    async fn test_documents_accumulate_across_cycles() {
        let llm = ScriptedModel::new(&[
            r#"{"queries": ["first"]}"#,
            r#"{"sufficient": false, "refined_queries": ["second"]}"#,
            r#"{"sufficient": true}"#,
            r#"{"answer": "Done.", "cited_ids": [1, 2]}"#,
        ]);
        let agent = ResearchAgent::new(Box::new(llm), Box::new(CountingSearch::new(false)), 2);

        let mut state = RunState::new("question", 2);
        agent.drive(&mut state).await.unwrap();

        assert_eq!(state.cycle_count, 1);
        // Both passes contributed; nothing was dropped.
        assert_eq!(state.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_query_generation_failure_aborts_run() {
        let llm = ScriptedModel::new(&["this is not json"]);
        let agent = ResearchAgent::new(Box::new(llm), Box::new(MockSearch::new(3)), 2);

        let err = agent.run("question").await.unwrap_err();
        assert!(matches!(err, AgentError::MalformedOutput { .. }));
    }
}
