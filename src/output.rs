//! Output rendering for the final answer.
//!
//! Two renderings exist: the JSON object printed by default (the
//! process's sole machine-readable result) and a plain-text report for
//! humans.

use crate::models::{Answer, RunMetadata};
use anyhow::Result;

/// Render the answer as the pretty-printed JSON output object.
pub fn render_json(answer: &Answer) -> Result<String> {
    Ok(serde_json::to_string_pretty(answer)?)
}

/// Render the answer as a plain-text report.
pub fn render_text(answer: &Answer, metadata: &RunMetadata) -> String {
    let mut output = String::new();

    output.push_str(&answer.answer);
    output.push('\n');

    if !answer.citations.is_empty() {
        output.push_str("\nSources:\n");
        for citation in &answer.citations {
            output.push_str(&format!(
                "  [{}] {} — {}\n",
                citation.id, citation.title, citation.url
            ));
        }
    }

    output.push_str(&format!(
        "\nAnswered by {} (search: {}) in {:.1}s on {}\n",
        metadata.model,
        metadata.search_provider,
        metadata.duration_seconds,
        metadata.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Citation;
    use chrono::TimeZone;

    fn sample_answer() -> Answer {
        Answer {
            answer: "Argentina won the 2022 FIFA World Cup.[1]".to_string(),
            citations: vec![Citation {
                id: 1,
                url: "https://example.com/worldcup".to_string(),
                title: "World Cup Final".to_string(),
            }],
        }
    }

    fn sample_metadata() -> RunMetadata {
        RunMetadata {
            question: "Who won the 2022 FIFA World Cup?".to_string(),
            model: "gemini-1.5-flash (gemini)".to_string(),
            search_provider: "mock".to_string(),
            duration_seconds: 4.2,
            completed_at: chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_render_json_shape() {
        let json = render_json(&sample_answer()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value["answer"],
            "Argentina won the 2022 FIFA World Cup.[1]"
        );
        assert_eq!(value["citations"][0]["id"], 1);
        assert_eq!(value["citations"][0]["url"], "https://example.com/worldcup");
    }

    #[test]
    fn test_render_text_lists_sources() {
        let text = render_text(&sample_answer(), &sample_metadata());

        assert!(text.contains("Argentina won"));
        assert!(text.contains("[1] World Cup Final — https://example.com/worldcup"));
        assert!(text.contains("gemini-1.5-flash"));
        assert!(text.contains("2024-06-01"));
    }

    #[test]
    fn test_render_text_without_citations() {
        let answer = Answer {
            answer: "No information found.".to_string(),
            citations: Vec::new(),
        };

        let text = render_text(&answer, &sample_metadata());
        assert!(!text.contains("Sources:"));
    }
}
