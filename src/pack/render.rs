//! Wrapping extracted content into document blocks

use crate::models::RoutingDecision;
use crate::parsers::language_for_extension;
use std::path::Path;

/// Formats the document header and one block per packed file
pub trait BlockRenderer {
    fn document_header(&self, repo_name: &str) -> String;
    fn file_block(&self, decision: &RoutingDecision, content: &str) -> String;
}

/// Markdown scaffold with one fenced code block per file
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl BlockRenderer for MarkdownRenderer {
    fn document_header(&self, repo_name: &str) -> String {
        format!("# Repository Scaffold: {repo_name}\n\n")
    }

    fn file_block(&self, decision: &RoutingDecision, content: &str) -> String {
        let fence = Path::new(&decision.file_path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(language_for_extension)
            .map(str::to_lowercase)
            .unwrap_or_default();
        format!(
            "\n## File: {}\n**Strategy:** {} | **Reason:** {}\n```{}\n{}\n```\n",
            decision.file_path, decision.strategy, decision.reason, fence, content
        )
    }
}
