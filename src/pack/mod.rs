//! Budgeted assembly of the context pack
//!
//! Decisions are consumed in the order the routing engine produced them.
//! Each non-SKIP file is extracted, wrapped and measured; the first block
//! that would push the running total over the budget ends packing. Files
//! after it are never considered, even if they would fit.

pub mod oracle;
pub mod render;

pub use oracle::{ApproxTokens, CharCount, OracleKind, SizeOracle, WordCount};
pub use render::{BlockRenderer, MarkdownRenderer};

use crate::context::RunContext;
use crate::extract::Extractor;
use crate::models::{RoutingDecision, Strategy};

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// The assembled document and what went into it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackedDocument {
    pub text: String,
    /// Size of `text` as measured block by block, never above `budget`
    pub total_size: usize,
    pub budget: usize,
    /// Files whose block was added, in document order
    pub included: Vec<String>,
    /// Non-SKIP files left out once the budget ran out
    pub omitted: Vec<String>,
}

pub struct Assembler<R: BlockRenderer = MarkdownRenderer> {
    extractor: Extractor,
    oracle: Box<dyn SizeOracle + Send + Sync>,
    renderer: R,
    budget: usize,
}

impl Assembler<MarkdownRenderer> {
    pub fn new(repo_path: &Path, oracle: Box<dyn SizeOracle + Send + Sync>, budget: usize) -> Self {
        Self {
            extractor: Extractor::new(repo_path),
            oracle,
            renderer: MarkdownRenderer,
            budget,
        }
    }
}

impl<R: BlockRenderer> Assembler<R> {
    /// Swap the block format
    pub fn with_renderer<S: BlockRenderer>(self, renderer: S) -> Assembler<S> {
        Assembler {
            extractor: self.extractor,
            oracle: self.oracle,
            renderer,
            budget: self.budget,
        }
    }

    /// Pack `decisions` (already in packing order) under the budget
    pub fn assemble(&self, ctx: &RunContext, decisions: &[RoutingDecision]) -> PackedDocument {
        let _span = ctx.phase("assemble").entered();

        let packable: Vec<&RoutingDecision> = decisions
            .iter()
            .filter(|d| d.strategy != Strategy::Skip)
            .collect();

        let header = self.renderer.document_header(ctx.repo_name());
        let header_size = self.oracle.size_of(&header);
        if header_size > self.budget {
            warn!(
                "Document header alone ({}) exceeds budget {}, nothing packed",
                header_size, self.budget
            );
            return PackedDocument {
                budget: self.budget,
                omitted: packable.iter().map(|d| d.file_path.clone()).collect(),
                ..PackedDocument::default()
            };
        }

        let mut doc = PackedDocument {
            text: header,
            total_size: header_size,
            budget: self.budget,
            ..PackedDocument::default()
        };

        for (position, decision) in packable.iter().enumerate() {
            let content = self.extractor.extract(&decision.file_path, decision.strategy);
            let block = self.renderer.file_block(decision, &content);
            let block_size = self.oracle.size_of(&block);

            if doc.total_size + block_size > self.budget {
                info!(
                    "Budget exhausted at {} ({} + {} > {}), {} files left out",
                    decision.file_path,
                    doc.total_size,
                    block_size,
                    self.budget,
                    packable.len() - position
                );
                doc.omitted = packable[position..]
                    .iter()
                    .map(|d| d.file_path.clone())
                    .collect();
                break;
            }

            debug!(
                "Packed {} as {} ({} units)",
                decision.file_path, decision.strategy, block_size
            );
            doc.text.push_str(&block);
            doc.total_size += block_size;
            doc.included.push(decision.file_path.clone());
        }

        info!(
            "Assembled {} files, {} / {} units",
            doc.included.len(),
            doc.total_size,
            self.budget
        );
        doc
    }
}
