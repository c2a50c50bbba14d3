//! Size oracles: how much of the budget a piece of text costs
//!
//! - `tokens` - approximate tokens, `ceil(chars / chars_per_token)`
//! - `chars` - Unicode scalar values
//! - `words` - whitespace-separated words

use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Measures rendered text against the budget
pub trait SizeOracle {
    fn size_of(&self, text: &str) -> usize;
}

impl<F> SizeOracle for F
where
    F: Fn(&str) -> usize,
{
    fn size_of(&self, text: &str) -> usize {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CharCount;

impl SizeOracle for CharCount {
    fn size_of(&self, text: &str) -> usize {
        text.chars().count()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WordCount;

impl SizeOracle for WordCount {
    fn size_of(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Character-ratio token estimate
#[derive(Debug, Clone, Copy)]
pub struct ApproxTokens {
    pub chars_per_token: usize,
}

impl Default for ApproxTokens {
    fn default() -> Self {
        Self { chars_per_token: 4 }
    }
}

impl SizeOracle for ApproxTokens {
    fn size_of(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token.max(1))
    }
}

/// Oracle selected by name in config or on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleKind {
    Tokens,
    Chars,
    Words,
}

impl OracleKind {
    pub fn build(self, chars_per_token: usize) -> Box<dyn SizeOracle + Send + Sync> {
        match self {
            OracleKind::Tokens => Box::new(ApproxTokens { chars_per_token }),
            OracleKind::Chars => Box::new(CharCount),
            OracleKind::Words => Box::new(WordCount),
        }
    }
}

impl FromStr for OracleKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tokens" | "token" => Ok(OracleKind::Tokens),
            "chars" | "characters" => Ok(OracleKind::Chars),
            "words" => Ok(OracleKind::Words),
            _ => Err(anyhow!(
                "Unknown oracle '{}'. Valid oracles: tokens, chars, words",
                s
            )),
        }
    }
}

impl std::fmt::Display for OracleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleKind::Tokens => write!(f, "tokens"),
            OracleKind::Chars => write!(f, "chars"),
            OracleKind::Words => write!(f, "words"),
        }
    }
}
