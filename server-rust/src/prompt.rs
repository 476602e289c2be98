//! Grounding prompts for document chat.
//!
//! The document is cut to a fixed prefix measured in characters (Unicode
//! scalar values); there is no chunking or ranking. At roughly four
//! characters per token the default budget of 7000 characters is about
//! 1750 tokens of document.

use thiserror::Error;

/// Answer the model is told to give when the excerpt lacks the answer.
pub const REFUSAL_PHRASE: &str = "I cannot find the answer in the provided document.";

pub const DEFAULT_CONTEXT_BUDGET_CHARS: usize = 7000;

pub const DOCUMENT_START_MARKER: &str = "--- Document Content ---";
pub const DOCUMENT_END_MARKER: &str = "--- End of Document ---";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("Question is required.")]
    MissingQuestion,
    #[error("Please upload a document first.")]
    MissingDocument,
}

#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    budget_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_BUDGET_CHARS)
    }
}

impl PromptBuilder {
    #[must_use]
    pub fn new(budget_chars: usize) -> Self {
        Self { budget_chars }
    }

    #[must_use]
    pub fn budget_chars(&self) -> usize {
        self.budget_chars
    }

    /// Builds the instruction sent to the model for `question` about
    /// `document`.
    ///
    /// The document is checked before the question, so a chat before any
    /// upload always reports the missing document.
    pub fn build(&self, document: &str, question: &str) -> Result<String, PromptError> {
        if document.is_empty() {
            return Err(PromptError::MissingDocument);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(PromptError::MissingQuestion);
        }

        let excerpt = truncate_chars(document, self.budget_chars);

        Ok(format!(
            "Based *only* on the following document content, answer the user's question. \
             If the answer is not in the document, say \"{REFUSAL_PHRASE}\"\n\n\
             {DOCUMENT_START_MARKER}\n\
             {excerpt}\n\
             {DOCUMENT_END_MARKER}\n\n\
             User Question: \"{question}\""
        ))
    }
}

/// Longest prefix of `text` holding at most `budget` characters.
#[must_use]
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// The document excerpt embedded in a prompt built by [`PromptBuilder`].
#[must_use]
pub fn embedded_excerpt(prompt: &str) -> Option<&str> {
    let start = prompt.find(DOCUMENT_START_MARKER)? + DOCUMENT_START_MARKER.len() + 1;
    let end_marker = format!("\n{DOCUMENT_END_MARKER}\n");
    let end = start + prompt.get(start..)?.find(&end_marker)?;
    prompt.get(start..end)
}
