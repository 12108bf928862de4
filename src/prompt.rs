//! Prompt assembly for answer generation
//!
//! Renders retrieved FAQ entries into the context block of an
//! FAQ-assistant prompt. Generation itself happens elsewhere.

use crate::types::Document;

const PREAMBLE: &str = "\
You're a syndicated market research provider. Answer the QUESTION based on the CONTEXT from the FAQ database.
Use only the facts from the CONTEXT when answering the QUESTION.";

/// Render documents as `Category/Question/Answer` blocks separated by blank lines
pub fn build_context(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| {
            format!(
                "Category: {}\nQuestion: {}\nAnswer: {}",
                doc.category, doc.question, doc.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the full prompt for `question` over the retrieved `documents`
pub fn build_prompt(question: &str, documents: &[Document]) -> String {
    format!(
        "{}\n\nQUESTION: {}\n\nCONTEXT:\n{}",
        PREAMBLE,
        question.trim(),
        build_context(documents)
    )
}
