//! Prompt construction: the fixed instruction template and context formatting.

use crate::document::SearchResult;

/// The literal answer the model is instructed to give when the retrieved
/// context cannot answer the question.
pub const FALLBACK_ANSWER: &str = "I don't know based on the given document.";

/// The fixed instruction template. `{context}` and `{question}` are
/// substituted by [`render`].
const ANSWER_TEMPLATE: &str = "\
You are an intelligent assistant that answers user questions using ONLY the information provided in the context below.

If the context does not contain enough information to answer the question, respond with:
\"I don't know based on the given document.\"

Guidelines:
- Always stay truthful to the context. Do not add external knowledge.
- If multiple relevant parts exist, combine them into a clear, concise answer.
- If the question is broad (like 'summarize'), give a structured summary based only on the context.
- If the question cannot be answered, clearly say you don't know.
- Provide step-by-step reasoning when needed.

Context:
{context}

Question:
{question}

Answer:
";

/// Join retrieved chunk texts in ranked order, separated by a blank line.
pub fn format_context(results: &[SearchResult]) -> String {
    results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n")
}

/// Substitute `context` and `question` into the instruction template.
pub fn render(context: &str, question: &str) -> String {
    ANSWER_TEMPLATE.replace("{context}", context).replace("{question}", question)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::document::Chunk;

    use super::*;

    fn result(text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                id: "c".into(),
                text: text.into(),
                embedding: Vec::new(),
                metadata: HashMap::new(),
                document_id: "doc".into(),
            },
            score: 1.0,
        }
    }

    #[test]
    fn context_is_blank_line_separated_in_ranked_order() {
        let results = vec![result("first"), result("second")];
        assert_eq!(format_context(&results), "first\n\nsecond");
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let prompt = render("the sky is blue", "what color is the sky?");
        assert!(prompt.contains("the sky is blue"));
        assert!(prompt.contains("what color is the sky?"));
        assert!(!prompt.contains("{context}"));
        assert!(!prompt.contains("{question}"));
    }

    #[test]
    fn template_carries_the_fallback_instruction() {
        let prompt = render("", "anything");
        assert!(prompt.contains(FALLBACK_ANSWER));
    }
}
