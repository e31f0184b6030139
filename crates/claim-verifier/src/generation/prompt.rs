//! Prompt templates for claim verification and page translation

use crate::types::SearchHit;

/// Prompt builder for verifier and translator calls
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from search hits: chunk texts in rank order, blank-line separated
    pub fn build_context(hits: &[SearchHit]) -> String {
        hits.iter()
            .map(|hit| hit.chunk.content.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the fact-checking prompt with strict grounding
    pub fn build_verification_prompt(claim: &str, context: &str) -> String {
        format!(
            r#"You are a meticulous fact-checker. Your task is to verify the following claim based *only* on the provided context from translated political party policies.

Analyze the context and determine if the claim is TRUE, FALSE, or UNVERIFIABLE.

Provide a clear, one-word answer (TRUE, FALSE, or UNVERIFIABLE) followed by a brief, neutral explanation citing the relevant text from the context. Do not use any outside knowledge.

CONTEXT:
{context}

CLAIM:
{claim}

ANSWER:"#,
            context = context,
            claim = claim.trim()
        )
    }

    /// Build the page translation prompt
    pub fn build_translation_prompt(source_language: &str, text: &str) -> String {
        format!(
            "Translate the following {language} text to English. Do not add any commentary, preamble, or notes. Output only the translated English text.\n\n{upper} TEXT:\n{text}",
            language = source_language,
            upper = source_language.to_uppercase(),
            text = text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource};

    fn hit(text: &str, score: f32) -> SearchHit {
        let source = ChunkSource {
            source_path: "policies/x.pdf".to_string(),
            page_number: 2,
        };
        SearchHit {
            chunk: Chunk::new(text.to_string(), source, 0, text.chars().count(), 0),
            score,
        }
    }

    #[test]
    fn test_context_keeps_rank_order() {
        let context = PromptBuilder::build_context(&[
            hit("First passage.", 0.9),
            hit(" Second passage.\n", 0.5),
        ]);
        assert_eq!(context, "First passage.\n\nSecond passage.");
    }

    #[test]
    fn test_context_empty_without_hits() {
        assert_eq!(PromptBuilder::build_context(&[]), "");
    }

    #[test]
    fn test_verification_prompt_layout() {
        let prompt = PromptBuilder::build_verification_prompt(
            "Party X supports a carbon tax",
            "Party X's platform explicitly opposes any new carbon tax",
        );

        assert!(prompt.starts_with("You are a meticulous fact-checker."));
        assert!(prompt.contains("TRUE, FALSE, or UNVERIFIABLE"));
        assert!(prompt.contains("Do not use any outside knowledge."));

        let context_at = prompt.find("CONTEXT:\nParty X's platform").unwrap();
        let claim_at = prompt.find("CLAIM:\nParty X supports a carbon tax").unwrap();
        assert!(context_at < claim_at);
        assert!(prompt.ends_with("ANSWER:"));
    }

    #[test]
    fn test_translation_prompt() {
        let prompt = PromptBuilder::build_translation_prompt("Norwegian", "Hei");
        assert_eq!(
            prompt,
            "Translate the following Norwegian text to English. Do not add any commentary, preamble, or notes. Output only the translated English text.\n\nNORWEGIAN TEXT:\nHei"
        );
    }
}
