//! Verdict returned for a claim

use serde::{Deserialize, Serialize};
use std::fmt;

/// Truth label a verdict can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictLabel {
    True,
    False,
    Unverifiable,
}

impl VerdictLabel {
    /// Label as it appears in model output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Unverifiable => "UNVERIFIABLE",
        }
    }

    /// Parse a single word, ignoring case
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "UNVERIFIABLE" => Some(Self::Unverifiable),
            _ => None,
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model verdict for one claim
///
/// `raw` is the model output exactly as returned. `label` is a best-effort
/// parse of its leading word and is `None` when the model did not lead with
/// one of the three labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Option<VerdictLabel>,
    pub explanation: String,
    pub raw: String,
}

impl Verdict {
    /// Split model output into label and explanation
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim_start();

        let word_end = trimmed
            .find(|c: char| c.is_whitespace() || is_separator(c))
            .unwrap_or(trimmed.len());
        let word = trimmed[..word_end].trim_matches(|c: char| !c.is_ascii_alphabetic());

        let label = VerdictLabel::from_word(word);
        let explanation = match label {
            Some(_) => trimmed[word_end..]
                .trim_start_matches(|c: char| {
                    c.is_whitespace() || is_separator(c) || matches!(c, '*' | '_')
                })
                .trim_end()
                .to_string(),
            None => raw.trim().to_string(),
        };

        Self {
            label,
            explanation,
            raw,
        }
    }
}

/// Punctuation that may follow the leading label
fn is_separator(c: char) -> bool {
    matches!(c, ':' | '.' | ',' | '-' | '\u{2013}' | '\u{2014}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_with_colon() {
        let verdict = Verdict::parse("FALSE: contradicts chunk");
        assert_eq!(verdict.label, Some(VerdictLabel::False));
        assert_eq!(verdict.explanation, "contradicts chunk");
        assert_eq!(verdict.raw, "FALSE: contradicts chunk");
    }

    #[test]
    fn test_parse_markdown_and_case() {
        let verdict = Verdict::parse("**True** - the programme states it directly.");
        assert_eq!(verdict.label, Some(VerdictLabel::True));
        assert_eq!(verdict.explanation, "the programme states it directly.");

        let verdict = Verdict::parse("\nunverifiable\nThe context does not mention tolls.");
        assert_eq!(verdict.label, Some(VerdictLabel::Unverifiable));
        assert_eq!(verdict.explanation, "The context does not mention tolls.");
    }

    #[test]
    fn test_parse_dash_separators() {
        for raw in [
            "FALSE\u{2014}contradicts",
            "FALSE \u{2014} contradicts",
            "FALSE\u{2013}contradicts",
            "FALSE \u{2013} contradicts",
        ] {
            let verdict = Verdict::parse(raw);
            assert_eq!(verdict.label, Some(VerdictLabel::False), "{}", raw);
            assert_eq!(verdict.explanation, "contradicts", "{}", raw);
        }
    }

    #[test]
    fn test_parse_without_label_keeps_raw() {
        let verdict = Verdict::parse("The documents say nothing about this.");
        assert_eq!(verdict.label, None);
        assert_eq!(verdict.explanation, "The documents say nothing about this.");
    }

    #[test]
    fn test_label_prefix_is_not_a_label() {
        assert_eq!(Verdict::parse("Truest words").label, None);
    }
}
