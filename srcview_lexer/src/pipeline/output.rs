//! Serializable view of a pipeline result for the presentation layer

use crate::config::runtime::{OutputMode, TokenizerPreferences};
use crate::grammar::Product;
use crate::pipeline::{PipelineError, PipelineResult};
use crate::scanner::{ScanMetrics, ScannedToken};
use crate::symbols::ImportTables;
use crate::tokens::{Token, TokenKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pre-classified text fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub classes: Vec<String>,
}

impl From<&ScannedToken> for Fragment {
    fn from(scanned: &ScannedToken) -> Self {
        let mut classes = vec![scanned.category.css_class()];
        classes.extend(scanned.tags.iter().map(|tag| tag.css_class()));
        Self {
            text: scanned.token.text.clone(),
            classes,
        }
    }
}

/// One output entry, shaped by the output mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputToken {
    Enhanced(ScannedToken),
    Raw(Token),
    Fragment(Fragment),
}

impl OutputToken {
    fn shape(scanned: &ScannedToken, mode: OutputMode) -> Self {
        match mode {
            OutputMode::Enhanced => OutputToken::Enhanced(scanned.clone()),
            OutputMode::Raw => OutputToken::Raw(scanned.token.clone()),
            OutputMode::Fragments => OutputToken::Fragment(Fragment::from(scanned)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenListing {
    ByIndex(Vec<OutputToken>),
    /// Keyed by the line each token starts on
    ByLine(BTreeMap<u32, Vec<OutputToken>>),
}

impl TokenListing {
    pub fn len(&self) -> usize {
        match self {
            TokenListing::ByIndex(tokens) => tokens.len(),
            TokenListing::ByLine(lines) => lines.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub generated_at: DateTime<Utc>,
    pub source: Option<String>,
    pub mode: OutputMode,
    pub namespace: Option<String>,
    pub tokens: TokenListing,
    pub features: Vec<Product>,
    pub imports: ImportTables,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ScanMetrics>,
}

/// Drop whitespace atoms that end a line or the stream.
pub fn trim_trailing_whitespace(tokens: &[ScannedToken]) -> Vec<&ScannedToken> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, scanned)| {
            scanned.token.kind != TokenKind::Whitespace
                || tokens
                    .get(i + 1)
                    .is_some_and(|next| next.token.kind != TokenKind::LineBreak)
        })
        .map(|(_, scanned)| scanned)
        .collect()
}

impl PipelineOutput {
    pub fn from_result(
        result: &PipelineResult,
        prefs: &TokenizerPreferences,
        source: Option<String>,
    ) -> Self {
        let selected: Vec<&ScannedToken> = if prefs.trim_trailing_whitespace {
            trim_trailing_whitespace(&result.tokens)
        } else {
            result.tokens.iter().collect()
        };

        let mode = prefs.output_mode;
        let tokens = if prefs.key_by_line {
            let mut lines: BTreeMap<u32, Vec<OutputToken>> = BTreeMap::new();
            for scanned in selected {
                lines
                    .entry(scanned.token.line)
                    .or_default()
                    .push(OutputToken::shape(scanned, mode));
            }
            TokenListing::ByLine(lines)
        } else {
            TokenListing::ByIndex(
                selected
                    .into_iter()
                    .map(|scanned| OutputToken::shape(scanned, mode))
                    .collect(),
            )
        };

        Self {
            generated_at: Utc::now(),
            source,
            mode,
            namespace: result.namespace.clone(),
            tokens,
            features: result.products.clone(),
            imports: result.tables.clone(),
            metrics: prefs.collect_metrics.then(|| result.metrics.clone()),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, PipelineError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;
    use std::time::Duration;

    fn scanned(index: usize, kind: TokenKind, text: &str, line: u32, category: Category) -> ScannedToken {
        ScannedToken {
            index,
            token: Token::new(kind, text, line, index),
            category,
            tags: Vec::new(),
        }
    }

    fn result() -> PipelineResult {
        PipelineResult {
            tokens: vec![
                scanned(0, TokenKind::Variable, "$a", 1, Category::Variable),
                scanned(1, TokenKind::Whitespace, " ", 1, Category::Whitespace),
                scanned(2, TokenKind::LineBreak, "\n", 1, Category::LineBreak),
                scanned(3, TokenKind::Variable, "$b", 2, Category::Variable),
                scanned(4, TokenKind::Whitespace, "  ", 2, Category::Whitespace),
            ],
            products: Vec::new(),
            namespace: Some("App".to_string()),
            tables: ImportTables::new(),
            metrics: ScanMetrics::default(),
            file_metadata: None,
            processing_duration: Duration::from_millis(1),
        }
    }

    fn prefs(mode: OutputMode, key_by_line: bool, trim: bool) -> TokenizerPreferences {
        TokenizerPreferences {
            atomize: true,
            preserve_comment_whitespace: true,
            trim_trailing_whitespace: trim,
            key_by_line,
            output_mode: mode,
            collect_metrics: false,
        }
    }

    #[test]
    fn test_trim_drops_line_end_whitespace() {
        let result = result();
        let kept: Vec<&str> = trim_trailing_whitespace(&result.tokens)
            .into_iter()
            .map(|t| t.token.text.as_str())
            .collect();
        assert_eq!(kept, vec!["$a", "\n", "$b"]);
    }

    #[test]
    fn test_keyed_by_line() {
        let output = PipelineOutput::from_result(&result(), &prefs(OutputMode::Raw, true, false), None);
        let TokenListing::ByLine(lines) = &output.tokens else {
            panic!("expected line keyed listing");
        };
        assert_eq!(lines[&1].len(), 3);
        assert_eq!(lines[&2].len(), 2);
        assert!(output.metrics.is_none());
    }

    #[test]
    fn test_fragment_classes() {
        let output =
            PipelineOutput::from_result(&result(), &prefs(OutputMode::Fragments, false, true), None);
        let TokenListing::ByIndex(tokens) = &output.tokens else {
            panic!("expected index keyed listing");
        };
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[0],
            OutputToken::Fragment(Fragment {
                text: "$a".to_string(),
                classes: vec!["variable".to_string()],
            })
        );
    }

    #[test]
    fn test_json_shape() {
        let output = PipelineOutput::from_result(
            &result(),
            &prefs(OutputMode::Enhanced, false, false),
            Some("tokens.json".to_string()),
        );
        let json: serde_json::Value = serde_json::from_str(&output.to_json(false).unwrap()).unwrap();
        assert_eq!(json["mode"], "enhanced");
        assert_eq!(json["namespace"], "App");
        assert_eq!(json["tokens"][0]["category"], "variable");
        assert_eq!(json["tokens"][0]["kind"], "T_VARIABLE");
        assert!(json.get("metrics").is_none());
    }
}
