//! Structured-extraction capability
//!
//! Extraction rules are opaque to the crawler core: the configured rule
//! spec travels with the page bytes to an [`Extractor`], and whatever JSON
//! comes back is stored as the page's result. The crate ships
//! [`SelectorExtractor`], which reads the spec as a JSON object of
//! field name -> CSS selector and emits field name -> first-match text;
//! other backends plug in behind the same trait.

use scraper::{Html, Selector};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors surfaced by extraction backends
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid rule spec: {0}")]
    InvalidSpec(String),

    #[error("Extraction failed: {0}")]
    Failed(String),
}

/// Opaque structured-extraction capability
///
/// Implementations interpret `rule_spec` however they like; the crawler
/// only passes it through and stores the resulting JSON. An extraction
/// error is fatal to the run: it signals a broken rule spec, not a broken
/// page.
pub trait Extractor: Send + Sync {
    fn extract(&self, body: &[u8], rule_spec: &str) -> Result<Value, ExtractError>;
}

/// Rule interpreter mapping CSS selectors to output fields
///
/// Spec format: `{"title": "h1", "price": ".price > span"}`. Fields whose
/// selector matches nothing come out as `null`.
#[derive(Debug, Default)]
pub struct SelectorExtractor;

impl Extractor for SelectorExtractor {
    fn extract(&self, body: &[u8], rule_spec: &str) -> Result<Value, ExtractError> {
        let rules: Map<String, Value> =
            serde_json::from_str(rule_spec).map_err(|e| ExtractError::InvalidSpec(e.to_string()))?;

        let document = Html::parse_document(&String::from_utf8_lossy(body));
        let mut out = Map::new();

        for (field, rule) in rules {
            let selector_str = rule.as_str().ok_or_else(|| {
                ExtractError::InvalidSpec(format!("selector for '{field}' is not a string"))
            })?;
            let selector = Selector::parse(selector_str).map_err(|e| {
                ExtractError::InvalidSpec(format!("bad selector for '{field}': {e:?}"))
            })?;

            let text = document
                .select(&selector)
                .next()
                .map(|element| element.text().collect::<String>().trim().to_string());

            out.insert(field, text.map(Value::String).unwrap_or(Value::Null));
        }

        Ok(Value::Object(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <h1> Widget </h1>
        <div class="price"><span>9.99</span></div>
    </body></html>"#;

    #[test]
    fn test_extracts_first_match_text() {
        let result = SelectorExtractor
            .extract(PAGE.as_bytes(), r#"{"title": "h1", "price": ".price > span"}"#)
            .unwrap();

        assert_eq!(result["title"], "Widget");
        assert_eq!(result["price"], "9.99");
    }

    #[test]
    fn test_missing_match_is_null() {
        let result = SelectorExtractor
            .extract(PAGE.as_bytes(), r#"{"author": ".byline"}"#)
            .unwrap();

        assert_eq!(result["author"], Value::Null);
    }

    #[test]
    fn test_invalid_spec_errors() {
        let err = SelectorExtractor
            .extract(PAGE.as_bytes(), "not json")
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSpec(_)));

        let err = SelectorExtractor
            .extract(PAGE.as_bytes(), r#"{"title": 42}"#)
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSpec(_)));

        let err = SelectorExtractor
            .extract(PAGE.as_bytes(), r#"{"title": ":::"}"#)
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidSpec(_)));
    }

    #[test]
    fn test_same_input_same_output() {
        let spec = r#"{"title": "h1"}"#;
        let first = SelectorExtractor.extract(PAGE.as_bytes(), spec).unwrap();
        let second = SelectorExtractor.extract(PAGE.as_bytes(), spec).unwrap();
        assert_eq!(first, second);
    }
}
