//! Raw href extraction from fetched markup

use scraper::{Html, Selector};

/// Collects every `href` attribute from anchor tags in the document.
///
/// No filtering happens here; the returned strings are raw material for
/// [`crate::pipeline::candidates`].
pub fn collect_hrefs(body: &str) -> Vec<String> {
    let document = Html::parse_document(body);
    let mut hrefs = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                hrefs.push(href.trim().to_string());
            }
        }
    }

    hrefs
}
