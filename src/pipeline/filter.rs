//! Link candidate filtering
//!
//! Every discovered href passes through the same ordered steps, so a given
//! (href, settings) pair always yields the same candidate or the same
//! discard decision.

use url::Url;

use crate::config::Settings;
use crate::pipeline::collect_hrefs;

/// Runs the full pipeline on a fetched page body.
///
/// # Filter Steps
///
/// 1. Strip a trailing `?...` part unless query parameters are retained;
///    strip a trailing `#...` part unless hash parameters are retained
/// 2. Resolve scheme-less hrefs against the base URL, inserting a `/`
///    separator only when neither side supplies one
/// 3. Discard links that do not contain the base URL (same-site scope)
/// 4. Canonicalize; discard links that fail to normalize
/// 5. Discard links matching any exclude keyword
/// 6. When include keywords are configured, discard links matching none
///
/// Duplicates within one page survive; the frontier deduplicates globally.
/// When link-following is disabled the pipeline produces nothing at all.
pub fn candidates(body: &str, settings: &Settings) -> Vec<String> {
    if settings.dont_follow_links {
        return Vec::new();
    }

    collect_hrefs(body)
        .into_iter()
        .filter_map(|href| filter_link(&href, settings))
        .collect()
}

/// Applies the filter steps to a single raw href.
fn filter_link(href: &str, settings: &Settings) -> Option<String> {
    let mut link = href.to_string();

    if !settings.allow_query_parameters {
        if let Some(idx) = link.find('?') {
            link.truncate(idx);
        }
    }
    if !settings.allow_hash_parameters {
        if let Some(idx) = link.find('#') {
            link.truncate(idx);
        }
    }

    // resolve relative hrefs against the base URL; one-char leftovers like
    // "/" or "." are junk, not links
    if !link.starts_with("http") && link.len() > 1 {
        if !settings.base_url.ends_with('/') && !link.starts_with('/') {
            link.insert(0, '/');
        }
        link = format!("{}{}", settings.base_url, link);
    }

    // same-site scope: the base URL must appear in the resolved string
    if !link.contains(&settings.base_url) {
        return None;
    }

    let normalized = canonicalize(&link)?;

    if settings
        .keywords_to_exclude
        .iter()
        .any(|kw| normalized.contains(kw))
    {
        return None;
    }

    if !settings.keywords_to_include.is_empty()
        && !settings
            .keywords_to_include
            .iter()
            .any(|kw| normalized.contains(kw))
    {
        return None;
    }

    Some(normalized)
}

/// Canonicalizes a link into one comparable absolute form.
///
/// Parsing through [`Url`] lowercases the scheme and host, strips default
/// ports and resolves dot segments. Anything that fails to parse, or does
/// not come out as an http(s) URL, is discarded.
pub fn canonicalize(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    let normalized = url.to_string();
    if normalized.is_empty() {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base: &str) -> Settings {
        Settings {
            base_url: base.to_string(),
            ..Settings::default()
        }
    }

    fn one(href: &str, settings: &Settings) -> Option<String> {
        filter_link(href, settings)
    }

    #[test]
    fn test_relative_link_resolved_against_base() {
        let s = settings("http://x.test");
        assert_eq!(one("/a", &s), Some("http://x.test/a".to_string()));
        assert_eq!(one("page/deep", &s), Some("http://x.test/page/deep".to_string()));
    }

    #[test]
    fn test_separator_inserted_only_when_missing() {
        let slashed = settings("http://x.test/");
        assert_eq!(one("a/b", &slashed), Some("http://x.test/a/b".to_string()));

        let bare = settings("http://x.test");
        assert_eq!(one("a/b", &bare), Some("http://x.test/a/b".to_string()));
        assert_eq!(one("/a/b", &bare), Some("http://x.test/a/b".to_string()));
    }

    #[test]
    fn test_query_stripped_by_default() {
        let s = settings("http://x.test");
        assert_eq!(one("/b?x=1", &s), Some("http://x.test/b".to_string()));
    }

    #[test]
    fn test_query_kept_when_allowed() {
        let mut s = settings("http://x.test");
        s.allow_query_parameters = true;
        assert_eq!(one("/b?x=1", &s), Some("http://x.test/b?x=1".to_string()));
    }

    #[test]
    fn test_hash_stripped_by_default() {
        let s = settings("http://x.test");
        assert_eq!(one("/b#frag", &s), Some("http://x.test/b".to_string()));
        assert_eq!(one("/b?x=1#frag", &s), Some("http://x.test/b".to_string()));
    }

    #[test]
    fn test_hash_kept_when_allowed() {
        let mut s = settings("http://x.test");
        s.allow_hash_parameters = true;
        assert_eq!(one("/b#frag", &s), Some("http://x.test/b#frag".to_string()));
    }

    #[test]
    fn test_off_site_links_discarded() {
        let s = settings("http://x.test");
        assert_eq!(one("http://other.test/page", &s), None);
    }

    #[test]
    fn test_junk_hrefs_discarded() {
        let s = settings("http://x.test");
        assert_eq!(one("#", &s), None);
        assert_eq!(one("?", &s), None);
        assert_eq!(one("", &s), None);
    }

    #[test]
    fn test_exclude_keyword_always_wins() {
        let mut s = settings("http://x.test");
        s.keywords_to_exclude = vec!["logout".to_string()];
        s.keywords_to_include = vec!["logout".to_string()];
        assert_eq!(one("/logout", &s), None);
    }

    #[test]
    fn test_include_keywords_gate_when_nonempty() {
        let mut s = settings("http://x.test");
        s.keywords_to_include = vec!["article".to_string(), "post".to_string()];

        assert_eq!(
            one("/article/42", &s),
            Some("http://x.test/article/42".to_string())
        );
        assert_eq!(one("/about", &s), None);
    }

    #[test]
    fn test_canonicalize_normalizes_host_and_port() {
        assert_eq!(
            canonicalize("HTTP://X.Test:80/a/../b"),
            Some("http://x.test/b".to_string())
        );
    }

    #[test]
    fn test_canonicalize_rejects_other_schemes() {
        assert_eq!(canonicalize("ftp://x.test/file"), None);
        assert_eq!(canonicalize("not a url"), None);
    }

    #[test]
    fn test_canonicalize_is_deterministic() {
        let s = settings("http://x.test");
        let first = one("/Some/Path", &s);
        for _ in 0..5 {
            assert_eq!(one("/Some/Path", &s), first);
        }
    }

    #[test]
    fn test_candidates_full_page() {
        let s = settings("http://x.test");
        let html = r#"<html><body>
            <a href="/a">a</a>
            <a href="/b?x=1#f">b</a>
            <a href="http://elsewhere.test/c">off-site</a>
        </body></html>"#;

        assert_eq!(
            candidates(html, &s),
            vec!["http://x.test/a", "http://x.test/b"]
        );
    }

    #[test]
    fn test_candidates_skipped_when_following_disabled() {
        let mut s = settings("http://x.test");
        s.dont_follow_links = true;
        assert!(candidates(r#"<a href="/a">a</a>"#, &s).is_empty());
    }

    #[test]
    fn test_intra_page_duplicates_survive() {
        let s = settings("http://x.test");
        let html = r#"<a href="/a">1</a><a href="/a">2</a>"#;
        assert_eq!(
            candidates(html, &s),
            vec!["http://x.test/a", "http://x.test/a"]
        );
    }
}
