//! Link extraction from HTML text.

use once_cell::sync::Lazy;
use regex::Regex;

/// `href="..."` or `href='...'` whose value starts with an HTTP(S) scheme.
/// The value runs up to the next quote of either kind.
static HREF_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href=["'](https?://[^"']+)["']"#).expect("valid href regex"));

/// Absolute HTTP(S) URLs referenced from `href` attributes, in document order.
///
/// Duplicates are kept, relative URLs are ignored, and nothing beyond the
/// scheme prefix is validated.
pub fn extract_links(html: &str) -> Vec<String> {
    HREF_REGEX
        .captures_iter(html)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Whether the link text ends in `.json` (case-sensitive).
///
/// The whole string is checked, query and fragment included, and the URL
/// is not parsed.
pub fn is_json_link(url: &str) -> bool {
    url.ends_with(".json")
}

/// Keep only the links ending in `.json`, preserving order.
pub fn json_links(links: Vec<String>) -> Vec<String> {
    links.into_iter().filter(|link| is_json_link(link)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_both_quote_styles_in_order() {
        let html = r#"<a href="https://a.com/x">x</a> <a href='http://b.com/y.json'>y</a>"#;
        assert_eq!(
            extract_links(html),
            vec!["https://a.com/x", "http://b.com/y.json"]
        );
    }

    #[test]
    fn test_extract_keeps_duplicates() {
        let html = r#"<a href="https://a.com/">1</a><a href="https://a.com/">2</a>"#;
        assert_eq!(extract_links(html), vec!["https://a.com/", "https://a.com/"]);
    }

    #[test]
    fn test_extract_ignores_relative_and_other_schemes() {
        let html = r#"<a href="/local.json">r</a><a href="mailto:x@y.z">m</a><a href="ftp://h/f.json">f</a>"#;
        assert!(extract_links(html).is_empty());
    }

    #[test]
    fn test_extract_requires_lowercase_attribute_without_spaces() {
        let html = r#"<a HREF="https://a.com/x">x</a><a href = "https://b.com/y">y</a>"#;
        assert!(extract_links(html).is_empty());
    }

    #[test]
    fn test_extract_stops_at_either_quote() {
        let html = r#"<a href="https://a.com/it's.json">x</a>"#;
        assert_eq!(extract_links(html), vec!["https://a.com/it"]);
    }

    #[test]
    fn test_is_json_link_checks_whole_string() {
        assert!(is_json_link("https://ex.com/data.json"));
        assert!(is_json_link("https://ex.com/get?file=report.json"));
        assert!(is_json_link("https://exa mple.com/d.json"));
        assert!(!is_json_link("https://ex.com/data.json?v=2"));
        assert!(!is_json_link("https://ex.com/data.json#top"));
        assert!(!is_json_link("https://ex.com/data.json.html"));
        assert!(!is_json_link("https://ex.com/DATA.JSON"));
    }

    #[test]
    fn test_json_links_preserves_order() {
        let links = vec![
            "https://a.com/2.json".to_string(),
            "https://a.com/page".to_string(),
            "https://a.com/1.json".to_string(),
        ];
        assert_eq!(
            json_links(links),
            vec!["https://a.com/2.json", "https://a.com/1.json"]
        );
    }
}
