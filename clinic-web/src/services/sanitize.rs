//! Sanitizer for admin-authored rich text (service and price-category
//! descriptions). Anything outside the allowlist is stripped before the
//! markup reaches a template.

use ammonia::Builder;
use once_cell::sync::Lazy;

static RICH_TEXT: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder
        .tags(
            [
                "p", "br", "strong", "em", "u", "s", "ol", "ul", "li", "a", "h3", "h4",
                "blockquote",
            ]
            .into_iter()
            .collect(),
        )
        .url_schemes(["http", "https", "mailto", "tel"].into_iter().collect())
        .link_rel(Some("noopener noreferrer"));
    builder
});

pub fn clean_rich_text(input: &str) -> String {
    RICH_TEXT.clean(input).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_allowed_formatting() {
        let input = "<p>Annual <strong>health checks</strong> for <em>dogs and cats</em></p>";
        assert_eq!(clean_rich_text(input), input);
    }

    #[test]
    fn strips_script_tags() {
        let cleaned = clean_rich_text("<p>Vaccinations</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Vaccinations</p>");
    }

    #[test]
    fn strips_event_handler_attributes() {
        let cleaned = clean_rich_text("<p onclick=\"steal()\">Surgery aftercare</p>");
        assert_eq!(cleaned, "<p>Surgery aftercare</p>");
    }

    #[test]
    fn strips_javascript_urls() {
        let cleaned = clean_rich_text("<a href=\"javascript:alert(1)\">book now</a>");
        assert!(!cleaned.contains("javascript:"));
        assert!(cleaned.contains("book now"));
    }

    #[test]
    fn adds_safe_rel_to_links() {
        let cleaned = clean_rich_text("<a href=\"https://example.com\">referral form</a>");
        assert!(cleaned.contains("rel=\"noopener noreferrer\""));
        assert!(cleaned.contains("href=\"https://example.com\""));
    }
}
