use scraper::{Html, Selector};
use url::Url;

use crawler_logging::crawl_debug;

/// Matches every link-bearing and image-bearing element in one pass.
const PAGE_ITEM_SELECTOR: &str = "a[href], img[src]";

/// One element discovered in a page, resolved to an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageItem {
    /// An `img` source, destined for the job's result set.
    Image { url: Url },
    /// An anchor href, candidate for follow-on crawling.
    Link { url: Url },
}

/// Scans a document for image sources and outbound links, resolving each
/// reference against `base` (the URL the page was actually fetched from).
///
/// References that are empty, fragment-only, non-http(s), or unparseable are
/// logged and skipped; one bad element never blocks the others.
pub fn scan_document(html: &str, base: &Url) -> Vec<PageItem> {
    let Ok(selector) = Selector::parse(PAGE_ITEM_SELECTOR) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for element in document.select(&selector) {
        if element.value().name() == "img" {
            let Some(src) = element.value().attr("src") else {
                continue;
            };
            match resolve_url(src, base) {
                Some(url) => items.push(PageItem::Image { url }),
                None => crawl_debug!("skipping image source {src:?} on {base}"),
            }
        } else {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            match resolve_url(href, base) {
                Some(url) => items.push(PageItem::Link { url }),
                None => crawl_debug!("skipping href {href:?} on {base}"),
            }
        }
    }

    items
}

/// Resolves a possibly-relative reference to an absolute crawlable URL.
fn resolve_url(reference: &str, base: &Url) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }

    let url = Url::parse(trimmed)
        .ok()
        .or_else(|| base.join(trimmed).ok())?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/dir/page").unwrap()
    }

    #[test]
    fn relative_references_resolve_against_base() {
        let url = resolve_url("/images/logo.jpg", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/images/logo.jpg");

        let url = resolve_url("next", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/dir/next");
    }

    #[test]
    fn fragments_and_scripting_schemes_are_skipped() {
        assert_eq!(resolve_url("#top", &base()), None);
        assert_eq!(resolve_url("javascript:void(0)", &base()), None);
        assert_eq!(resolve_url("mailto:someone@example.com", &base()), None);
        assert_eq!(resolve_url("   ", &base()), None);
    }
}
