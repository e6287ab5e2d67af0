//! Trending-topic scrapers for the supported sites.
//!
//! Every site is scraped in two steps:
//!
//! 1. **Fetching** ([`fetch`]): download the listing page and decode it with the
//!    source's declared text encoding
//! 2. **Extraction** ([`extract`]): parse the markup and apply the source's
//!    [`ExtractionRule`] to produce ordered [`Entry`] records
//!
//! # Supported Sources
//!
//! | Source | Title | Link | Notes |
//! |--------|-------|------|-------|
//! | cnblogs | anchor text | `href` | post list |
//! | v2ex | anchor text | `href`, origin-prefixed | hot tab |
//! | segmentfault | nested `h4` text | `href`, origin-prefixed | second anchor per item |
//! | weixin | anchor text | `href` | sogou listing |
//! | douban | anchor text | `href` | group explore |
//! | ithome | anchor text | `href` | rank list |
//! | kr36 | anchor text | `href`, origin-prefixed | duplicate links dropped |
//! | baidu | anchor text | `href` | GB2312 page |
//! | tieba | anchor text | `href` without `amp;` | topic list |
//! | weibo | anchor text | `href` or `href_to`, origin-prefixed | summary table |
//!
//! A page with no matching nodes yields no entries, not an error.

pub mod fetch;
pub mod rules;

use crate::error::ExtractionError;
use crate::models::{Entry, SourceId};
use crate::utils::clean_text;
use itertools::Itertools;
use rules::{ExtractionRule, TitleSource, rule_for};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Parse decoded markup and extract the source's entries.
pub fn scrape_markup(source: SourceId, markup: &str) -> Result<Vec<Entry>, ExtractionError> {
    let document = Html::parse_document(markup);
    extract(source, &document)
}

/// Apply `source`'s extraction rule to a parsed document.
pub fn extract(source: SourceId, document: &Html) -> Result<Vec<Entry>, ExtractionError> {
    let rule = rule_for(source);
    let selector = parse_selector(source, rule.selector)?;
    let child = match rule.title {
        TitleSource::Text => None,
        TitleSource::Child(raw) => Some((raw, parse_selector(source, raw)?)),
    };
    let origin = rule.complete.then(|| source.origin());

    let mut entries = Vec::new();
    for element in document.select(&selector) {
        let title = match &child {
            None => node_text(element),
            Some((raw, child_selector)) => element
                .select(child_selector)
                .next()
                .map(node_text)
                .ok_or(ExtractionError::MissingNode {
                    source_id: source,
                    selector: *raw,
                })?,
        };
        let url = entry_url(&rule, element, origin);
        entries.push(Entry::new(title, url));
    }

    let matched = entries.len();
    if rule.dedup_by_url {
        entries = entries.into_iter().unique_by(|e| e.url.clone()).collect();
    }
    debug!(%source, matched, kept = entries.len(), "Extracted entries");

    Ok(entries)
}

/// Prefix `href` with a site origin. Absolute `http(s)` links are kept verbatim;
/// anything else, including `//host/...` and `javascript:` values, stays on the origin.
pub fn complete_url(origin: &str, href: &str) -> String {
    let absolute = Url::parse(href)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false);
    if absolute {
        return href.to_string();
    }

    let origin = origin.trim_end_matches('/');
    if href.is_empty() || href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

fn parse_selector(source: SourceId, raw: &'static str) -> Result<Selector, ExtractionError> {
    Selector::parse(raw).map_err(|e| ExtractionError::InvalidSelector {
        source_id: source,
        selector: raw,
        reason: e.to_string(),
    })
}

fn node_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

fn attr<'a>(element: ElementRef<'a>, name: &str) -> &'a str {
    element.value().attr(name).unwrap_or("")
}

fn entry_url(rule: &ExtractionRule, element: ElementRef<'_>, origin: Option<&str>) -> String {
    let mut href = attr(element, rule.href);
    if let Some((placeholder, fallback)) = rule.fallback {
        if href == placeholder {
            href = attr(element, fallback);
        }
    }

    let href = match rule.strip {
        Some(literal) => href.replace(literal, ""),
        None => href.to_string(),
    };

    match origin {
        Some(origin) => complete_url(origin, &href),
        None => href,
    }
}
