//! Declarative per-source extraction rules.
//!
//! Each site is described by one [`ExtractionRule`]; [`super::extract`] is the
//! only code that interprets them.

use crate::models::SourceId;

/// Where an entry's title comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    /// Text of the matched node itself.
    Text,
    /// Text of the first descendant matching this selector.
    Child(&'static str),
}

/// How to locate and shape the entries on one listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    pub selector: &'static str,
    pub title: TitleSource,
    pub href: &'static str,
    /// `(placeholder, attribute)`: read `attribute` when `href` holds `placeholder`.
    pub fallback: Option<(&'static str, &'static str)>,
    /// Literal substring removed from the link.
    pub strip: Option<&'static str>,
    /// Resolve the link against the source origin.
    pub complete: bool,
    pub dedup_by_url: bool,
}

impl ExtractionRule {
    const fn anchors(selector: &'static str) -> Self {
        Self {
            selector,
            title: TitleSource::Text,
            href: "href",
            fallback: None,
            strip: None,
            complete: false,
            dedup_by_url: false,
        }
    }

    const fn completed(self) -> Self {
        Self {
            complete: true,
            ..self
        }
    }
}

pub const WEIBO_PLACEHOLDER_HREF: &str = "javascript:void(0);";

pub fn rule_for(source: SourceId) -> ExtractionRule {
    match source {
        SourceId::Cnblogs => ExtractionRule::anchors("div#post_list > article > section > div > a"),
        SourceId::V2ex => ExtractionRule::anchors("span.item_title > a").completed(),
        SourceId::Segmentfault => ExtractionRule {
            title: TitleSource::Child("div > h4"),
            ..ExtractionRule::anchors("div.news-list > div > div > a:nth-of-type(2)").completed()
        },
        SourceId::Weixin => ExtractionRule::anchors("ul.news-list > li > div.txt-box > h3 > a"),
        SourceId::Douban => ExtractionRule::anchors("div.channel-item > div.bd > h3 > a"),
        SourceId::Ithome => ExtractionRule::anchors("div#rank > ul#d-1 > li a"),
        SourceId::Kr36 => ExtractionRule {
            dedup_by_url: true,
            ..ExtractionRule::anchors(
                "div.list-wrapper > div.list-section-wrapper > div.article-list \
                 > div > div > div > div > div > p > a",
            )
            .completed()
        },
        SourceId::Baidu => {
            ExtractionRule::anchors("table.list-table tr > td.keyword > a.list-title")
        }
        SourceId::Tieba => ExtractionRule {
            strip: Some("amp;"),
            ..ExtractionRule::anchors("ul.topic-top-list > li a")
        },
        SourceId::Weibo => ExtractionRule {
            fallback: Some((WEIBO_PLACEHOLDER_HREF, "href_to")),
            ..ExtractionRule::anchors("table > tbody > tr > td:nth-of-type(2) > a").completed()
        },
    }
}
