//! Data models for scraped trending-topic listings.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SourceId`]: The fixed set of sites we scrape
//! - [`SourceConfig`]: Where and how to fetch one source
//! - [`Entry`]: A single (title, url) record from a listing
//! - [`SourceSnapshot`]: All entries captured from one source in a run
//! - [`AggregateResult`]: The non-empty snapshots produced by one run
//! - [`StoredSnapshot`]: The persisted form written by the snapshot store

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a supported content site.
///
/// Serialized lowercase, so 36Kr is written as `kr36`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Cnblogs,
    V2ex,
    Segmentfault,
    Weixin,
    Douban,
    Ithome,
    Kr36,
    Baidu,
    Tieba,
    Weibo,
}

impl SourceId {
    /// Every source in registry order.
    pub const ALL: [SourceId; 10] = [
        SourceId::Cnblogs,
        SourceId::V2ex,
        SourceId::Segmentfault,
        SourceId::Weixin,
        SourceId::Douban,
        SourceId::Ithome,
        SourceId::Kr36,
        SourceId::Baidu,
        SourceId::Tieba,
        SourceId::Weibo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Cnblogs => "cnblogs",
            SourceId::V2ex => "v2ex",
            SourceId::Segmentfault => "segmentfault",
            SourceId::Weixin => "weixin",
            SourceId::Douban => "douban",
            SourceId::Ithome => "ithome",
            SourceId::Kr36 => "kr36",
            SourceId::Baidu => "baidu",
            SourceId::Tieba => "tieba",
            SourceId::Weibo => "weibo",
        }
    }

    /// Human-readable site name, as shown on the site itself.
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Cnblogs => "博客园",
            SourceId::V2ex => "V2EX",
            SourceId::Segmentfault => "SegmentFault",
            SourceId::Weixin => "微信热门",
            SourceId::Douban => "豆瓣精选",
            SourceId::Ithome => "IT之家",
            SourceId::Kr36 => "36氪",
            SourceId::Baidu => "百度热搜",
            SourceId::Tieba => "贴吧热议",
            SourceId::Weibo => "微博热搜",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text encoding a source serves its listing page in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// Legacy simplified-Chinese encoding. Pages declaring GB2312 are decoded
    /// as GBK, its superset.
    Gbk,
}

impl TextEncoding {
    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            TextEncoding::Utf8 => encoding_rs::UTF_8,
            TextEncoding::Gbk => encoding_rs::GBK,
        }
    }
}

/// Where and how to fetch one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub id: SourceId,
    pub url: String,
    pub encoding: TextEncoding,
}

/// One (title, url) record extracted from a listing page.
///
/// The title is display text and may be empty; the url is absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub url: String,
}

impl Entry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// All entries captured from one source in a single run, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub source: SourceId,
    pub entries: Vec<Entry>,
}

impl SourceSnapshot {
    pub fn new(source: SourceId, entries: Vec<Entry>) -> Self {
        Self { source, entries }
    }

    pub fn empty(source: SourceId) -> Self {
        Self::new(source, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The outcome of one aggregation run: only snapshots with at least one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    pub snapshots: Vec<SourceSnapshot>,
}

impl AggregateResult {
    /// Keep the non-empty snapshots, preserving their order.
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = SourceSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn total_entries(&self) -> usize {
        self.snapshots.iter().map(|s| s.entries.len()).sum()
    }
}

/// What the snapshot store persists: the last successful run's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub updated_at: DateTime<Utc>,
    pub sources: Vec<SourceSnapshot>,
}
