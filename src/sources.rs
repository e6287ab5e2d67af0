//! Static registry of the sites we scrape.
//!
//! | Source | Listing page | Encoding |
//! |--------|--------------|----------|
//! | cnblogs | `https://www.cnblogs.com` | UTF-8 |
//! | v2ex | `https://www.v2ex.com/?tab=hot` | UTF-8 |
//! | segmentfault | `https://segmentfault.com/hottest` | UTF-8 |
//! | weixin | `https://weixin.sogou.com` | UTF-8 |
//! | douban | `https://www.douban.com/group/explore` | UTF-8 |
//! | ithome | `https://www.ithome.com` | UTF-8 |
//! | kr36 | `https://36kr.com` | UTF-8 |
//! | baidu | `http://top.baidu.com/buzz?b=1&fr=topindex` | GB2312 (decoded as GBK) |
//! | tieba | `http://tieba.baidu.com/hottopic/browse/topicList` | UTF-8 |
//! | weibo | `https://s.weibo.com/top/summary/summary` | UTF-8 |

use crate::models::{SourceConfig, SourceId, TextEncoding};

impl SourceId {
    /// Listing page fetched for this source.
    pub fn fetch_url(&self) -> &'static str {
        match self {
            SourceId::Cnblogs => "https://www.cnblogs.com",
            SourceId::V2ex => "https://www.v2ex.com/?tab=hot",
            SourceId::Segmentfault => "https://segmentfault.com/hottest",
            SourceId::Weixin => "https://weixin.sogou.com",
            SourceId::Douban => "https://www.douban.com/group/explore",
            SourceId::Ithome => "https://www.ithome.com",
            SourceId::Kr36 => "https://36kr.com",
            SourceId::Baidu => "http://top.baidu.com/buzz?b=1&fr=topindex",
            SourceId::Tieba => "http://tieba.baidu.com/hottopic/browse/topicList",
            SourceId::Weibo => "https://s.weibo.com/top/summary/summary",
        }
    }

    /// Site origin prefixed onto relative links.
    pub fn origin(&self) -> &'static str {
        match self {
            SourceId::Cnblogs => "https://www.cnblogs.com",
            SourceId::V2ex => "https://www.v2ex.com",
            SourceId::Segmentfault => "https://segmentfault.com",
            SourceId::Weixin => "https://weixin.sogou.com",
            SourceId::Douban => "https://www.douban.com",
            SourceId::Ithome => "https://www.ithome.com",
            SourceId::Kr36 => "https://36kr.com",
            SourceId::Baidu => "http://top.baidu.com",
            SourceId::Tieba => "http://tieba.baidu.com",
            SourceId::Weibo => "https://s.weibo.com",
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        match self {
            SourceId::Baidu => TextEncoding::Gbk,
            _ => TextEncoding::Utf8,
        }
    }

    pub fn config(&self) -> SourceConfig {
        SourceConfig {
            id: *self,
            url: self.fetch_url().to_string(),
            encoding: self.encoding(),
        }
    }
}

/// Every known source, in registry order.
pub fn all_sources() -> Vec<SourceConfig> {
    SourceId::ALL.iter().map(SourceId::config).collect()
}
