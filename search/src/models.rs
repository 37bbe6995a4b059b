use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utils_common::{CodecError, Post};

/// 搜索结果最多显示条数
pub const MAX_RESULTS: usize = 5;

/// 失焦后关闭结果面板的延迟（毫秒），保证点击结果能先生效
pub const BLUR_CLOSE_DELAY_MS: f64 = 200.0;

/// 没有结果时的提示
pub const NO_RESULTS_MESSAGE: &str = "검색 결과가 없습니다";

/// 搜索文档 - 一篇文章的可搜索字段，附带预先小写化的匹配文本
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchDocument {
    /// 文章 slug
    pub slug: String,
    /// 标题
    pub title: String,
    /// 摘要（描述或节选）
    pub description: String,
    /// 日期
    pub date: String,
    /// 标签
    pub tags: Vec<String>,
    /// 小写标题
    pub title_lower: String,
    /// 小写摘要
    pub description_lower: String,
    /// 以空格连接的小写标签
    pub tags_lower: String,
}

impl From<&Post> for SearchDocument {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            date: post.date.clone(),
            tags: post.tags.clone(),
            title_lower: post.title.to_lowercase(),
            description_lower: post.description.to_lowercase(),
            tags_lower: post.tags.join(" ").to_lowercase(),
        }
    }
}

/// 搜索索引
#[derive(Serialize, Deserialize, Debug)]
pub struct SearchIndex {
    /// 文档列表，保持文章列表顺序
    pub documents: Vec<SearchDocument>,
    /// 索引创建时间
    pub created_at: DateTime<Utc>,
}

/// 搜索错误
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("解压搜索索引失败: {0}")]
    Codec(#[from] CodecError),

    #[error("无效的搜索词: {0}")]
    Pattern(#[from] regex::Error),
}

/// 高亮片段
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// 是否为匹配部分
    pub matched: bool,
}

/// 搜索结果条目
#[derive(Serialize, Debug, Clone)]
pub struct SearchResultItem {
    /// 文章 slug，用作链接和列表 key
    pub slug: String,
    pub date: String,
    /// 高亮后的标题片段
    pub title: Vec<Segment>,
    /// 高亮后的摘要片段
    pub description: Vec<Segment>,
}

/// 搜索结果
#[derive(Serialize, Debug)]
pub struct SearchResult {
    /// 搜索结果条目（最多 MAX_RESULTS 条）
    pub items: Vec<SearchResultItem>,
    /// 搜索查询
    pub query: String,
    /// 搜索耗时(毫秒)
    pub time_ms: f64,
}
