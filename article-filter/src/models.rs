use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utils_common::{CodecError, Post, PostError, Taxonomy};

/// 每页文章数
pub const PAGE_SIZE: usize = 10;

/// 筛选索引 - 文章列表与分类配置
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FilterIndex {
    /// 所有文章，最新在前
    pub posts: Vec<Post>,
    /// 分类与标签组
    pub taxonomy: Taxonomy,
    /// 索引创建时间
    pub created_at: DateTime<Utc>,
}

/// 筛选错误
#[derive(Debug, Error)]
pub enum FilterError {
    /// 分类不在配置中
    #[error("未知分类: {0}")]
    UnknownCategory(String),

    #[error("解析索引失败: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Post(#[from] PostError),

    #[error("解析参数失败: {0}")]
    Params(#[from] serde_json::Error),
}

/// 筛选参数 - 客户端一次性传递的筛选条件
#[derive(Deserialize, Debug, Default)]
pub struct FilterParams {
    /// 分类 (可选, 默认为 "전체")
    pub category: Option<String>,
    /// 选中的标签组 (可选)
    pub tag_groups: Option<Vec<String>>,
    /// 分页 - 当前页码 (可选, 默认为1)
    pub page: Option<usize>,
    /// 分页 - 每页条数 (可选, 默认为10)
    pub limit: Option<usize>,
}

/// 列表卡片 - 展示所需信息
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// 预计阅读时间（分钟）
    pub reading_minutes: u32,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            description: post.description.clone(),
            date: post.date.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            reading_minutes: post.reading_minutes(),
        }
    }
}

/// 筛选结果 - 返回给客户端
#[derive(Serialize, Debug)]
pub struct FilterResult {
    /// 当前页的文章
    pub posts: Vec<PostCard>,
    /// 筛选结果总数
    pub total: usize,
    /// 当前页码
    pub page: usize,
    /// 每页条数
    pub limit: usize,
    /// 总页数
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    /// 当前分类
    pub active_category: String,
    /// 当前选中的标签组
    pub selected_tag_groups: Vec<String>,
    /// 当前分类下可选的标签组
    pub selectable_tag_groups: Vec<String>,
}
