use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::PostError;

/// 每分钟阅读字数
pub const WORDS_PER_MINUTE: u32 = 200;

/// 缺少字数信息时显示的阅读时间（分钟）
pub const DEFAULT_READING_MINUTES: u32 = 5;

/// "전체" 分类 - 不做分类筛选
pub const ALL_CATEGORY: &str = "전체";

/// 目录项 - 文章正文中的一个 h2/h3/h4 标题
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OutlineEntry {
    /// 锚点 ID
    pub id: String,
    /// 标题文本
    pub text: String,
    /// 标题级别（2、3 或 4）
    pub depth: u8,
    /// ID 是否为生成的（需要写回 DOM）
    #[serde(default)]
    pub assigned: bool,
}

//===== 内容管线导出的原始结构 =====

#[derive(Deserialize, Debug, Default, Clone)]
pub struct RawFields {
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct RawFrontmatter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct RawWordCount {
    #[serde(default)]
    pub words: Option<u32>,
}

/// 原始文章节点 - 与构建期内容管线的导出格式一致，所有字段都可能缺失
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    #[serde(default)]
    pub fields: RawFields,
    #[serde(default)]
    pub frontmatter: RawFrontmatter,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub word_count: Option<RawWordCount>,
    /// 渲染后的正文 HTML
    #[serde(default)]
    pub html: Option<String>,
    /// 发布时间（RFC 3339），只用于排序
    #[serde(default)]
    pub published_at: Option<String>,
}

//===== 规范化后的文章 =====

/// 文章 - 一次页面加载内不可变
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    /// 唯一路径标识
    pub slug: String,
    /// 标题
    pub title: String,
    /// 摘要，缺省时为自动生成的节选
    pub description: String,
    /// 已格式化的日期字符串
    pub date: String,
    /// 分类
    pub category: Option<String>,
    /// 标签，保持原顺序
    pub tags: Vec<String>,
    /// 字数
    pub word_count: Option<u32>,
    /// 发布时间
    pub published_at: Option<DateTime<Utc>>,
    /// 构建期预先计算的目录
    #[serde(default)]
    pub headings: Vec<OutlineEntry>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Post {
    /// 在数据入口处校验并补齐可选字段
    pub fn from_raw(raw: RawPost) -> Result<Self, PostError> {
        let title = non_blank(raw.frontmatter.title);
        let slug = match non_blank(raw.fields.slug) {
            Some(slug) => slug,
            None => return Err(PostError::MissingSlug { title }),
        };

        let description = non_blank(raw.frontmatter.description)
            .or_else(|| non_blank(raw.excerpt))
            .unwrap_or_default();

        let tags = raw
            .frontmatter
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        let published_at = raw.published_at.as_deref().and_then(|s| {
            match DateTime::parse_from_rfc3339(s) {
                Ok(dt) => Some(dt.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(slug = %slug, value = s, error = %e, "无法解析发布时间，忽略");
                    None
                }
            }
        });

        Ok(Post {
            title: title.unwrap_or_else(|| slug.clone()),
            slug,
            description,
            date: raw.frontmatter.date.unwrap_or_default(),
            category: non_blank(raw.frontmatter.category),
            tags,
            word_count: raw.word_count.and_then(|wc| wc.words),
            published_at,
            headings: Vec::new(),
        })
    }

    /// 预计阅读时间（分钟）
    pub fn reading_minutes(&self) -> u32 {
        match self.word_count {
            Some(words) if words > 0 => words.div_ceil(WORDS_PER_MINUTE),
            _ => DEFAULT_READING_MINUTES,
        }
    }
}

/// 文章集合 - slug 唯一，顺序即展示顺序（最新在前）
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PostCollection {
    posts: Vec<Post>,
}

impl PostCollection {
    /// 创建集合，拒绝重复的 slug
    pub fn new(posts: Vec<Post>) -> Result<Self, PostError> {
        let mut seen = HashSet::with_capacity(posts.len());
        for post in &posts {
            if !seen.insert(post.slug.as_str()) {
                return Err(PostError::DuplicateSlug(post.slug.clone()));
            }
        }
        Ok(Self { posts })
    }

    /// 按发布时间排序，最新在前；没有发布时间的排在最后，保持原相对顺序
    pub fn sort_newest_first(&mut self) {
        self.posts.sort_by(|a, b| match (&a.published_at, &b.published_at) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.slug == slug)
    }

    /// 文章页的上一篇（更早）与下一篇（更新）
    pub fn neighbors(&self, slug: &str) -> (Option<&Post>, Option<&Post>) {
        let Some(idx) = self.posts.iter().position(|p| p.slug == slug) else {
            return (None, None);
        };
        let previous = self.posts.get(idx + 1);
        let next = idx.checked_sub(1).and_then(|i| self.posts.get(i));
        (previous, next)
    }
}

//===== 分类与标签组 =====

/// 标签组 - 一个名字对应一组原始标签
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TagGroup {
    pub name: String,
    pub tags: Vec<String>,
}

/// 分类与标签组配置
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Taxonomy {
    /// 可选分类（不含 "전체"）
    pub categories: Vec<String>,
    /// 标签组，按展示顺序
    pub tag_groups: Vec<TagGroup>,
}

static DEFAULT_TAXONOMY: Lazy<Taxonomy> = Lazy::new(|| {
    let group = |name: &str, tags: &[&str]| TagGroup {
        name: name.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    };
    Taxonomy {
        categories: vec!["개발".to_string(), "일상".to_string()],
        tag_groups: vec![
            group("프론트엔드", &["React", "JavaScript", "TypeScript", "CSS", "Gatsby"]),
            group("백엔드", &["Java", "Spring", "Node.js", "Python", "Database"]),
            group("알고리즘", &["Algorithm", "알고리즘", "코딩테스트", "자료구조"]),
            group("인프라", &["AWS", "Docker", "CI/CD", "Linux"]),
            group("회고", &["회고", "생각", "일기"]),
        ],
    }
});

impl Default for Taxonomy {
    fn default() -> Self {
        DEFAULT_TAXONOMY.clone()
    }
}

impl Taxonomy {
    /// 所有可选分类，"전체" 在最前
    pub fn category_choices(&self) -> Vec<&str> {
        std::iter::once(ALL_CATEGORY)
            .chain(self.categories.iter().map(String::as_str))
            .collect()
    }

    pub fn has_category(&self, name: &str) -> bool {
        name == ALL_CATEGORY || self.categories.iter().any(|c| c == name)
    }

    pub fn group(&self, name: &str) -> Option<&TagGroup> {
        self.tag_groups.iter().find(|g| g.name == name)
    }
}
