use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use utils_common::compression::{to_compressed, FORMAT_VERSION};
use utils_common::{IndexBuildError, Post, Taxonomy};

use crate::models::FilterIndex;

/// 筛选索引构建器
pub struct FilterBuilder {
    posts: Vec<Post>,
    taxonomy: Taxonomy,
}

impl FilterBuilder {
    /// 创建新的筛选索引构建器
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            posts: Vec::new(),
            taxonomy,
        }
    }

    /// 添加文章到索引构建器
    pub fn add_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    /// 构建筛选索引
    pub fn build_filter_index(&self) -> Result<FilterIndex, IndexBuildError> {
        if self.posts.is_empty() {
            tracing::error!("无法构建索引，没有文章数据");
            return Err(IndexBuildError::NoPosts);
        }

        let uncategorized = self.posts.iter().filter(|p| p.category.is_none()).count();
        for post in &self.posts {
            if let Some(category) = &post.category {
                if !self.taxonomy.has_category(category) {
                    tracing::warn!(slug = %post.slug, category = %category, "文章分类不在配置中，只会出现在 전체 下");
                }
            }
        }

        tracing::info!(
            posts = self.posts.len(),
            uncategorized,
            tag_groups = self.taxonomy.tag_groups.len(),
            "筛选索引构建完成"
        );

        Ok(FilterIndex {
            posts: self.posts.clone(),
            taxonomy: self.taxonomy.clone(),
            created_at: Utc::now(),
        })
    }

    /// 保存筛选索引到文件
    pub fn save_filter_index(&self, path: &Path) -> Result<(), IndexBuildError> {
        let filter_index = self.build_filter_index()?;
        let compressed = to_compressed(&filter_index, FORMAT_VERSION)?;

        let io_err = |source| IndexBuildError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(&compressed).map_err(io_err)?;

        tracing::info!(path = %path.display(), bytes = compressed.len(), "筛选索引已写入文件");
        Ok(())
    }
}
