use chrono::Utc;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use utils_common::compression::{to_compressed, FORMAT_VERSION};
use utils_common::{IndexBuildError, Post};

use crate::models::{SearchDocument, SearchIndex};

/// 搜索索引构建器
pub struct SearchBuilder {
    documents: Vec<SearchDocument>,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBuilder {
    /// 创建新的搜索索引构建器
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    /// 获取索引构建器中的文档数量
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// 添加文章到索引构建器
    pub fn add_post(&mut self, post: &Post) {
        self.documents.push(SearchDocument::from(post));
    }

    /// 构建搜索索引
    pub fn build_search_index(&self) -> Result<SearchIndex, IndexBuildError> {
        if self.documents.is_empty() {
            tracing::error!("无法构建搜索索引，没有文章数据");
            return Err(IndexBuildError::NoPosts);
        }

        let undescribed = self.documents.iter().filter(|d| d.description.is_empty()).count();
        if undescribed > 0 {
            tracing::warn!(count = undescribed, "部分文章没有描述或节选，只能按标题和标签搜索");
        }
        tracing::info!(documents = self.documents.len(), "搜索索引构建完成");

        Ok(SearchIndex {
            documents: self.documents.clone(),
            created_at: Utc::now(),
        })
    }

    /// 保存搜索索引到文件
    pub fn save_search_index(&self, path: &Path) -> Result<(), IndexBuildError> {
        let index = self.build_search_index()?;
        let compressed = to_compressed(&index, FORMAT_VERSION)?;

        let io_err = |source| IndexBuildError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::create(path).map_err(io_err)?;
        file.write_all(&compressed).map_err(io_err)?;

        tracing::info!(path = %path.display(), bytes = compressed.len(), "搜索索引已写入文件");
        Ok(())
    }
}
