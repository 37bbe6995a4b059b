//! 构建期工具：读取内容管线导出的文章，生成浏览器端使用的筛选索引和搜索索引。

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use article_filter::builder::FilterBuilder;
use search_wasm::builder::SearchBuilder;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod ingest;

pub use config::IndexerConfig;
pub use error::{ConfigError, IndexerError};

/// 一次生成的统计
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSummary {
    pub posts: usize,
    pub headings: usize,
    pub filter_index: PathBuf,
    pub search_index: PathBuf,
    pub elapsed_secs: f32,
}

/// 日志级别：0 → warn，1 → info，2 → debug，更多 → trace
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// 初始化日志输出到 stderr，环境变量优先于 `-v`
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(config::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 生成索引的主流程
pub fn generate_index(config: &IndexerConfig) -> Result<IndexSummary, IndexerError> {
    let start_time = Instant::now();

    let taxonomy = config.load_taxonomy()?;
    let posts = ingest::load_posts(&config.posts)?;
    tracing::info!(posts = posts.len(), "文章读取完成");

    fs::create_dir_all(&config.output).map_err(|source| IndexerError::Output {
        path: config.output.clone(),
        source,
    })?;

    let mut filter_builder = FilterBuilder::new(taxonomy);
    let mut search_builder = SearchBuilder::new();
    let mut headings = 0;
    for post in posts.posts() {
        headings += post.headings.len();
        search_builder.add_post(post);
    }
    let post_count = posts.len();
    for post in posts.into_posts() {
        filter_builder.add_post(post);
    }

    let filter_index = config.filter_index_path();
    let search_index = config.search_index_path();
    filter_builder.save_filter_index(&filter_index)?;
    search_builder.save_search_index(&search_index)?;

    Ok(IndexSummary {
        posts: post_count,
        headings,
        filter_index,
        search_index,
        elapsed_secs: start_time.elapsed().as_secs_f32(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity_to_directive(0), "warn");
        assert_eq!(verbosity_to_directive(1), "info");
        assert_eq!(verbosity_to_directive(2), "debug");
        assert_eq!(verbosity_to_directive(9), "trace");
    }

    #[test]
    fn init_logging_twice_is_harmless() {
        init_logging(0);
        init_logging(3);
    }
}
