use std::path::PathBuf;

use thiserror::Error;
use utils_common::{IndexBuildError, PostError};

/// 配置文件错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("分类配置无效: {0}")]
    Invalid(String),
}

/// 索引生成过程中的错误
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("文章源不存在: {0}")]
    MissingSource(PathBuf),

    #[error("遍历目录时出错: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("无法读取文章数据 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("文章数据格式错误 {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("无法创建输出目录 {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Post(#[from] PostError),

    #[error(transparent)]
    Build(#[from] IndexBuildError),
}
