use thiserror::Error;

/// 索引文件编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    /// 数据长度不足以包含文件头
    #[error("数据太短，无法解析: {0} 字节")]
    TooShort(usize),

    /// 魔数不匹配
    #[error("无效的文件格式：魔数不匹配")]
    BadMagic,

    /// 主版本号超出支持范围
    #[error("不支持的版本: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// 解压后的大小与文件头记录不一致
    #[error("解压后数据大小不匹配: 期望 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("序列化失败: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("反序列化失败: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 文章数据校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostError {
    /// 文章缺少 slug
    #[error("文章缺少 slug (标题: {title:?})")]
    MissingSlug { title: Option<String> },

    /// 两篇文章使用了同一个 slug
    #[error("重复的文章 slug: {0}")]
    DuplicateSlug(String),
}

/// 索引构建/保存错误
#[derive(Debug, Error)]
pub enum IndexBuildError {
    /// 没有任何文章
    #[error("无法构建索引: 没有文章数据")]
    NoPosts,

    #[error("压缩索引失败: {0}")]
    Codec(#[from] CodecError),

    #[error("无法写入索引文件 {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
