use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use utils_common::{Taxonomy, ALL_CATEGORY};

use crate::error::ConfigError;

pub const FILTER_INDEX_FILE: &str = "filter_index.bin";
pub const SEARCH_INDEX_FILE: &str = "search_index.bin";

/// 覆盖日志级别的环境变量
pub const LOG_ENV: &str = "ARTICLE_INDEXER_LOG";

/// 一次索引生成的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// 文章导出文件，或包含若干 `.json` 导出的目录
    pub posts: PathBuf,
    pub output: PathBuf,
    /// 分类配置，缺省时使用内置配置
    pub taxonomy: Option<PathBuf>,
    pub verbosity: u8,
}

impl IndexerConfig {
    pub fn filter_index_path(&self) -> PathBuf {
        self.output.join(FILTER_INDEX_FILE)
    }

    pub fn search_index_path(&self) -> PathBuf {
        self.output.join(SEARCH_INDEX_FILE)
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let path = |id: &str| matches.get_one::<PathBuf>(id).cloned();
        Self {
            posts: path("posts").unwrap_or_default(),
            output: path("output").unwrap_or_default(),
            taxonomy: path("taxonomy"),
            verbosity: matches.get_count("verbose"),
        }
    }

    /// 读取分类配置
    pub fn load_taxonomy(&self) -> Result<Taxonomy, ConfigError> {
        match &self.taxonomy {
            Some(path) => load_taxonomy(path),
            None => Ok(Taxonomy::default()),
        }
    }
}

/// 命令行定义
pub fn command() -> Command {
    Command::new("文章索引生成器")
        .version(env!("CARGO_PKG_VERSION"))
        .about("把文章导出数据生成为筛选索引和搜索索引")
        .arg(
            Arg::new("posts")
                .short('p')
                .long("posts")
                .value_name("POSTS")
                .help("文章导出JSON文件或目录")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("OUTPUT_DIR")
                .help("索引输出目录路径")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("taxonomy")
                .short('t')
                .long("taxonomy")
                .value_name("TAXONOMY_TOML")
                .help("分类与标签组配置文件（TOML）")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("显示详细信息，可重复使用")
                .action(ArgAction::Count),
        )
}

/// 从TOML文件读取并校验分类配置
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let taxonomy = parse_taxonomy(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_taxonomy(&taxonomy)?;

    tracing::info!(
        path = %path.display(),
        categories = taxonomy.categories.len(),
        tag_groups = taxonomy.tag_groups.len(),
        "已加载分类配置"
    );
    Ok(taxonomy)
}

pub fn parse_taxonomy(text: &str) -> Result<Taxonomy, toml::de::Error> {
    toml::from_str(text)
}

/// 分类名和标签组名都不能为空或重复，"전체" 是保留名
pub fn validate_taxonomy(taxonomy: &Taxonomy) -> Result<(), ConfigError> {
    let mut categories = HashSet::new();
    for category in &taxonomy.categories {
        if category.trim().is_empty() {
            return Err(ConfigError::Invalid("分类名不能为空".to_string()));
        }
        if category == ALL_CATEGORY {
            return Err(ConfigError::Invalid(format!("\"{}\" 是保留分类，不需要写在配置里", ALL_CATEGORY)));
        }
        if !categories.insert(category.as_str()) {
            return Err(ConfigError::Invalid(format!("重复的分类: {}", category)));
        }
    }

    let mut groups = HashSet::new();
    for group in &taxonomy.tag_groups {
        if group.name.trim().is_empty() {
            return Err(ConfigError::Invalid("标签组名不能为空".to_string()));
        }
        if !groups.insert(group.name.as_str()) {
            return Err(ConfigError::Invalid(format!("重复的标签组: {}", group.name)));
        }
        if group.tags.is_empty() {
            tracing::warn!(group = %group.name, "标签组没有任何标签，永远不会出现在可选列表里");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
categories = ["개발", "일상", "독서"]

[[tag_groups]]
name = "프론트엔드"
tags = ["React", "CSS"]

[[tag_groups]]
name = "책"
tags = ["소설", "에세이"]
"#;

    #[test]
    fn parses_toml_taxonomy() {
        let taxonomy = parse_taxonomy(SAMPLE).unwrap();
        assert_eq!(taxonomy.category_choices(), vec!["전체", "개발", "일상", "독서"]);
        assert_eq!(taxonomy.group("책").map(|g| g.tags.len()), Some(2));
        assert!(validate_taxonomy(&taxonomy).is_ok());
    }

    #[test]
    fn rejects_reserved_and_duplicate_names() {
        let reserved = parse_taxonomy("categories = [\"전체\"]\ntag_groups = []").unwrap();
        assert!(matches!(validate_taxonomy(&reserved), Err(ConfigError::Invalid(_))));

        let duplicate = parse_taxonomy("categories = [\"개발\", \"개발\"]\ntag_groups = []").unwrap();
        assert!(matches!(validate_taxonomy(&duplicate), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn cli_arguments() {
        let matches = command()
            .try_get_matches_from(["article-indexer-cli", "--posts", "posts.json", "-o", "public/wasm", "-vv"])
            .unwrap();
        let config = IndexerConfig::from_matches(&matches);
        assert_eq!(config.posts, PathBuf::from("posts.json"));
        assert_eq!(config.filter_index_path(), PathBuf::from("public/wasm").join("filter_index.bin"));
        assert_eq!(config.taxonomy, None);
        assert_eq!(config.verbosity, 2);
    }

    #[test]
    fn output_is_required() {
        assert!(command().try_get_matches_from(["article-indexer-cli", "--posts", "a.json"]).is_err());
    }
}
