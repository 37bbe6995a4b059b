use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use utils_common::{Post, PostCollection, RawPost};

use crate::error::IndexerError;

/// 内容管线导出的文章数据，支持三种形状
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum PostExport {
    /// 页面查询的原样结果 `{ "data": { "allMarkdownRemark": { "nodes": [...] } } }`
    Query { data: QueryData },
    List(Vec<RawPost>),
    Single(Box<RawPost>),
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    pub all_markdown_remark: Nodes,
}

#[derive(Deserialize, Debug)]
pub struct Nodes {
    pub nodes: Vec<RawPost>,
}

impl PostExport {
    pub fn into_posts(self) -> Vec<RawPost> {
        match self {
            PostExport::Query { data } => data.all_markdown_remark.nodes,
            PostExport::List(posts) => posts,
            PostExport::Single(post) => vec![*post],
        }
    }
}

/// 找出要读取的导出文件：单个文件，或目录下所有 `.json`（按路径排序）
pub fn export_files(source: &Path) -> Result<Vec<PathBuf>, IndexerError> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    if !source.is_dir() {
        return Err(IndexerError::MissingSource(source.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "json") {
            files.push(entry.into_path());
        }
    }
    tracing::debug!(source = %source.display(), files = files.len(), "扫描导出文件完成");
    Ok(files)
}

/// 读取一个导出文件
pub fn read_export(path: &Path) -> Result<Vec<RawPost>, IndexerError> {
    let text = fs::read_to_string(path).map_err(|source| IndexerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let export: PostExport = serde_json::from_str(&text).map_err(|source| IndexerError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(export.into_posts())
}

/// 规范化一篇文章，并从正文HTML生成目录
pub fn normalize(raw: RawPost) -> Result<Post, IndexerError> {
    let html = raw.html.clone();
    let mut post = Post::from_raw(raw)?;
    if let Some(html) = html {
        post.headings = toc_wasm::outline_from_html(&html);
    }
    Ok(post)
}

/// 读取全部文章：校验、去重，并按最新在前排序
pub fn load_posts(source: &Path) -> Result<PostCollection, IndexerError> {
    let mut posts = Vec::new();
    for file in export_files(source)? {
        let raws = read_export(&file)?;
        tracing::info!(file = %file.display(), posts = raws.len(), "读取文章导出");
        for raw in raws {
            posts.push(normalize(raw)?);
        }
    }

    let mut collection = PostCollection::new(posts)?;
    collection.sort_newest_first();
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_query_shaped_export() {
        let json = r#"{"data": {"allMarkdownRemark": {"nodes": [
            {"fields": {"slug": "/a/"}, "frontmatter": {"title": "A"}},
            {"fields": {"slug": "/b/"}, "frontmatter": {"title": "B"}}
        ]}}}"#;
        let export: PostExport = serde_json::from_str(json).unwrap();
        assert_eq!(export.into_posts().len(), 2);
    }

    #[test]
    fn accepts_list_and_single_exports() {
        let list: PostExport = serde_json::from_str(r#"[{"fields": {"slug": "/a/"}}]"#).unwrap();
        assert!(matches!(list, PostExport::List(ref posts) if posts.len() == 1));

        let single: PostExport = serde_json::from_str(r#"{"fields": {"slug": "/a/"}}"#).unwrap();
        assert!(matches!(single, PostExport::Single(_)));
    }

    #[test]
    fn outline_comes_from_html() {
        let raw: RawPost = serde_json::from_str(
            r#"{"fields": {"slug": "/a/"}, "html": "<h2>Intro</h2><h3>Sub Part</h3>"}"#,
        )
        .unwrap();
        let post = normalize(raw).unwrap();
        let ids: Vec<_> = post.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "sub-part"]);
    }

    #[test]
    fn missing_slug_is_an_error() {
        let raw: RawPost = serde_json::from_str(r#"{"frontmatter": {"title": "No slug"}}"#).unwrap();
        assert!(matches!(normalize(raw), Err(IndexerError::Post(_))));
    }
}
