//! 构建期从文章HTML里提取目录，与浏览器端扫描得到的结果一致：
//! 标题只取正文容器内的，生成的id避开整个文档里已有的id。

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::outline::{build_outline_reserving, HeadingSource, OutlineEntry, CONTENT_CLASS};

fn attr(handle: &Handle, key: &str) -> Option<String> {
    match handle.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == key)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

fn has_class(handle: &Handle, class: &str) -> bool {
    attr(handle, "class").is_some_and(|value| value.split_whitespace().any(|c| c == class))
}

/// 查找正文容器，找不到时返回 None
fn find_content(handle: &Handle) -> Option<Handle> {
    if matches!(handle.data, NodeData::Element { .. }) && has_class(handle, CONTENT_CLASS) {
        return Some(handle.clone());
    }
    handle.children.borrow().iter().find_map(find_content)
}

/// 拼接节点下的全部文本
fn collect_text(handle: &Handle, text: &mut String) {
    if let NodeData::Text { ref contents } = handle.data {
        text.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, text);
    }
}

fn heading_level(handle: &Handle) -> Option<u8> {
    match handle.data {
        NodeData::Element { ref name, .. } => match &*name.local {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        },
        _ => None,
    }
}

fn collect_headings(handle: &Handle, headings: &mut Vec<HeadingSource>) {
    if let Some(depth) = heading_level(handle) {
        let mut text = String::new();
        collect_text(handle, &mut text);
        headings.push(HeadingSource::new(depth, attr(handle, "id"), text));
        return;
    }
    for child in handle.children.borrow().iter() {
        collect_headings(child, headings);
    }
}

/// 收集文档里所有元素的id
fn collect_ids(handle: &Handle, ids: &mut Vec<String>) {
    if let Some(id) = attr(handle, "id").filter(|id| !id.is_empty()) {
        ids.push(id);
    }
    for child in handle.children.borrow().iter() {
        collect_ids(child, ids);
    }
}

fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

fn content_headings(dom: &RcDom) -> Vec<HeadingSource> {
    let root = find_content(&dom.document).unwrap_or_else(|| dom.document.clone());
    let mut headings = Vec::new();
    collect_headings(&root, &mut headings);
    headings
}

/// 按文档顺序提取全部标题（含 h1/h5/h6，由目录构建过滤）
pub fn headings_from_html(html: &str) -> Vec<HeadingSource> {
    content_headings(&parse(html))
}

/// 从文章HTML生成目录
pub fn outline_from_html(html: &str) -> Vec<OutlineEntry> {
    let dom = parse(html);
    let mut ids = Vec::new();
    collect_ids(&dom.document, &mut ids);
    build_outline_reserving(content_headings(&dom), ids.iter().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_in_document_order() {
        let outline = outline_from_html("<h2>Intro</h2><p>text</p><h3>Sub Part</h3>");
        let got: Vec<_> = outline.iter().map(|e| (e.id.as_str(), e.depth)).collect();
        assert_eq!(got, vec![("intro", 2), ("sub-part", 3)]);
    }

    #[test]
    fn nested_markup_and_existing_ids() {
        let html = r#"<h2 id="start">Getting <code>started</code></h2><h4>  끝으로 </h4>"#;
        let outline = outline_from_html(html);
        assert_eq!(outline[0].id, "start");
        assert_eq!(outline[0].text, "Getting started");
        assert!(!outline[0].assigned);
        assert_eq!(outline[1].id, "끝으로");
        assert_eq!(outline[1].text, "끝으로");
    }

    #[test]
    fn content_container_limits_scan() {
        let html = r#"
            <header><h2>Site</h2></header>
            <section class="post blog-post-content"><h2>Body</h2></section>
            <footer><h3>Footer</h3></footer>
        "#;
        let outline = outline_from_html(html);
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].id, "body");
    }

    #[test]
    fn generated_ids_avoid_non_heading_ids() {
        let html = r#"<div class="blog-post-content"><p id="intro">note</p><h2>Intro</h2></div>"#;
        let ids: Vec<_> = outline_from_html(html).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["intro-1"]);
    }

    #[test]
    fn generated_ids_avoid_ids_outside_content() {
        let html = r#"<nav id="setup"></nav><section class="blog-post-content"><h2>Setup</h2></section>"#;
        let ids: Vec<_> = outline_from_html(html).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["setup-1"]);
    }

    #[test]
    fn skipped_heading_ids_are_not_reused() {
        let ids: Vec<_> = outline_from_html(r#"<h1 id="top">T</h1><h2 id="top">Other</h2>"#)
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["other"]);
    }

    #[test]
    fn no_headings_gives_empty_outline() {
        assert!(outline_from_html("<p>plain</p>").is_empty());
        assert!(outline_from_html("").is_empty());
    }
}
