use crate::highlight::highlight;
use crate::models::{SearchDocument, SearchError, SearchResultItem, MAX_RESULTS};

/// 文档是否包含查询（查询已小写化）
fn matches(doc: &SearchDocument, query_lower: &str) -> bool {
    doc.title_lower.contains(query_lower)
        || doc.description_lower.contains(query_lower)
        || doc.tags_lower.contains(query_lower)
}

/// 子串搜索 - 空查询不返回任何结果；按原列表顺序取前 `MAX_RESULTS` 条
pub fn search<'a>(documents: &'a [SearchDocument], query: &str) -> Vec<&'a SearchDocument> {
    if query.is_empty() {
        return Vec::new();
    }
    let query_lower = query.to_lowercase();
    documents
        .iter()
        .filter(|doc| matches(doc, &query_lower))
        .take(MAX_RESULTS)
        .collect()
}

/// 搜索并高亮标题与摘要
pub fn search_highlighted(documents: &[SearchDocument], query: &str) -> Result<Vec<SearchResultItem>, SearchError> {
    search(documents, query)
        .into_iter()
        .map(|doc| {
            Ok(SearchResultItem {
                slug: doc.slug.clone(),
                date: doc.date.clone(),
                title: highlight(&doc.title, query)?,
                description: highlight(&doc.description, query)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use utils_common::Post;

    fn doc(title: &str, description: &str, tags: &[&str]) -> SearchDocument {
        let post = Post {
            slug: format!("/{}/", title.to_lowercase().replace(' ', "-")),
            title: title.to_string(),
            description: description.to_string(),
            date: String::new(),
            category: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            word_count: None,
            published_at: None,
            headings: Vec::new(),
        };
        SearchDocument::from(&post)
    }

    fn titles(found: &[&SearchDocument]) -> Vec<String> {
        found.iter().map(|d| d.title.clone()).collect()
    }

    #[test]
    fn empty_query_is_inactive() {
        let docs = vec![doc("Java Basics", "", &[])];
        assert!(search(&docs, "").is_empty());
    }

    #[test]
    fn case_insensitive_title_match() {
        let docs = vec![
            doc("Java Basics", "", &[]),
            doc("JavaScript Tips", "", &[]),
            doc("Python Guide", "", &[]),
        ];
        assert_eq!(titles(&search(&docs, "java")), vec!["Java Basics", "JavaScript Tips"]);
    }

    #[test]
    fn matches_description_and_joined_tags() {
        let docs = vec![
            doc("첫 글", "Gatsby로 블로그 만들기", &[]),
            doc("두번째 글", "", &["Node.js", "Spring Boot"]),
            doc("세번째 글", "", &["Docker"]),
        ];
        assert_eq!(titles(&search(&docs, "gatsby")), vec!["첫 글"]);
        assert_eq!(titles(&search(&docs, "js spring")), vec!["두번째 글"]);
    }

    #[test]
    fn results_are_capped_in_list_order() {
        let docs: Vec<_> = (0..8).map(|i| doc(&format!("React {i}"), "", &[])).collect();
        let found = search(&docs, "react");
        assert_eq!(found.len(), MAX_RESULTS);
        assert_eq!(titles(&found).first().map(String::as_str), Some("React 0"));
        assert_eq!(titles(&found).last().map(String::as_str), Some("React 4"));
    }

    #[test]
    fn highlighted_results_mark_query() {
        let docs = vec![doc("JavaScript Tips", "java 없이", &[])];
        let items = search_highlighted(&docs, "java").unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].title[0].matched);
        assert_eq!(items[0].title[0].text, "Java");
        assert_eq!(items[0].description[0].text, "java");
    }
}
