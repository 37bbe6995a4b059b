use std::fs;
use std::path::Path;

use article_filter::FilterIndex;
use article_indexer::{generate_index, IndexerConfig, IndexerError};
use search_wasm::{search, SearchIndex};
use utils_common::PostError;

const EXPORT: &str = r#"{"data": {"allMarkdownRemark": {"nodes": [
    {
        "fields": {"slug": "/java-basics/"},
        "frontmatter": {"title": "Java Basics", "date": "2024년 1월 5일", "category": "개발", "tags": ["Java", "Spring"]},
        "excerpt": "자바 기초",
        "wordCount": {"words": 450},
        "publishedAt": "2024-01-05T09:00:00Z",
        "html": "<h2>Intro</h2><h3>Sub Part</h3><h2>Intro</h2>"
    },
    {
        "fields": {"slug": "/js-tips/"},
        "frontmatter": {"title": "JavaScript Tips", "date": "2024년 3월 1일", "category": "개발", "tags": ["JavaScript"]},
        "publishedAt": "2024-03-01T09:00:00Z"
    },
    {
        "fields": {"slug": "/weekend/"},
        "frontmatter": {"title": "주말 일기", "date": "2024년 2월 10일", "category": "일상", "tags": ["일기"]},
        "publishedAt": "2024-02-10T09:00:00Z"
    }
]}}}"#;

fn config(posts: &Path, output: &Path) -> IndexerConfig {
    IndexerConfig {
        posts: posts.to_path_buf(),
        output: output.to_path_buf(),
        taxonomy: None,
        verbosity: 0,
    }
}

#[test]
fn writes_both_indices() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts.json");
    fs::write(&posts, EXPORT).unwrap();
    let output = dir.path().join("public").join("wasm");

    let summary = generate_index(&config(&posts, &output)).unwrap();
    assert_eq!(summary.posts, 3);
    assert_eq!(summary.headings, 3);

    let filter = FilterIndex::from_compressed(&fs::read(output.join("filter_index.bin")).unwrap()).unwrap();
    let slugs: Vec<_> = filter.posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["/js-tips/", "/weekend/", "/java-basics/"]);

    let java = &filter.posts[2];
    assert_eq!(java.reading_minutes(), 3);
    let ids: Vec<_> = java.headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["intro", "sub-part", "intro-1"]);

    let search_index = SearchIndex::from_compressed(&fs::read(output.join("search_index.bin")).unwrap()).unwrap();
    let found: Vec<_> = search(&search_index.documents, "java").iter().map(|d| d.slug.as_str()).collect();
    assert_eq!(found, vec!["/js-tips/", "/java-basics/"]);
}

#[test]
fn directory_source_and_custom_taxonomy() {
    let dir = tempfile::tempdir().unwrap();
    let posts_dir = dir.path().join("content");
    fs::create_dir_all(posts_dir.join("2024")).unwrap();
    fs::write(
        posts_dir.join("2024").join("a.json"),
        r#"[{"fields": {"slug": "/a/"}, "frontmatter": {"title": "A", "category": "독서"}}]"#,
    )
    .unwrap();
    fs::write(posts_dir.join("b.json"), r#"{"fields": {"slug": "/b/"}, "frontmatter": {"title": "B"}}"#).unwrap();
    fs::write(posts_dir.join("notes.txt"), "not an export").unwrap();

    let taxonomy = dir.path().join("taxonomy.toml");
    fs::write(
        &taxonomy,
        "categories = [\"독서\"]\n\n[[tag_groups]]\nname = \"책\"\ntags = [\"소설\"]\n",
    )
    .unwrap();

    let output = dir.path().join("out");
    let mut cfg = config(&posts_dir, &output);
    cfg.taxonomy = Some(taxonomy);
    let summary = generate_index(&cfg).unwrap();
    assert_eq!(summary.posts, 2);

    let filter = FilterIndex::from_compressed(&fs::read(summary.filter_index).unwrap()).unwrap();
    assert_eq!(filter.taxonomy.category_choices(), vec!["전체", "독서"]);
}

#[test]
fn outline_ids_avoid_every_document_id() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts.json");
    fs::write(
        &posts,
        r#"[{"fields": {"slug": "/ids/"}, "frontmatter": {"title": "Ids"},
            "html": "<h1 id=\"top\">T</h1><p id=\"intro\">note</p><h2>Intro</h2><h2 id=\"top\">Other</h2>"}]"#,
    )
    .unwrap();
    let output = dir.path().join("out");

    generate_index(&config(&posts, &output)).unwrap();
    let filter = FilterIndex::from_compressed(&fs::read(output.join("filter_index.bin")).unwrap()).unwrap();
    let ids: Vec<_> = filter.posts[0].headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["intro-1", "other"]);
}

#[test]
fn duplicate_slugs_fail_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts.json");
    fs::write(&posts, r#"[{"fields": {"slug": "/a/"}}, {"fields": {"slug": "/a/"}}]"#).unwrap();

    let err = generate_index(&config(&posts, &dir.path().join("out"))).unwrap_err();
    assert!(matches!(err, IndexerError::Post(PostError::DuplicateSlug(ref slug)) if slug == "/a/"));
}

#[test]
fn missing_source_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = generate_index(&config(&dir.path().join("nope.json"), &dir.path().join("out"))).unwrap_err();
    assert!(matches!(err, IndexerError::MissingSource(_)));
}

#[test]
fn broken_json_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let posts = dir.path().join("posts.json");
    fs::write(&posts, "{ not json").unwrap();

    let err = generate_index(&config(&posts, &dir.path().join("out"))).unwrap_err();
    match err {
        IndexerError::Parse { path, .. } => assert_eq!(path, posts),
        other => panic!("unexpected error: {other}"),
    }
}
