use std::collections::HashSet;

pub use utils_common::OutlineEntry;

/// 参与目录的最浅/最深标题级别（h2 ~ h4）
pub const MIN_DEPTH: u8 = 2;
pub const MAX_DEPTH: u8 = 4;

/// 文章正文容器的class，构建期与浏览器端共用
pub const CONTENT_CLASS: &str = "blog-post-content";

/// 生成的id为空时的兜底
const FALLBACK_SLUG: &str = "heading";

/// 扫描到的标题原始信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingSource {
    pub depth: u8,
    /// 元素上已有的id，空串视为没有
    pub id: Option<String>,
    pub text: String,
}

impl HeadingSource {
    pub fn new(depth: u8, id: Option<String>, text: impl Into<String>) -> Self {
        Self {
            depth,
            id: id.filter(|id| !id.is_empty()),
            text: text.into(),
        }
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// 由标题文本生成锚点：小写化，保留 a-z、0-9 与韩文音节，
/// 其余连续字符折叠为一个连字符，去掉首尾连字符
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut gap = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if is_slug_char(c) {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug
}

/// 逐个分配标题id，保证同一文档内不重复
///
/// 已有id原样保留；生成的id与之前任何id冲突时依次追加 `-1`、`-2`……
#[derive(Debug, Default)]
pub struct OutlineBuilder {
    /// 文档中作者写好的id，生成的id需要避开
    reserved: HashSet<String>,
    used: HashSet<String>,
}

impl OutlineBuilder {
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            reserved: reserved.into_iter().map(str::to_string).collect(),
            used: HashSet::new(),
        }
    }

    /// 处理一个标题，超出 h2~h4 范围的返回 None
    pub fn push(&mut self, source: HeadingSource) -> Option<OutlineEntry> {
        if !(MIN_DEPTH..=MAX_DEPTH).contains(&source.depth) {
            // 不进目录的标题，其id仍然占用
            if let Some(id) = source.id {
                self.used.insert(id);
            }
            return None;
        }
        let text = source.text.trim().to_string();

        // 作者写的id第一次出现时沿用
        if let Some(id) = source.id {
            if self.used.insert(id.clone()) {
                return Some(OutlineEntry {
                    id,
                    text,
                    depth: source.depth,
                    assigned: false,
                });
            }
        }

        let mut base = slugify(&text);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }
        let id = self.unique(base);
        self.used.insert(id.clone());

        Some(OutlineEntry {
            id,
            text,
            depth: source.depth,
            assigned: true,
        })
    }

    fn unique(&self, base: String) -> String {
        let taken = |candidate: &str| self.used.contains(candidate) || self.reserved.contains(candidate);
        if !taken(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// 按文档顺序生成目录，只避开标题自身已有的id
pub fn build_outline<I>(headings: I) -> Vec<OutlineEntry>
where
    I: IntoIterator<Item = HeadingSource>,
{
    build_outline_reserving(headings, std::iter::empty::<&str>())
}

/// 按文档顺序生成目录，生成的id还会避开 `document_ids`（文档里其他元素的id）
pub fn build_outline_reserving<'a, I, R>(headings: I, document_ids: R) -> Vec<OutlineEntry>
where
    I: IntoIterator<Item = HeadingSource>,
    R: IntoIterator<Item = &'a str>,
{
    let sources: Vec<HeadingSource> = headings.into_iter().collect();
    let mut builder = {
        let reserved: Vec<&str> = sources
            .iter()
            .filter_map(|s| s.id.as_deref())
            .chain(document_ids.into_iter().map(|id| -> &str { id }))
            .collect();
        OutlineBuilder::new(reserved)
    };
    sources.into_iter().filter_map(|s| builder.push(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(outline: &[OutlineEntry]) -> Vec<&str> {
        outline.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Intro"), "intro");
        assert_eq!(slugify("Sub Part"), "sub-part");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("React 18 시작하기"), "react-18-시작하기");
        assert_eq!(slugify("C++ & C#"), "c-c");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn outline_skips_other_levels_and_keeps_order() {
        let outline = build_outline(vec![
            HeadingSource::new(1, None, "Title"),
            HeadingSource::new(2, None, "Intro"),
            HeadingSource::new(3, None, "Sub Part"),
            HeadingSource::new(5, None, "Deep"),
            HeadingSource::new(4, None, "Detail"),
        ]);
        assert_eq!(ids(&outline), vec!["intro", "sub-part", "detail"]);
        assert_eq!(outline.iter().map(|e| e.depth).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(outline.iter().all(|e| e.assigned));
    }

    #[test]
    fn existing_ids_are_kept() {
        let outline = build_outline(vec![HeadingSource::new(2, Some("custom".into()), "Intro")]);
        assert_eq!(ids(&outline), vec!["custom"]);
        assert!(!outline[0].assigned);
    }

    #[test]
    fn duplicate_texts_get_suffixes() {
        let outline = build_outline(vec![
            HeadingSource::new(2, None, "Setup"),
            HeadingSource::new(3, None, "Setup"),
            HeadingSource::new(3, None, "Setup"),
        ]);
        assert_eq!(ids(&outline), vec!["setup", "setup-1", "setup-2"]);
    }

    #[test]
    fn generated_ids_avoid_later_authored_ids() {
        let outline = build_outline(vec![
            HeadingSource::new(2, None, "Setup"),
            HeadingSource::new(2, Some("setup".into()), "Other"),
        ]);
        assert_eq!(ids(&outline), vec!["setup-1", "setup"]);
    }

    #[test]
    fn skipped_levels_keep_their_ids() {
        let outline = build_outline(vec![
            HeadingSource::new(1, Some("top".into()), "T"),
            HeadingSource::new(2, Some("top".into()), "Other"),
            HeadingSource::new(5, Some("deep".into()), "Deep"),
            HeadingSource::new(3, None, "Deep"),
        ]);
        assert_eq!(ids(&outline), vec!["other", "deep-1"]);
        assert!(outline.iter().all(|e| e.assigned));
    }

    #[test]
    fn generated_ids_avoid_other_elements() {
        let outline = build_outline_reserving(vec![HeadingSource::new(2, None, "Intro")], ["intro", "intro-1"]);
        assert_eq!(ids(&outline), vec!["intro-2"]);
    }

    #[test]
    fn empty_text_falls_back() {
        let outline = build_outline(vec![
            HeadingSource::new(2, None, "???"),
            HeadingSource::new(2, Some(String::new()), ""),
        ]);
        assert_eq!(ids(&outline), vec!["heading", "heading-1"]);
    }

    proptest! {
        #[test]
        fn prop_ids_unique(texts in prop::collection::vec(("[a-cA-C !]{0,4}", 2u8..=4, any::<bool>()), 0..20)) {
            let sources = texts
                .iter()
                .map(|(text, depth, keep)| {
                    let id = keep.then(|| slugify(text));
                    HeadingSource::new(*depth, id, text.clone())
                });
            let outline = build_outline(sources);
            let unique: HashSet<_> = outline.iter().map(|e| e.id.as_str()).collect();
            prop_assert_eq!(unique.len(), outline.len());
            prop_assert_eq!(outline.len(), texts.len());
            prop_assert!(outline.iter().all(|e| !e.id.is_empty()));
        }
    }
}
