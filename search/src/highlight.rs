use regex::{Regex, RegexBuilder};

use crate::models::{SearchError, Segment};

/// 构建忽略大小写、按字面匹配的正则
fn literal_pattern(query: &str) -> Result<Regex, SearchError> {
    Ok(RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()?)
}

/// 按查询词切分文本，匹配部分单独成段；空查询时原样返回
pub fn highlight(text: &str, query: &str) -> Result<Vec<Segment>, SearchError> {
    if query.is_empty() || text.is_empty() {
        return Ok(plain(text));
    }

    let pattern = literal_pattern(query)?;
    let mut segments = Vec::new();
    let mut last = 0;

    for m in pattern.find_iter(text) {
        if m.start() > last {
            segments.push(Segment {
                text: text[last..m.start()].to_string(),
                matched: false,
            });
        }
        segments.push(Segment {
            text: m.as_str().to_string(),
            matched: true,
        });
        last = m.end();
    }

    if last < text.len() {
        segments.push(Segment {
            text: text[last..].to_string(),
            matched: false,
        });
    }

    Ok(segments)
}

fn plain(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![Segment {
            text: text.to_string(),
            matched: false,
        }]
    }
}

/// 转义 HTML 特殊字符
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// 把片段渲染成 HTML，匹配部分包在 `<span class="highlight">` 中
pub fn segments_to_html(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        if segment.matched {
            html.push_str("<span class=\"highlight\">");
            html.push_str(&escape_html(&segment.text));
            html.push_str("</span>");
        } else {
            html.push_str(&escape_html(&segment.text));
        }
    }
    html
}
