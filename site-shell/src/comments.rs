use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlScriptElement};

use crate::error::ShellError;

pub const GISCUS_CLIENT: &str = "https://giscus.app/client.js";
pub const COMMENTS_ANCHOR_ID: &str = "comments-anchor";

/// 评论组件（giscus）的嵌入配置
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentsConfig {
    pub repo: String,
    pub repo_id: String,
    pub category: String,
    pub category_id: String,
    /// 页面与讨论串的对应方式
    pub mapping: String,
    pub strict: bool,
    pub reactions_enabled: bool,
    pub emit_metadata: bool,
    pub input_position: String,
    pub theme: String,
    pub lang: String,
    pub lazy: bool,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: "GoToBILL/gotobill.github.io".to_string(),
            repo_id: "R_kgDONIkYJA".to_string(),
            category: "Announcements".to_string(),
            category_id: "DIC_kwDONIkYJM4Cz8qP".to_string(),
            mapping: "pathname".to_string(),
            strict: false,
            reactions_enabled: true,
            emit_metadata: false,
            input_position: "top".to_string(),
            theme: "preferred_color_scheme".to_string(),
            lang: "ko".to_string(),
            lazy: true,
        }
    }
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

impl CommentsConfig {
    /// 脚本标签上的属性，按写入顺序排列
    pub fn script_attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("src", GISCUS_CLIENT.to_string()),
            ("data-repo", self.repo.clone()),
            ("data-repo-id", self.repo_id.clone()),
            ("data-category", self.category.clone()),
            ("data-category-id", self.category_id.clone()),
            ("data-mapping", self.mapping.clone()),
            ("data-strict", flag(self.strict)),
            ("data-reactions-enabled", flag(self.reactions_enabled)),
            ("data-emit-metadata", flag(self.emit_metadata)),
            ("data-input-position", self.input_position.clone()),
            ("data-theme", self.theme.clone()),
            ("data-lang", self.lang.clone()),
        ];
        if self.lazy {
            attrs.push(("data-loading", "lazy".to_string()));
        }
        attrs.push(("crossorigin", "anonymous".to_string()));
        attrs
    }
}

/// 把评论脚本挂到锚点元素上，返回锚点供卸载时清空
pub fn mount(document: &Document, anchor_id: &str, config: &CommentsConfig) -> Result<Element, ShellError> {
    let anchor = document
        .get_element_by_id(anchor_id)
        .ok_or_else(|| ShellError::MissingTarget(anchor_id.to_string()))?;

    let script: HtmlScriptElement = document
        .create_element("script")?
        .dyn_into()
        .map_err(|_| ShellError::Js("script 元素类型不符".to_string()))?;
    for (name, value) in config.script_attributes() {
        script.set_attribute(name, &value)?;
    }
    script.set_async(true);
    anchor.append_child(&script)?;

    tracing::debug!(anchor = anchor_id, "评论组件已挂载");
    Ok(anchor)
}

/// 清空锚点，移除评论组件渲染的全部内容
pub fn unmount(anchor: &Element) {
    anchor.set_inner_html("");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(attrs: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
    }

    #[test]
    fn default_attributes() {
        let attrs = CommentsConfig::default().script_attributes();
        assert_eq!(attrs.first().map(|(n, _)| *n), Some("src"));
        assert_eq!(value(&attrs, "data-mapping"), Some("pathname"));
        assert_eq!(value(&attrs, "data-strict"), Some("0"));
        assert_eq!(value(&attrs, "data-reactions-enabled"), Some("1"));
        assert_eq!(value(&attrs, "data-lang"), Some("ko"));
        assert_eq!(value(&attrs, "data-loading"), Some("lazy"));
        assert_eq!(attrs.last().map(|(n, _)| *n), Some("crossorigin"));
    }

    #[test]
    fn eager_loading_drops_attribute() {
        let config = CommentsConfig {
            lazy: false,
            ..CommentsConfig::default()
        };
        assert_eq!(value(&config.script_attributes(), "data-loading"), None);
    }
}
