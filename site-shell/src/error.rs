use thiserror::Error;
use wasm_bindgen::JsValue;

/// 页面外壳的错误，全部只会导致界面降级
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShellError {
    #[error("本地存储不可用: {0}")]
    Storage(String),

    #[error("找不到页面元素: {0}")]
    MissingTarget(String),

    #[error("浏览器调用失败: {0}")]
    Js(String),
}

impl From<JsValue> for ShellError {
    fn from(value: JsValue) -> Self {
        ShellError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<ShellError> for JsValue {
    fn from(err: ShellError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
