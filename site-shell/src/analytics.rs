use js_sys::{Array, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Window;

use crate::error::ShellError;

/// 标签管理器读取的全局数组名
pub const DATA_LAYER: &str = "dataLayer";
pub const ROUTE_CHANGE_EVENT: &str = "gatsby-route-change";

/// 推入数据层的事件
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DataLayerEvent {
    /// 标签管理器启动
    Start {
        #[serde(rename = "gtm.start")]
        started_at: f64,
        event: &'static str,
    },
    RouteChange {
        event: &'static str,
        page_path: String,
    },
}

impl DataLayerEvent {
    pub fn start(started_at: f64) -> Self {
        DataLayerEvent::Start {
            started_at,
            event: "gtm.js",
        }
    }

    pub fn route_change(path: &str) -> Self {
        DataLayerEvent::RouteChange {
            event: ROUTE_CHANGE_EVENT,
            page_path: path.to_string(),
        }
    }
}

/// 取得 `window.dataLayer`，不存在时创建
fn data_layer(window: &Window) -> Result<Array, ShellError> {
    let key = JsValue::from_str(DATA_LAYER);
    let existing = Reflect::get(window, &key)?;
    if let Ok(array) = existing.dyn_into::<Array>() {
        return Ok(array);
    }
    let array = Array::new();
    Reflect::set(window, &key, &array)?;
    Ok(array)
}

/// 推入一个事件，不关心结果
pub fn push(window: &Window, event: &DataLayerEvent) -> Result<(), ShellError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    let value = event
        .serialize(&serializer)
        .map_err(|e| ShellError::Js(e.to_string()))?;
    data_layer(window)?.push(&value);
    Ok(())
}
