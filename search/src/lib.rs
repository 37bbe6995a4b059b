use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Window};
use utils_common::compression::from_compressed;
use utils_common::Ticket;
use serde::Serialize;

pub mod builder;
pub mod highlight;
pub mod matcher;
pub mod models;
pub mod panel;

pub use highlight::{highlight, segments_to_html};
pub use matcher::{search, search_highlighted};
pub use models::{
    SearchDocument, SearchError, SearchIndex, SearchResult, SearchResultItem, Segment, MAX_RESULTS, NO_RESULTS_MESSAGE,
};
pub use panel::{PanelState, SearchBox, SearchView};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

impl SearchIndex {
    /// 从压缩的二进制数据恢复索引
    pub fn from_compressed(data: &[u8]) -> Result<Self, SearchError> {
        Ok(from_compressed(data)?)
    }
}

/// 当前时间（毫秒），取不到 performance 时为0
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn to_js_error(e: SearchError) -> JsValue {
    console::log_1(&JsValue::from_str(&format!("搜索失败: {}", e)));
    JsValue::from_str(&e.to_string())
}

/// 搜索框与它挂起的关闭计时
struct SearchShared {
    documents: Vec<SearchDocument>,
    search_box: SearchBox,
    blur_ticket: Option<Ticket>,
    blur_timer: Option<i32>,
    on_change: Option<js_sys::Function>,
}

impl SearchShared {
    fn view(&self) -> Result<SearchView, SearchError> {
        let start_time = now_ms();
        let query = self.search_box.query().to_string();
        let items = search_highlighted(&self.documents, &query)?;
        let panel = self.search_box.panel(items.len());
        let result = SearchResult {
            items,
            query,
            time_ms: now_ms() - start_time,
        };
        Ok(SearchView::new(panel, result))
    }

    fn render(&self) -> Result<JsValue, JsValue> {
        let view = self.view().map_err(to_js_error)?;
        // 普通对象而不是 Map
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        view.serialize(&serializer)
            .map_err(|e| JsValue::from_str(&format!("序列化搜索结果失败: {}", e)))
    }

    fn clear_blur_timer(&mut self, window: &Window) {
        if let Some(handle) = self.blur_timer.take() {
            window.clear_timeout_with_handle(handle);
        }
        self.blur_ticket = None;
    }
}

/// 面板关闭后把新视图交给 `on_change`
fn notify_view(shared: &Rc<RefCell<SearchShared>>) {
    let (view, callback) = {
        let s = shared.borrow();
        let Some(callback) = s.on_change.clone() else {
            return;
        };
        (s.render(), callback)
    };
    match view {
        Ok(view) => {
            if let Err(err) = callback.call1(&JsValue::NULL, &view) {
                console::log_2(&JsValue::from_str("搜索回调出错"), &err);
            }
        }
        Err(err) => console::log_2(&JsValue::from_str("渲染搜索结果失败"), &err),
    }
}

/// 搜索模块JS接口 - 持有文档与搜索框状态
#[wasm_bindgen]
pub struct SearchJS {
    window: Window,
    shared: Rc<RefCell<SearchShared>>,
    on_blur_elapsed: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl SearchJS {
    /// `on_change` 在失焦延迟结束、面板关闭后以新视图调用
    #[wasm_bindgen(constructor)]
    pub fn new(index_data: &[u8], on_change: Option<js_sys::Function>) -> Result<SearchJS, JsValue> {
        // 捕获Rust panic并转换为JS错误
        console_error_panic_hook::set_once();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("没有可用的 window"))?;
        let index = SearchIndex::from_compressed(index_data).map_err(to_js_error)?;
        let shared = Rc::new(RefCell::new(SearchShared {
            documents: index.documents,
            search_box: SearchBox::new(),
            blur_ticket: None,
            blur_timer: None,
            on_change,
        }));

        let on_blur_elapsed = {
            let shared = shared.clone();
            Closure::<dyn FnMut()>::new(move || {
                {
                    let mut s = shared.borrow_mut();
                    s.blur_timer = None;
                    let Some(ticket) = s.blur_ticket.take() else {
                        return;
                    };
                    s.search_box.on_blur_elapsed(ticket);
                }
                notify_view(&shared);
            })
        };

        Ok(Self {
            window,
            shared,
            on_blur_elapsed,
        })
    }

    /// 每次按键调用，同步重新计算
    pub fn input(&mut self, query: &str) -> Result<JsValue, JsValue> {
        let mut s = self.shared.borrow_mut();
        s.search_box.on_input(query);
        s.render()
    }

    /// 获得焦点，取消挂起的关闭
    pub fn focus(&mut self) -> Result<JsValue, JsValue> {
        let mut s = self.shared.borrow_mut();
        s.clear_blur_timer(&self.window);
        s.search_box.on_focus();
        s.render()
    }

    /// 失焦：200ms 后自行关闭面板并通知 `on_change`
    pub fn blur(&mut self) -> Result<(), JsValue> {
        let mut s = self.shared.borrow_mut();
        s.clear_blur_timer(&self.window);
        let ticket = s.search_box.on_blur(now_ms());
        let handle = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.on_blur_elapsed.as_ref().unchecked_ref(),
            models::BLUR_CLOSE_DELAY_MS as i32,
        )?;
        s.blur_ticket = Some(ticket);
        s.blur_timer = Some(handle);
        Ok(())
    }

    /// 当前视图，不改变状态
    pub fn view(&self) -> Result<JsValue, JsValue> {
        self.shared.borrow().render()
    }

    pub fn destroy(&mut self) {
        self.shared.borrow_mut().clear_blur_timer(&self.window);
    }

    /// 把文本按查询词高亮为 HTML
    #[wasm_bindgen(js_name = highlightHtml)]
    pub fn highlight_html(text: &str, query: &str) -> Result<String, JsValue> {
        let segments = highlight(text, query).map_err(to_js_error)?;
        Ok(segments_to_html(&segments))
    }
}

impl Drop for SearchJS {
    fn drop(&mut self) {
        self.destroy();
    }
}
