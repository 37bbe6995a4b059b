use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Element, Storage, Window};

pub mod analytics;
pub mod clipboard;
pub mod comments;
pub mod error;
pub mod theme;

pub use analytics::DataLayerEvent;
pub use clipboard::{CopyButton, CopyState, COPIED_DURATION_MS};
pub use comments::CommentsConfig;
pub use error::ShellError;
pub use theme::{MemoryStore, Theme, ThemeController, ThemeStore, THEME_KEY};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn window() -> Result<Window, ShellError> {
    web_sys::window().ok_or_else(|| ShellError::MissingTarget("window".to_string()))
}

fn to_js_error(e: ShellError) -> JsValue {
    console::log_1(&JsValue::from_str(&format!("页面组件出错: {}", e)));
    JsValue::from(e)
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

/// 浏览器 localStorage；隐私模式等取不到时退化为不保存
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new(window: &Window) -> Self {
        Self {
            storage: window.local_storage().ok().flatten(),
        }
    }
}

impl ThemeStore for LocalStorageStore {
    fn load(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), ShellError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| ShellError::Storage("localStorage 不可用".to_string()))?;
        storage
            .set_item(key, value)
            .map_err(|e| ShellError::Storage(format!("{:?}", e)))
    }
}

fn set_root_theme(window: &Window, value: &str) -> Result<(), ShellError> {
    let root = window
        .document()
        .and_then(|d| d.document_element())
        .ok_or_else(|| ShellError::MissingTarget("documentElement".to_string()))?;
    root.set_attribute("data-theme", value)?;
    Ok(())
}

/// 深色模式开关
#[wasm_bindgen]
pub struct ThemeToggleJS {
    window: Window,
    controller: ThemeController<LocalStorageStore>,
}

#[wasm_bindgen]
impl ThemeToggleJS {
    /// 挂载时读取保存的偏好和系统设置
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<ThemeToggleJS, JsValue> {
        let window = window().map_err(to_js_error)?;
        let prefers_dark = window
            .match_media("(prefers-color-scheme: dark)")
            .ok()
            .flatten()
            .is_some_and(|query| query.matches());

        let controller = ThemeController::initialize(LocalStorageStore::new(&window), prefers_dark);
        if let Some(value) = controller.initial_attribute() {
            set_root_theme(&window, value).map_err(to_js_error)?;
        }
        Ok(Self { window, controller })
    }

    #[wasm_bindgen(js_name = isDark)]
    pub fn is_dark(&self) -> bool {
        self.controller.theme().is_dark()
    }

    /// 切换主题，返回切换后是否为深色
    pub fn toggle(&mut self) -> Result<bool, JsValue> {
        let value = self.controller.toggle();
        set_root_theme(&self.window, value).map_err(to_js_error)?;
        Ok(self.is_dark())
    }
}

struct CopyShared {
    button: CopyButton,
    revert_ticket: Option<utils_common::Ticket>,
    revert_timer: Option<i32>,
    on_change: Option<js_sys::Function>,
}

fn notify_label(shared: &Rc<RefCell<CopyShared>>) {
    let (label, callback) = {
        let s = shared.borrow();
        (s.button.label(), s.on_change.clone())
    };
    if let Some(callback) = callback {
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(label)) {
            console::log_2(&JsValue::from_str("复制按钮回调出错"), &err);
        }
    }
}

/// 代码块复制按钮，`on_change` 收到新的按钮文字
#[wasm_bindgen]
pub struct CopyButtonJS {
    window: Window,
    shared: Rc<RefCell<CopyShared>>,
    on_written: Closure<dyn FnMut(JsValue)>,
    on_rejected: Closure<dyn FnMut(JsValue)>,
    _on_revert: Rc<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl CopyButtonJS {
    #[wasm_bindgen(constructor)]
    pub fn new(on_change: Option<js_sys::Function>) -> Result<CopyButtonJS, JsValue> {
        let window = window().map_err(to_js_error)?;
        let shared = Rc::new(RefCell::new(CopyShared {
            button: CopyButton::new(),
            revert_ticket: None,
            revert_timer: None,
            on_change,
        }));

        let on_revert = {
            let shared = shared.clone();
            Rc::new(Closure::<dyn FnMut()>::new(move || {
                {
                    let mut s = shared.borrow_mut();
                    s.revert_timer = None;
                    if let Some(ticket) = s.revert_ticket.take() {
                        s.button.on_revert(ticket);
                    }
                }
                notify_label(&shared);
            }))
        };

        let on_written = {
            let shared = shared.clone();
            let on_revert = on_revert.clone();
            let window = window.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |_| {
                {
                    let mut s = shared.borrow_mut();
                    let ticket = s.button.on_written(now_ms(&window));
                    s.revert_ticket = Some(ticket);
                    if let Some(handle) = s.revert_timer.take() {
                        window.clear_timeout_with_handle(handle);
                    }
                    let callback: &Closure<dyn FnMut()> = &on_revert;
                    s.revert_timer = window
                        .set_timeout_with_callback_and_timeout_and_arguments_0(
                            callback.as_ref().unchecked_ref(),
                            COPIED_DURATION_MS as i32,
                        )
                        .ok();
                }
                notify_label(&shared);
            })
        };

        let on_rejected = {
            let shared = shared.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |err: JsValue| {
                console::log_2(&JsValue::from_str("写入剪贴板失败"), &err);
                shared.borrow_mut().button.on_rejected();
                notify_label(&shared);
            })
        };

        Ok(Self {
            window,
            shared,
            on_written,
            on_rejected,
            _on_revert: on_revert,
        })
    }

    pub fn label(&self) -> String {
        self.shared.borrow().button.label().to_string()
    }

    /// 把文本写入剪贴板
    pub fn copy(&self, text: &str) {
        self.shared.borrow_mut().button.on_click();
        let promise = self.window.navigator().clipboard().write_text(text);
        let _ = promise.then2(&self.on_written, &self.on_rejected);
    }

    pub fn destroy(&mut self) {
        let mut s = self.shared.borrow_mut();
        if let Some(handle) = s.revert_timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        s.revert_ticket = None;
        s.on_change = None;
    }
}

impl Drop for CopyButtonJS {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// 文章底部的评论组件
#[wasm_bindgen]
pub struct CommentsJS {
    anchor: Option<Element>,
}

#[wasm_bindgen]
impl CommentsJS {
    /// `config` 省略时使用博客默认的 giscus 配置
    #[wasm_bindgen(constructor)]
    pub fn new(anchor_id: Option<String>, config: JsValue) -> Result<CommentsJS, JsValue> {
        let config: CommentsConfig = if config.is_undefined() || config.is_null() {
            CommentsConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| to_js_error(ShellError::Js(format!("评论配置无效: {}", e))))?
        };
        let anchor_id = anchor_id.unwrap_or_else(|| comments::COMMENTS_ANCHOR_ID.to_string());

        let window = window().map_err(to_js_error)?;
        let Some(document) = window.document() else {
            return Ok(Self { anchor: None });
        };
        // 找不到锚点时什么都不渲染
        let anchor = match comments::mount(&document, &anchor_id, &config) {
            Ok(anchor) => Some(anchor),
            Err(ShellError::MissingTarget(_)) => None,
            Err(e) => return Err(to_js_error(e)),
        };
        Ok(Self { anchor })
    }

    pub fn destroy(&mut self) {
        if let Some(anchor) = self.anchor.take() {
            comments::unmount(&anchor);
        }
    }
}

impl Drop for CommentsJS {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// 页面加载时推入标签管理器的启动事件
#[wasm_bindgen(js_name = startAnalytics)]
pub fn start_analytics() -> Result<(), JsValue> {
    let window = window().map_err(to_js_error)?;
    let started_at = js_sys::Date::now();
    analytics::push(&window, &DataLayerEvent::start(started_at)).map_err(to_js_error)
}

/// 路由变化时推入数据层
#[wasm_bindgen(js_name = pushRouteChange)]
pub fn push_route_change(path: &str) -> Result<(), JsValue> {
    let window = window().map_err(to_js_error)?;
    analytics::push(&window, &DataLayerEvent::route_change(path)).map_err(to_js_error)
}
