use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

pub mod dom;
#[cfg(feature = "html")]
pub mod html;
pub mod outline;
pub mod progress;
pub mod tracker;

#[cfg(feature = "html")]
pub use html::{headings_from_html, outline_from_html};
pub use outline::{
    build_outline, build_outline_reserving, slugify, HeadingSource, OutlineBuilder, OutlineEntry, CONTENT_CLASS,
};
pub use progress::{scroll_progress, ScrollProgress};
pub use tracker::{click_scroll_target, panel_scroll_target, pick_active, ActiveHeading};

use dom::{FrameListener, NavigatorState, SharedNavigator};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("没有可用的 window"))
}

/// 页面上下文 - 持有一次页面浏览内共享的状态
///
/// 由页面创建一次，传给需要它的组件；整页跳转时重建或 `reset`。
#[wasm_bindgen]
#[derive(Default)]
pub struct PageContext {
    progress: ScrollProgress,
}

#[wasm_bindgen]
impl PageContext {
    #[wasm_bindgen(constructor)]
    pub fn new() -> PageContext {
        console_error_panic_hook::set_once();
        Self::default()
    }

    pub fn progress(&self) -> f64 {
        self.progress.get()
    }

    pub fn reset(&self) {
        self.progress.reset();
    }
}

/// 阅读进度条 - 监听滚动并更新页面上下文中的进度
#[wasm_bindgen]
pub struct ScrollProgressJS {
    progress: ScrollProgress,
    listener: Option<FrameListener>,
}

#[wasm_bindgen]
impl ScrollProgressJS {
    /// `on_change` 以 0~100 的进度调用
    #[wasm_bindgen(constructor)]
    pub fn new(context: &PageContext, on_change: Option<js_sys::Function>) -> Result<ScrollProgressJS, JsValue> {
        let window = window()?;
        let progress = context.progress.clone();

        let listener = {
            let progress = progress.clone();
            let win = window.clone();
            FrameListener::attach(&window, move || {
                let scroll_top = win.scroll_y().unwrap_or(0.0);
                let viewport = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
                let document_height = win
                    .document()
                    .and_then(|d| d.document_element())
                    .map(|e| f64::from(e.scroll_height()))
                    .unwrap_or(0.0);
                let value = progress.update(scroll_top, document_height, viewport);
                if let Some(callback) = &on_change {
                    if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(value)) {
                        dom::log_error("进度回调出错", &err);
                    }
                }
            })?
        };
        listener.schedule();

        Ok(Self {
            progress,
            listener: Some(listener),
        })
    }

    /// 上次保存的进度，组件重建时用作初始值
    pub fn current(&self) -> f64 {
        self.progress.get()
    }

    pub fn destroy(&mut self) {
        self.listener = None;
    }
}

/// 目录导航 - 扫描标题、跟踪当前标题、处理点击跳转
#[wasm_bindgen]
pub struct TocNavigatorJS {
    window: web_sys::Window,
    state: SharedNavigator,
    listener: Option<FrameListener>,
    scan_timer: Option<i32>,
    on_scan: Closure<dyn FnMut()>,
    _on_panel_scroll: Rc<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl TocNavigatorJS {
    /// `panel_selector` 指向目录面板；`on_update` 收到 `{ activeId, outline? }`
    #[wasm_bindgen(constructor)]
    pub fn new(panel_selector: String, on_update: Option<js_sys::Function>) -> Result<TocNavigatorJS, JsValue> {
        console_error_panic_hook::set_once();
        let window = window()?;
        let state: SharedNavigator = Rc::new(RefCell::new(NavigatorState::new(
            window.clone(),
            panel_selector,
            on_update,
        )));

        let on_panel_scroll = {
            let state = state.clone();
            Rc::new(Closure::<dyn FnMut()>::new(move || dom::panel_scroll_elapsed(&state)))
        };

        let listener = {
            let state = state.clone();
            let on_panel_scroll = on_panel_scroll.clone();
            FrameListener::attach(&window, move || dom::recompute_active(&state, &on_panel_scroll))?
        };

        // 正文渲染完成没有通知，固定延迟后再扫描
        let on_scan = {
            let state = state.clone();
            let on_panel_scroll = on_panel_scroll.clone();
            Closure::<dyn FnMut()>::new(move || {
                dom::install_outline(&state);
                dom::recompute_active(&state, &on_panel_scroll);
            })
        };
        let scan_timer = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            on_scan.as_ref().unchecked_ref(),
            tracker::SCAN_DELAY_MS,
        )?;

        Ok(Self {
            window,
            state,
            listener: Some(listener),
            scan_timer: Some(scan_timer),
            on_scan,
            _on_panel_scroll: on_panel_scroll,
        })
    }

    pub fn outline(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.state.borrow().outline())
            .map_err(|e| JsValue::from_str(&format!("序列化目录失败: {}", e)))
    }

    #[wasm_bindgen(js_name = activeId)]
    pub fn active_id(&self) -> Option<String> {
        self.state.borrow().active_id().map(str::to_string)
    }

    /// 点击目录条目，阻止默认跳转并平滑滚动
    pub fn navigate(&self, event: Option<web_sys::Event>, id: &str) -> bool {
        if let Some(event) = event {
            event.prevent_default();
        }
        dom::navigate_to(&self.window, id)
    }

    /// 正文内容变化后（如客户端路由切换文章）重新扫描标题，
    /// 同样等待固定延迟；已卸载时不做任何事
    pub fn rescan(&mut self) -> Result<(), JsValue> {
        if self.listener.is_none() {
            return Ok(());
        }
        self.clear_scan_timer();
        let handle = self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            self.on_scan.as_ref().unchecked_ref(),
            tracker::SCAN_DELAY_MS,
        )?;
        self.scan_timer = Some(handle);
        Ok(())
    }

    /// 卸载：移除监听并清除所有挂起的计时
    pub fn destroy(&mut self) {
        self.listener = None;
        self.clear_scan_timer();
        self.state.borrow_mut().teardown();
    }
}

impl TocNavigatorJS {
    fn clear_scan_timer(&mut self) {
        if let Some(handle) = self.scan_timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for TocNavigatorJS {
    fn drop(&mut self) {
        self.destroy();
    }
}
