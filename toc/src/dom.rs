//! 浏览器端胶水：扫描正文标题、被动滚动监听、点击跳转与面板自动滚动。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use utils_common::{FrameGate, Ticket};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, AddEventListenerOptions, Document, Element, ScrollBehavior, ScrollToOptions, Window};

use crate::outline::{build_outline_reserving, HeadingSource, OutlineEntry, CONTENT_CLASS};
use crate::tracker::{
    click_scroll_target, panel_scroll_target, pick_active, ActiveHeading, EntryBox, PanelBox,
    PANEL_SCROLL_DEBOUNCE_MS,
};

pub(crate) fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

pub(crate) fn log_error(context: &str, err: &JsValue) {
    console::log_2(&JsValue::from_str(context), err);
}

fn smooth_to(top: f64) -> ScrollToOptions {
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    options
}

/// 扫描正文里的 h2~h4 并生成目录，没有id的标题会被写回生成的id
pub fn scan_headings(document: &Document) -> Result<Vec<OutlineEntry>, JsValue> {
    let Some(container) = document.query_selector(&format!(".{CONTENT_CLASS}"))? else {
        return Ok(Vec::new());
    };
    let nodes = container.query_selector_all("h2, h3, h4")?;

    let mut elements = Vec::new();
    let mut sources = Vec::new();
    for i in 0..nodes.length() {
        let Some(element) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let depth = match element.tag_name().to_ascii_lowercase().as_str() {
            "h2" => 2,
            "h3" => 3,
            _ => 4,
        };
        sources.push(HeadingSource::new(depth, Some(element.id()), element.text_content().unwrap_or_default()));
        elements.push(element);
    }

    // 生成的id要避开页面上所有已有的id
    let taken = document.query_selector_all("[id]")?;
    let document_ids: Vec<String> = (0..taken.length())
        .filter_map(|i| taken.get(i)?.dyn_into::<Element>().ok())
        .map(|e| e.id())
        .filter(|id| !id.is_empty())
        .collect();

    let outline = build_outline_reserving(sources, document_ids.iter().map(String::as_str));
    for (element, entry) in elements.iter().zip(&outline) {
        if entry.assigned {
            element.set_id(&entry.id);
        }
    }
    Ok(outline)
}

/// 标题元素相对视口的顶部位置，页面上找不到的标题跳过
fn heading_tops<'a>(document: &Document, outline: &'a [OutlineEntry]) -> Vec<(&'a str, f64)> {
    outline
        .iter()
        .filter_map(|entry| {
            let element = document.get_element_by_id(&entry.id)?;
            Some((entry.id.as_str(), element.get_bounding_client_rect().top()))
        })
        .collect()
}

/// 把目录面板里对应的条目滚到可见范围，找不到节点时什么都不做
fn scroll_panel_to(document: &Document, panel_selector: &str, id: &str) -> Option<()> {
    let panel = document.query_selector(panel_selector).ok()??;
    let href = format!("#{id}");
    let links = panel.query_selector_all("a[href]").ok()?;
    let entry = (0..links.length())
        .filter_map(|i| links.get(i)?.dyn_into::<Element>().ok())
        .find(|a| a.get_attribute("href").as_deref() == Some(href.as_str()))?;

    let panel_rect = panel.get_bounding_client_rect();
    let entry_rect = entry.get_bounding_client_rect();
    let scroll_top = f64::from(panel.scroll_top());
    let target = panel_scroll_target(
        EntryBox {
            top: entry_rect.top() - panel_rect.top() + scroll_top,
            height: entry_rect.height(),
        },
        PanelBox {
            scroll_top,
            height: f64::from(panel.client_height()),
        },
    )?;
    panel.scroll_to_with_scroll_to_options(&smooth_to(target));
    Some(())
}

/// 窗口滚动/尺寸变化的被动监听，每帧至多执行一次计算
pub(crate) struct FrameListener {
    window: Window,
    gate: Rc<RefCell<FrameGate>>,
    frame_handle: Rc<Cell<Option<i32>>>,
    on_event: Closure<dyn FnMut()>,
    _on_frame: Rc<Closure<dyn FnMut()>>,
    attached: bool,
}

const FRAME_EVENTS: [&str; 2] = ["scroll", "resize"];

impl FrameListener {
    pub(crate) fn attach(window: &Window, mut compute: impl FnMut() + 'static) -> Result<Self, JsValue> {
        let gate = Rc::new(RefCell::new(FrameGate::new()));
        let frame_handle = Rc::new(Cell::new(None));

        let on_frame = {
            let gate = gate.clone();
            let frame_handle = frame_handle.clone();
            Rc::new(Closure::<dyn FnMut()>::new(move || {
                frame_handle.set(None);
                let run = gate.borrow_mut().begin_frame();
                if run {
                    compute();
                }
            }))
        };

        let on_event = {
            let gate = gate.clone();
            let frame_handle = frame_handle.clone();
            let on_frame = on_frame.clone();
            let window = window.clone();
            Closure::<dyn FnMut()>::new(move || {
                if !gate.borrow_mut().request() {
                    return;
                }
                let callback: &Closure<dyn FnMut()> = &on_frame;
                match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
                    Ok(handle) => frame_handle.set(Some(handle)),
                    Err(err) => {
                        gate.borrow_mut().cancel();
                        log_error("申请动画帧失败", &err);
                    }
                }
            })
        };

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        for event in FRAME_EVENTS {
            window.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                on_event.as_ref().unchecked_ref(),
                &options,
            )?;
        }

        Ok(Self {
            window: window.clone(),
            gate,
            frame_handle,
            on_event,
            _on_frame: on_frame,
            attached: true,
        })
    }

    /// 立即申请一帧，用于挂载后的首次计算
    pub(crate) fn schedule(&self) {
        let callback: &Closure<dyn FnMut()> = &self.on_event;
        if let Ok(function) = callback.as_ref().clone().dyn_into::<js_sys::Function>() {
            if let Err(err) = function.call0(&JsValue::NULL) {
                log_error("首次计算失败", &err);
            }
        }
    }

    pub(crate) fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        for event in FRAME_EVENTS {
            if let Err(err) = self
                .window
                .remove_event_listener_with_callback(event, self.on_event.as_ref().unchecked_ref())
            {
                log_error("移除滚动监听失败", &err);
            }
        }
        if let Some(handle) = self.frame_handle.take() {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                log_error("取消动画帧失败", &err);
            }
        }
        self.gate.borrow_mut().cancel();
    }
}

impl Drop for FrameListener {
    fn drop(&mut self) {
        self.detach();
    }
}

/// 目录状态更新，传给宿主的回调
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct NavigatorUpdate {
    active_id: Option<String>,
    /// 仅在扫描完成的那次更新里携带
    #[serde(skip_serializing_if = "Option::is_none")]
    outline: Option<Vec<OutlineEntry>>,
}

pub(crate) struct NavigatorState {
    window: Window,
    outline: Vec<OutlineEntry>,
    active: ActiveHeading,
    panel_selector: String,
    panel_ticket: Option<Ticket>,
    panel_timer: Option<i32>,
    on_update: Option<js_sys::Function>,
}

pub(crate) type SharedNavigator = Rc<RefCell<NavigatorState>>;

impl NavigatorState {
    pub(crate) fn new(window: Window, panel_selector: String, on_update: Option<js_sys::Function>) -> Self {
        Self {
            window,
            outline: Vec::new(),
            active: ActiveHeading::new(),
            panel_selector,
            panel_ticket: None,
            panel_timer: None,
            on_update,
        }
    }

    pub(crate) fn outline(&self) -> &[OutlineEntry] {
        &self.outline
    }

    pub(crate) fn active_id(&self) -> Option<&str> {
        self.active.current()
    }

    fn clear_panel_timer(&mut self) {
        if let Some(handle) = self.panel_timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    /// 当前标题变化后重新计时面板滚动
    fn schedule_panel_scroll(&mut self, callback: &Closure<dyn FnMut()>) {
        let ticket = self.active.panel_scroll().trigger(now_ms(&self.window));
        self.panel_ticket = Some(ticket);
        self.clear_panel_timer();
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            PANEL_SCROLL_DEBOUNCE_MS as i32,
        ) {
            Ok(handle) => self.panel_timer = Some(handle),
            Err(err) => log_error("面板滚动计时失败", &err),
        }
    }

    pub(crate) fn teardown(&mut self) {
        self.clear_panel_timer();
        self.panel_ticket = None;
        self.active.reset();
    }
}

/// 把更新交给宿主回调，调用前已释放状态借用
fn notify(callback: Option<js_sys::Function>, update: &NavigatorUpdate) {
    let Some(callback) = callback else {
        return;
    };
    match serde_wasm_bindgen::to_value(update) {
        Ok(payload) => {
            if let Err(err) = callback.call1(&JsValue::NULL, &payload) {
                log_error("目录回调出错", &err);
            }
        }
        Err(err) => log_error("序列化目录状态失败", &JsValue::from_str(&err.to_string())),
    }
}

/// 按当前滚动位置重新选出当前标题
pub(crate) fn recompute_active(state: &SharedNavigator, panel_callback: &Closure<dyn FnMut()>) {
    let (update, callback) = {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        let Some(document) = s.window.document() else {
            return;
        };

        let picked = {
            let tops = heading_tops(&document, &s.outline);
            pick_active(&s.outline, &tops).map(str::to_string)
        };
        if !s.active.update(picked.as_deref()) {
            return;
        }
        s.schedule_panel_scroll(panel_callback);

        let update = NavigatorUpdate {
            active_id: picked,
            outline: None,
        };
        (update, s.on_update.clone())
    };
    notify(callback, &update);
}

/// 扫描完成（首次或重新扫描）：保存目录并通知宿主
pub(crate) fn install_outline(state: &SharedNavigator) {
    let (update, callback) = {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;
        let Some(document) = s.window.document() else {
            return;
        };
        s.outline = match scan_headings(&document) {
            Ok(outline) => outline,
            Err(err) => {
                log_error("扫描标题失败", &err);
                Vec::new()
            }
        };
        if s.active.retain(&s.outline) {
            s.clear_panel_timer();
            s.panel_ticket = None;
        }
        let update = NavigatorUpdate {
            active_id: s.active.current().map(str::to_string),
            outline: Some(s.outline.clone()),
        };
        (update, s.on_update.clone())
    };
    notify(callback, &update);
}

/// 面板滚动计时到期
pub(crate) fn panel_scroll_elapsed(state: &SharedNavigator) {
    let mut guard = state.borrow_mut();
    let s = &mut *guard;
    s.panel_timer = None;
    let Some(ticket) = s.panel_ticket.take() else {
        return;
    };
    if !s.active.panel_scroll().fire(ticket) {
        return;
    }
    let (Some(document), Some(id)) = (s.window.document(), s.active.current()) else {
        return;
    };
    scroll_panel_to(&document, &s.panel_selector, id);
}

/// 点击目录条目：平滑滚动到标题，并为顶栏留出空间
pub(crate) fn navigate_to(window: &Window, id: &str) -> bool {
    let Some(element) = window.document().and_then(|d| d.get_element_by_id(id)) else {
        return false;
    };
    let offset = element.get_bounding_client_rect().top() + window.scroll_y().unwrap_or(0.0);
    window.scroll_to_with_scroll_to_options(&smooth_to(click_scroll_target(offset)));
    true
}
