use serde::Serialize;
use utils_common::{Debouncer, Ticket};

use crate::models::{SearchResult, SearchResultItem, BLUR_CLOSE_DELAY_MS, NO_RESULTS_MESSAGE};

/// 结果面板状态
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "state", content = "count", rename_all = "snake_case")]
pub enum PanelState {
    Closed,
    /// 有结果，附带条数
    Results(usize),
    /// 面板打开但没有结果
    NoResults,
}

/// 搜索框 - 查询词、焦点与结果面板的开合
#[derive(Debug, Clone)]
pub struct SearchBox {
    query: String,
    focused: bool,
    open: bool,
    blur_close: Debouncer,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self {
            query: String::new(),
            focused: false,
            open: false,
            blur_close: Debouncer::new(BLUR_CLOSE_DELAY_MS),
        }
    }
}

impl SearchBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// 输入变化：非空时打开，清空时关闭
    pub fn on_input(&mut self, query: &str) {
        self.query = query.to_string();
        self.open = !self.query.is_empty();
    }

    /// 获得焦点：有查询词时重新打开，并取消挂起的关闭
    pub fn on_focus(&mut self) {
        self.focused = true;
        self.blur_close.cancel();
        self.open = !self.query.is_empty();
    }

    /// 失去焦点：延迟关闭，让结果上的点击先生效
    pub fn on_blur(&mut self, now: f64) -> Ticket {
        self.focused = false;
        self.blur_close.trigger(now)
    }

    /// 延迟到期的回调
    pub fn on_blur_elapsed(&mut self, ticket: Ticket) {
        if self.blur_close.fire(ticket) {
            self.open = false;
        }
    }

    pub fn panel(&self, result_count: usize) -> PanelState {
        match (self.open, result_count) {
            (false, _) => PanelState::Closed,
            (true, 0) => PanelState::NoResults,
            (true, n) => PanelState::Results(n),
        }
    }
}

/// 搜索框视图 - 交给JS渲染的全部内容，字段都在顶层
#[derive(Serialize, Debug)]
pub struct SearchView {
    pub panel: PanelState,
    pub items: Vec<SearchResultItem>,
    pub query: String,
    pub time_ms: f64,
    /// 面板打开但没有结果时显示的提示
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl SearchView {
    pub fn new(panel: PanelState, result: SearchResult) -> Self {
        Self {
            message: (panel == PanelState::NoResults).then_some(NO_RESULTS_MESSAGE),
            panel,
            items: result.items,
            query: result.query,
            time_ms: result.time_ms,
        }
    }
}
