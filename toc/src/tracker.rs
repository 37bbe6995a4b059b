use utils_common::Debouncer;

use crate::outline::OutlineEntry;

/// 页面加载后等待多久再扫描标题，留给正文渲染
pub const SCAN_DELAY_MS: i32 = 500;
/// 标题顶部进入视口上方这个距离内即视为当前阅读位置
pub const ACTIVE_THRESHOLD_PX: f64 = 150.0;
/// 当前标题变化后，延迟多久把目录面板滚到对应条目
pub const PANEL_SCROLL_DEBOUNCE_MS: f64 = 300.0;
/// 目录条目在面板内需要保留的上下边距
pub const PANEL_PADDING_PX: f64 = 20.0;
/// 点击跳转时为固定顶栏预留的高度
pub const HEADER_CLEARANCE_PX: f64 = 100.0;

/// 选出当前阅读的标题
///
/// `tops` 为已在页面上找到的标题及其相对视口的顶部位置，按文档顺序排列。
/// 从下往上找第一个 top <= 阈值的标题；都在阈值以下时取目录第一项。
pub fn pick_active<'a>(outline: &'a [OutlineEntry], tops: &[(&'a str, f64)]) -> Option<&'a str> {
    if tops.is_empty() {
        return None;
    }
    tops.iter()
        .rev()
        .find(|(_, top)| *top <= ACTIVE_THRESHOLD_PX)
        .map(|(id, _)| *id)
        .or_else(|| outline.first().map(|e| e.id.as_str()))
}

/// 条目在面板中的位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryBox {
    /// 相对面板内容顶部的偏移
    pub top: f64,
    pub height: f64,
}

/// 面板当前的可视区域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelBox {
    pub scroll_top: f64,
    pub height: f64,
}

/// 条目未完整可见（含边距）时，返回让它居中的滚动位置
pub fn panel_scroll_target(entry: EntryBox, panel: PanelBox) -> Option<f64> {
    let visible_top = panel.scroll_top + PANEL_PADDING_PX;
    let visible_bottom = panel.scroll_top + panel.height - PANEL_PADDING_PX;
    if entry.top >= visible_top && entry.top + entry.height <= visible_bottom {
        return None;
    }
    let centered = entry.top - (panel.height - entry.height) / 2.0;
    Some(centered.max(0.0))
}

/// 点击目录条目后窗口应滚动到的位置
pub fn click_scroll_target(offset_top: f64) -> f64 {
    (offset_top - HEADER_CLEARANCE_PX).max(0.0)
}

/// 当前标题及面板自动滚动的防抖
#[derive(Debug, Clone)]
pub struct ActiveHeading {
    current: Option<String>,
    panel_scroll: Debouncer,
}

impl Default for ActiveHeading {
    fn default() -> Self {
        Self {
            current: None,
            panel_scroll: Debouncer::new(PANEL_SCROLL_DEBOUNCE_MS),
        }
    }
}

impl ActiveHeading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// 记录新的当前标题，变化时返回 true
    pub fn update(&mut self, id: Option<&str>) -> bool {
        if self.current.as_deref() == id {
            return false;
        }
        self.current = id.map(str::to_string);
        true
    }

    pub fn panel_scroll(&mut self) -> &mut Debouncer {
        &mut self.panel_scroll
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.panel_scroll.cancel();
    }

    /// 重新扫描后调用：当前标题已不在新目录里时清空，返回是否清空
    pub fn retain(&mut self, outline: &[OutlineEntry]) -> bool {
        let Some(current) = self.current.as_deref() else {
            return false;
        };
        if outline.iter().any(|e| e.id == current) {
            return false;
        }
        self.reset();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline(ids: &[&str]) -> Vec<OutlineEntry> {
        ids.iter()
            .map(|id| OutlineEntry {
                id: id.to_string(),
                text: id.to_string(),
                depth: 2,
                assigned: true,
            })
            .collect()
    }

    #[test]
    fn last_heading_above_threshold_wins() {
        let outline = outline(&["a", "b", "c"]);
        let tops = [("a", -500.0), ("b", 120.0), ("c", 900.0)];
        assert_eq!(pick_active(&outline, &tops), Some("b"));
    }

    #[test]
    fn threshold_is_inclusive() {
        let outline = outline(&["a", "b"]);
        assert_eq!(pick_active(&outline, &[("a", 10.0), ("b", 150.0)]), Some("b"));
    }

    #[test]
    fn defaults_to_first_heading_at_top_of_page() {
        let outline = outline(&["a", "b"]);
        assert_eq!(pick_active(&outline, &[("a", 400.0), ("b", 800.0)]), Some("a"));
    }

    #[test]
    fn nothing_active_without_headings() {
        assert_eq!(pick_active(&outline(&["a"]), &[]), None);
    }

    #[test]
    fn visible_entry_needs_no_scroll() {
        let panel = PanelBox { scroll_top: 0.0, height: 400.0 };
        assert_eq!(panel_scroll_target(EntryBox { top: 100.0, height: 24.0 }, panel), None);
    }

    #[test]
    fn hidden_entry_is_centered() {
        let panel = PanelBox { scroll_top: 0.0, height: 400.0 };
        assert_eq!(panel_scroll_target(EntryBox { top: 600.0, height: 20.0 }, panel), Some(410.0));
        // 贴着边距也算不可见
        assert_eq!(panel_scroll_target(EntryBox { top: 10.0, height: 20.0 }, PanelBox { scroll_top: 0.0, height: 400.0 }), Some(0.0));
    }

    #[test]
    fn click_target_leaves_header_room() {
        assert_eq!(click_scroll_target(1_000.0), 900.0);
        assert_eq!(click_scroll_target(40.0), 0.0);
    }

    #[test]
    fn active_heading_reports_changes() {
        let mut active = ActiveHeading::new();
        assert!(active.update(Some("a")));
        assert!(!active.update(Some("a")));
        assert!(active.update(Some("b")));
        assert_eq!(active.current(), Some("b"));
        active.reset();
        assert_eq!(active.current(), None);
    }

    #[test]
    fn rescan_drops_vanished_heading() {
        let mut active = ActiveHeading::new();
        active.update(Some("b"));
        let ticket = active.panel_scroll().trigger(0.0);

        assert!(!active.retain(&outline(&["a", "b"])));
        assert_eq!(active.current(), Some("b"));

        assert!(active.retain(&outline(&["a", "c"])));
        assert_eq!(active.current(), None);
        assert!(!active.panel_scroll().fire(ticket));
        // 清空后下一次计算会重新通知
        assert!(active.update(Some("a")));
    }
}
