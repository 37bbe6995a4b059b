use std::cell::Cell;
use std::rc::Rc;

/// 页面滚动百分比（0 ~ 100）
///
/// 文档高度不超过视口时页面不可滚动，恒为0。
pub fn scroll_progress(scroll_top: f64, document_height: f64, viewport_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if scrollable.is_nan() || scrollable <= 0.0 {
        return 0.0;
    }
    let progress = scroll_top / scrollable * 100.0;
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 100.0)
}

/// 页面级共享的滚动进度
///
/// 由页面上下文持有，克隆出的句柄指向同一个值；
/// 进度条组件重建时从句柄读回上次的值，不会闪回0。
#[derive(Debug, Clone, Default)]
pub struct ScrollProgress(Rc<Cell<f64>>);

impl ScrollProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, progress: f64) {
        self.0.set(progress);
    }

    /// 按滚动位置重新计算并保存
    pub fn update(&self, scroll_top: f64, document_height: f64, viewport_height: f64) -> f64 {
        let progress = scroll_progress(scroll_top, document_height, viewport_height);
        self.set(progress);
        progress
    }

    /// 整页跳转时清零
    pub fn reset(&self) {
        self.set(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn top_and_bottom() {
        assert_eq!(scroll_progress(0.0, 3_000.0, 1_000.0), 0.0);
        assert_eq!(scroll_progress(2_000.0, 3_000.0, 1_000.0), 100.0);
        assert_eq!(scroll_progress(500.0, 3_000.0, 1_000.0), 25.0);
    }

    #[test]
    fn not_scrollable_stays_zero() {
        assert_eq!(scroll_progress(0.0, 800.0, 1_000.0), 0.0);
        assert_eq!(scroll_progress(30.0, 1_000.0, 1_000.0), 0.0);
    }

    #[test]
    fn overscroll_is_clamped() {
        assert_eq!(scroll_progress(2_300.0, 3_000.0, 1_000.0), 100.0);
        assert_eq!(scroll_progress(-40.0, 3_000.0, 1_000.0), 0.0);
    }

    #[test]
    fn handles_share_one_value() {
        let page = ScrollProgress::new();
        let bar = page.clone();
        page.update(500.0, 3_000.0, 1_000.0);
        assert_eq!(bar.get(), 25.0);

        // 组件重建后仍能读回
        drop(bar);
        let rebuilt = page.clone();
        assert_eq!(rebuilt.get(), 25.0);

        page.reset();
        assert_eq!(rebuilt.get(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_progress_in_range(top in -1e4f64..1e5, doc in 0f64..1e5, view in 0f64..1e4) {
            let progress = scroll_progress(top, doc, view);
            prop_assert!((0.0..=100.0).contains(&progress));
        }
    }
}
