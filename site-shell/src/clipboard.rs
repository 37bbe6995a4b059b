use serde::Serialize;
use utils_common::{Debouncer, Ticket};

pub const COPY_LABEL: &str = "복사";
pub const COPIED_LABEL: &str = "복사됨!";
/// “已复制”提示停留的时间
pub const COPIED_DURATION_MS: f64 = 2000.0;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CopyState {
    Idle,
    /// 写入请求已发出，尚未完成
    Pending,
    Copied,
}

/// 代码块复制按钮
#[derive(Debug, Clone)]
pub struct CopyButton {
    state: CopyState,
    revert: Debouncer,
}

impl Default for CopyButton {
    fn default() -> Self {
        Self {
            state: CopyState::Idle,
            revert: Debouncer::new(COPIED_DURATION_MS),
        }
    }
}

impl CopyButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CopyState {
        self.state
    }

    /// 按钮文字；写入未完成时保持原文字
    pub fn label(&self) -> &'static str {
        match self.state {
            CopyState::Copied => COPIED_LABEL,
            CopyState::Idle | CopyState::Pending => COPY_LABEL,
        }
    }

    pub fn on_click(&mut self) {
        if self.state == CopyState::Idle {
            self.state = CopyState::Pending;
        }
    }

    /// 剪贴板写入成功，开始计时恢复；连续复制会重新计时
    pub fn on_written(&mut self, now: f64) -> Ticket {
        self.state = CopyState::Copied;
        self.revert.trigger(now)
    }

    /// 写入被拒绝，立即恢复原文字
    pub fn on_rejected(&mut self) {
        if self.state == CopyState::Pending {
            self.state = CopyState::Idle;
        }
    }

    /// 恢复计时到期，过期的票据不起作用
    pub fn on_revert(&mut self, ticket: Ticket) {
        if self.revert.fire(ticket) {
            self.state = CopyState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copied_then_reverts() {
        let mut button = CopyButton::new();
        assert_eq!(button.label(), "복사");

        button.on_click();
        assert_eq!(button.label(), "복사");
        let ticket = button.on_written(0.0);
        assert_eq!(button.label(), "복사됨!");

        button.on_revert(ticket);
        assert_eq!(button.state(), CopyState::Idle);
    }

    #[test]
    fn rejection_reverts_immediately() {
        let mut button = CopyButton::new();
        button.on_click();
        button.on_rejected();
        assert_eq!(button.state(), CopyState::Idle);
        assert_eq!(button.label(), COPY_LABEL);
    }

    #[test]
    fn second_copy_restarts_timer() {
        let mut button = CopyButton::new();
        button.on_click();
        let first = button.on_written(0.0);
        button.on_click();
        let second = button.on_written(1_500.0);

        button.on_revert(first);
        assert_eq!(button.state(), CopyState::Copied);
        button.on_revert(second);
        assert_eq!(button.state(), CopyState::Idle);
    }
}
