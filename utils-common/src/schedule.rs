//! 合并调度 - 与具体事件循环无关的两个小状态机。
//!
//! `FrameGate` 把任意频率的事件压缩为每帧至多一次计算；
//! `Debouncer` 在每次触发时取消并重启计时，只有一串触发中的最后一次会执行。
//! 时间统一用毫秒（浏览器里即 `performance.now()`）。

/// 每帧闸门
#[derive(Debug, Default, Clone)]
pub struct FrameGate {
    pending: bool,
}

impl FrameGate {
    pub const fn new() -> Self {
        Self { pending: false }
    }

    /// 有事件到来。返回 true 表示调用方需要申请下一帧，false 表示本帧已经申请过
    pub fn request(&mut self) -> bool {
        if self.pending {
            false
        } else {
            self.pending = true;
            true
        }
    }

    /// 在帧回调里调用，返回本帧是否需要计算
    pub fn begin_frame(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// 卸载时丢弃挂起的帧
    pub fn cancel(&mut self) {
        self.pending = false;
    }
}

/// 防抖票据 - 标识一次触发
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// 防抖器
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: f64,
    deadline: Option<f64>,
    generation: u64,
}

impl Debouncer {
    pub const fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline: None,
            generation: 0,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// 触发：取消挂起的调用并重新计时
    pub fn trigger(&mut self, now: f64) -> Ticket {
        self.generation += 1;
        self.deadline = Some(now + self.delay_ms);
        Ticket(self.generation)
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// 按时间轮询：到期则消费并返回 true
    pub fn poll(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// 计时器回调：只有最新票据且尚未取消时才执行
    pub fn fire(&mut self, ticket: Ticket) -> bool {
        if ticket.0 == self.generation && self.deadline.is_some() {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_gate_coalesces_a_burst() {
        let mut gate = FrameGate::new();
        assert!(gate.request());
        for _ in 0..50 {
            assert!(!gate.request());
        }
        assert!(gate.begin_frame());
        assert!(!gate.begin_frame());
        assert!(gate.request());
    }

    #[test]
    fn only_last_trigger_in_burst_runs() {
        let mut debouncer = Debouncer::new(300.0);
        debouncer.trigger(0.0);
        debouncer.trigger(100.0);
        debouncer.trigger(250.0);

        assert!(!debouncer.poll(400.0));
        assert!(debouncer.poll(550.0));
        assert!(!debouncer.poll(1000.0));
    }

    #[test]
    fn stale_tickets_do_not_fire() {
        let mut debouncer = Debouncer::new(200.0);
        let first = debouncer.trigger(0.0);
        let second = debouncer.trigger(10.0);

        assert!(!debouncer.fire(first));
        assert!(debouncer.fire(second));
        assert!(!debouncer.fire(second));
    }

    #[test]
    fn cancel_drops_pending_call() {
        let mut debouncer = Debouncer::new(200.0);
        let ticket = debouncer.trigger(0.0);
        debouncer.cancel();
        assert!(!debouncer.fire(ticket));
        assert!(!debouncer.poll(500.0));
    }
}
