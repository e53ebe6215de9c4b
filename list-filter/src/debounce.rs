//! 搜索输入的尾随防抖。时间以毫秒传入 (即 `performance.now()` 的返回值)，
//! 本身不持有定时器，由调用方定期 `poll`。

/// 默认防抖延迟 (毫秒)
pub const DEFAULT_DELAY_MS: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
struct Pending {
    text: String,
    pushed_at: f64,
}

/// 搜索关键词防抖器 - 最后一次输入生效
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDebouncer {
    delay_ms: f64,
    pending: Option<Pending>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY_MS)
    }
}

impl SearchDebouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 记录一次输入并重新开始计时，覆盖尚未生效的旧输入
    pub fn push(&mut self, text: impl Into<String>, now_ms: f64) {
        self.pending = Some(Pending {
            text: text.into(),
            pushed_at: now_ms,
        });
    }

    /// 延迟已到则取出待生效的关键词
    pub fn poll(&mut self, now_ms: f64) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|p| now_ms - p.pushed_at >= self.delay_ms);
        if due {
            self.pending.take().map(|p| p.text)
        } else {
            None
        }
    }

    /// 立即取出待生效的关键词 (回车或失去焦点)
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.text)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
