use std::collections::HashMap;

use crate::error::ShellError;

/// 本地存储里保存主题的键
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// 写入存储和 `data-theme` 属性的值
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// 只认 "dark"/"light"，其余值视为没有保存过
    pub fn parse(value: &str) -> Option<Theme> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// 主题偏好的持久化位置
pub trait ThemeStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), ShellError>;
}

/// 内存存储，用于测试和禁用存储的环境
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }
}

impl ThemeStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), ShellError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 深色模式开关
#[derive(Debug)]
pub struct ThemeController<S: ThemeStore> {
    store: S,
    theme: Theme,
    /// 初始化时是否有保存的偏好
    restored: bool,
}

impl<S: ThemeStore> ThemeController<S> {
    /// 已保存的偏好优先，没有时跟随系统
    pub fn initialize(store: S, prefers_dark: bool) -> Self {
        let saved = store.load(THEME_KEY).as_deref().and_then(Theme::parse);
        let theme = match saved {
            Some(theme) => theme,
            None if prefers_dark => Theme::Dark,
            None => Theme::Light,
        };
        Self {
            store,
            theme,
            restored: saved.is_some(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn restored(&self) -> bool {
        self.restored
    }

    /// 加载时需要写到根元素上的属性值；浅色沿用页面默认，不写
    pub fn initial_attribute(&self) -> Option<&'static str> {
        self.theme.is_dark().then(|| self.theme.as_str())
    }

    /// 切换主题并保存，返回新的 `data-theme` 值
    ///
    /// 保存失败只记录日志，页面照常切换。
    pub fn toggle(&mut self) -> &'static str {
        self.theme = self.theme.toggled();
        if let Err(err) = self.store.save(THEME_KEY, self.theme.as_str()) {
            tracing::warn!(error = %err, "主题偏好保存失败");
        }
        self.theme.as_str()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
