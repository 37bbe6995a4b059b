use wasm_bindgen::prelude::*;
use web_sys::console;
use utils_common::compression as utils;
use utils_common::{PostCollection, Taxonomy};

// 导出模块
pub mod builder;
pub mod filter;
pub mod models;

pub use filter::{FilterState, ListingView, PageChange};
pub use models::{FilterError, FilterIndex, FilterParams, FilterResult, PostCard, PAGE_SIZE};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl FilterIndex {
    /// 从压缩的二进制数据恢复索引
    pub fn from_compressed(data: &[u8]) -> Result<Self, FilterError> {
        Ok(utils::from_compressed(data)?)
    }
}

fn to_js_error(e: FilterError) -> JsValue {
    console::log_1(&JsValue::from_str(&format!("文章筛选失败: {}", e)));
    JsValue::from_str(&e.to_string())
}

fn to_js_value<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

/// 翻页后把视口滚动到顶部
fn scroll_window_to_top() {
    if let Some(window) = web_sys::window() {
        window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}

/// 文章列表筛选器 - 提供给JavaScript使用，持有列表视图的筛选状态
#[wasm_bindgen]
pub struct ArticleFilterJS {
    posts: PostCollection,
    taxonomy: Taxonomy,
    state: FilterState,
}

#[wasm_bindgen]
impl ArticleFilterJS {
    /// 从筛选索引创建过滤器
    #[wasm_bindgen(constructor)]
    pub fn new(index_data: &[u8]) -> Result<ArticleFilterJS, JsValue> {
        console_error_panic_hook::set_once();

        let index = FilterIndex::from_compressed(index_data).map_err(to_js_error)?;
        let posts = PostCollection::new(index.posts)
            .map_err(|e| to_js_error(FilterError::from(e)))?;
        Ok(Self {
            posts,
            taxonomy: index.taxonomy,
            state: FilterState::new(),
        })
    }

    /// 所有分类（"전체" 在最前）
    pub fn categories(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.taxonomy.category_choices())
    }

    /// 当前视图
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.state.to_result(self.posts.posts(), &self.taxonomy))
    }

    #[wasm_bindgen(js_name = selectCategory)]
    pub fn select_category(&mut self, category: &str) -> Result<JsValue, JsValue> {
        self.state
            .select_category(&self.taxonomy, category)
            .map_err(to_js_error)?;
        self.view()
    }

    #[wasm_bindgen(js_name = toggleTagGroup)]
    pub fn toggle_tag_group(&mut self, group: &str) -> Result<JsValue, JsValue> {
        self.state.toggle_tag_group(group);
        self.view()
    }

    #[wasm_bindgen(js_name = clearTagGroups)]
    pub fn clear_tag_groups(&mut self) -> Result<JsValue, JsValue> {
        self.state.clear_tag_groups();
        self.view()
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> Result<JsValue, JsValue> {
        let total = self.state.apply(self.posts.posts(), &self.taxonomy).total_pages();
        if let PageChange::Moved(_) = self.state.next_page(total) {
            scroll_window_to_top();
        }
        self.view()
    }

    #[wasm_bindgen(js_name = previousPage)]
    pub fn previous_page(&mut self) -> Result<JsValue, JsValue> {
        if let PageChange::Moved(_) = self.state.previous_page() {
            scroll_window_to_top();
        }
        self.view()
    }

    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&mut self, page: usize) -> Result<JsValue, JsValue> {
        let total = self.state.apply(self.posts.posts(), &self.taxonomy).total_pages();
        if let PageChange::Moved(_) = self.state.go_to_page(page, total) {
            scroll_window_to_top();
        }
        self.view()
    }

    /// 无状态筛选 - 参数为 JSON 字符串
    #[wasm_bindgen(js_name = filterArticles)]
    pub fn filter_articles(&self, params_json: &str) -> Result<JsValue, JsValue> {
        let params: FilterParams = serde_json::from_str(params_json)
            .map_err(|e| to_js_error(FilterError::from(e)))?;

        let result = filter::filter_with_params(self.posts.posts(), &self.taxonomy, &params)
            .map_err(to_js_error)?;
        to_js_value(&result)
    }

    /// 文章页的上一篇/下一篇
    pub fn neighbors(&self, slug: &str) -> Result<JsValue, JsValue> {
        let (previous, next) = self.posts.neighbors(slug);
        to_js_value(&(previous.map(PostCard::from), next.map(PostCard::from)))
    }
}
