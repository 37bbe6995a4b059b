use std::collections::HashSet;
use utils_common::{Post, Taxonomy, ALL_CATEGORY};

use crate::models::{FilterError, FilterParams, FilterResult, PostCard, PAGE_SIZE};

/// 按分类筛选 - "전체" 保留全部文章（包括没有分类的）
pub fn filter_by_category<'a>(posts: &'a [Post], category: &str) -> Vec<&'a Post> {
    if category == ALL_CATEGORY {
        return posts.iter().collect();
    }
    posts
        .iter()
        .filter(|post| post.category.as_deref() == Some(category))
        .collect()
}

/// 当前候选文章中可选的标签组：至少有一个原始标签出现在候选文章中的组
pub fn selectable_tag_groups<'a>(pool: &[&Post], taxonomy: &'a Taxonomy) -> Vec<&'a str> {
    let present: HashSet<&str> = pool
        .iter()
        .flat_map(|post| post.tags.iter().map(String::as_str))
        .collect();

    taxonomy
        .tag_groups
        .iter()
        .filter(|group| group.tags.iter().any(|tag| present.contains(tag.as_str())))
        .map(|group| group.name.as_str())
        .collect()
}

/// 展开标签组为原始标签；未知的组名按字面标签处理
pub fn expand_tag_groups<'a, I>(selected: I, taxonomy: &'a Taxonomy) -> HashSet<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut tags = HashSet::new();
    for name in selected {
        match taxonomy.group(name) {
            Some(group) => tags.extend(group.tags.iter().map(String::as_str)),
            None => {
                tags.insert(name.as_str());
            }
        }
    }
    tags
}

/// 按标签组筛选 - 所有选中组的标签取并集，命中任一标签即保留
pub fn filter_by_tag_groups<'a>(pool: Vec<&'a Post>, selected: &[String], taxonomy: &Taxonomy) -> Vec<&'a Post> {
    if selected.is_empty() {
        return pool;
    }
    let tags = expand_tag_groups(selected, taxonomy);
    pool.into_iter()
        .filter(|post| post.tags.iter().any(|tag| tags.contains(tag.as_str())))
        .collect()
}

/// 总页数
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// 取第 `page` 页（从1开始），超出范围时为空
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// 列表视图 - 当前筛选状态下的计算结果
#[derive(Debug)]
pub struct ListingView<'a> {
    /// 分类筛选后的候选文章
    pub category_pool: Vec<&'a Post>,
    /// 当前分类下可选的标签组
    pub selectable_tag_groups: Vec<&'a str>,
    /// 分类与标签组都筛选后的文章
    pub filtered: Vec<&'a Post>,
    pub page: usize,
    pub page_size: usize,
}

impl<'a> ListingView<'a> {
    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size)
    }

    /// 当前页的文章
    pub fn page_items(&self) -> &[&'a Post] {
        page_slice(&self.filtered, self.page, self.page_size)
    }

    /// 第1页时禁用"上一页"
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// 最后一页时禁用"下一页"
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// 翻页结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChange {
    /// 页码已改变，视图需要滚动到顶部
    Moved(usize),
    /// 已在边界，没有变化
    Unchanged,
}

/// 筛选状态 - 由列表视图持有
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    active_category: String,
    selected_tag_groups: Vec<String>,
    current_page: usize,
    page_size: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active_category: ALL_CATEGORY.to_string(),
            selected_tag_groups: Vec::new(),
            current_page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn selected_tag_groups(&self) -> &[String] {
        &self.selected_tag_groups
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// 切换分类：清空标签组选择并回到第1页
    pub fn select_category(&mut self, taxonomy: &Taxonomy, category: &str) -> Result<(), FilterError> {
        if !taxonomy.has_category(category) {
            return Err(FilterError::UnknownCategory(category.to_string()));
        }
        self.active_category = category.to_string();
        self.selected_tag_groups.clear();
        self.current_page = 1;
        Ok(())
    }

    /// 选中/取消一个标签组，回到第1页。返回切换后是否选中
    pub fn toggle_tag_group(&mut self, group: &str) -> bool {
        self.current_page = 1;
        if let Some(pos) = self.selected_tag_groups.iter().position(|g| g == group) {
            self.selected_tag_groups.remove(pos);
            false
        } else {
            self.selected_tag_groups.push(group.to_string());
            true
        }
    }

    /// 清空标签组选择（"show all"）
    pub fn clear_tag_groups(&mut self) {
        self.selected_tag_groups.clear();
        self.current_page = 1;
    }

    pub fn next_page(&mut self, total_pages: usize) -> PageChange {
        if self.current_page < total_pages {
            self.current_page += 1;
            PageChange::Moved(self.current_page)
        } else {
            PageChange::Unchanged
        }
    }

    pub fn previous_page(&mut self) -> PageChange {
        if self.current_page > 1 {
            self.current_page -= 1;
            PageChange::Moved(self.current_page)
        } else {
            PageChange::Unchanged
        }
    }

    /// 跳到指定页，限制在 [1, total_pages] 内
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) -> PageChange {
        let page = page.clamp(1, total_pages.max(1));
        if page == self.current_page {
            PageChange::Unchanged
        } else {
            self.current_page = page;
            PageChange::Moved(page)
        }
    }

    /// 计算当前状态下的列表视图：先按分类缩小候选集合，再按标签组筛选
    pub fn apply<'a>(&self, posts: &'a [Post], taxonomy: &'a Taxonomy) -> ListingView<'a> {
        let category_pool = filter_by_category(posts, &self.active_category);
        let selectable = selectable_tag_groups(&category_pool, taxonomy);
        let filtered = filter_by_tag_groups(category_pool.clone(), &self.selected_tag_groups, taxonomy);

        ListingView {
            category_pool,
            selectable_tag_groups: selectable,
            filtered,
            page: self.current_page,
            page_size: self.page_size,
        }
    }

    /// 生成返回给客户端的结果
    pub fn to_result(&self, posts: &[Post], taxonomy: &Taxonomy) -> FilterResult {
        let view = self.apply(posts, taxonomy);
        FilterResult {
            posts: view.page_items().iter().map(|post| PostCard::from(*post)).collect(),
            total: view.filtered.len(),
            page: view.page,
            limit: view.page_size,
            total_pages: view.total_pages(),
            has_previous: view.has_previous(),
            has_next: view.has_next(),
            active_category: self.active_category.clone(),
            selected_tag_groups: self.selected_tag_groups.clone(),
            selectable_tag_groups: view.selectable_tag_groups.iter().map(|g| g.to_string()).collect(),
        }
    }
}

/// 无状态筛选 - 一次性应用客户端参数，页码超出时取最后一页
pub fn filter_with_params(
    posts: &[Post],
    taxonomy: &Taxonomy,
    params: &FilterParams,
) -> Result<FilterResult, FilterError> {
    let mut state = FilterState::new().with_page_size(params.limit.unwrap_or(PAGE_SIZE));
    if let Some(category) = params.category.as_deref() {
        state.select_category(taxonomy, category)?;
    }
    for group in params.tag_groups.iter().flatten() {
        if !state.selected_tag_groups.contains(group) {
            state.toggle_tag_group(group);
        }
    }

    let total = total_pages(state.apply(posts, taxonomy).filtered.len(), state.page_size);
    state.go_to_page(params.page.unwrap_or(1), total);
    Ok(state.to_result(posts, taxonomy))
}
