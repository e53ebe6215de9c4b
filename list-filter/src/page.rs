use serde::Serialize;

/// 默认每页条数
pub const DEFAULT_LIMIT: usize = 12;

/// 分页结果 - 返回给视图层
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// 当前页的条目
    pub items: Vec<T>,
    /// 筛选结果总数
    pub total: usize,
    /// 当前页码 (从1开始)
    pub page: usize,
    /// 每页条数
    pub limit: usize,
    /// 总页数
    pub total_pages: usize,
}

/// 分页: 页码和条数至少为1，页码超出范围时取最后一页
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> Page<T> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let total = items.len();
    let total_pages = total.div_ceil(limit);
    let page = page.unwrap_or(1).max(1).min(total_pages.max(1));

    let start = (page - 1) * limit;
    let items = items.into_iter().skip(start).take(limit).collect();

    Page {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}
