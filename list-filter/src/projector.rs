//! 结果投影: 先按组合谓词筛选，再按排序方式稳定排序。输入从不被修改。

use chrono::{DateTime, Utc};
use utils_common::Entity;

use crate::criteria::FilterCriteria;
use crate::matcher;
use crate::page::{paginate, Page};
use crate::sorter;

/// 结果投影器
pub struct ResultProjector;

impl ResultProjector {
    /// 筛选并排序，返回指向源集合的有序引用列表
    pub fn project<'a>(
        entities: &'a [Entity],
        criteria: &FilterCriteria,
        now: DateTime<Utc>,
    ) -> Vec<&'a Entity> {
        let mut matched: Vec<&Entity> = entities
            .iter()
            .filter(|e| matcher::matches(e, criteria))
            .collect();

        sorter::sort_entities(&mut matched, criteria.sort, now);

        tracing::debug!(
            source = entities.len(),
            matched = matched.len(),
            sort = %criteria.sort,
            "重新计算列表结果"
        );
        matched
    }

    /// 筛选、排序并分页，返回拥有所有权的条目
    pub fn project_page(
        entities: &[Entity],
        criteria: &FilterCriteria,
        now: DateTime<Utc>,
        page: Option<usize>,
        limit: Option<usize>,
    ) -> Page<Entity> {
        let owned = Self::project(entities, criteria, now)
            .into_iter()
            .cloned()
            .collect();
        paginate(owned, page, limit)
    }
}
