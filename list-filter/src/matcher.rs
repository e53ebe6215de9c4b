//! 单条件谓词。每个函数只看条件中的一个字段，组合时取逻辑与。
//!
//! 注意标签的语义: 字段之间是 AND，已选标签之间是 OR —— 命中任一已选标签即可。

use utils_common::Entity;

use crate::criteria::{CategoryFilter, FilterCriteria};

pub fn matches_category(entity: &Entity, criteria: &FilterCriteria) -> bool {
    match &criteria.category {
        CategoryFilter::All => true,
        CategoryFilter::Only(name) => entity.category == *name,
    }
}

pub fn matches_subcategory(entity: &Entity, criteria: &FilterCriteria) -> bool {
    match &criteria.subcategory {
        None => true,
        Some(name) => entity.subcategory.as_deref() == Some(name.as_str()),
    }
}

/// 未选标签时放行，否则条目标签与已选标签有交集即可
pub fn matches_tags(entity: &Entity, criteria: &FilterCriteria) -> bool {
    criteria.tags.is_empty() || entity.tags.iter().any(|t| criteria.tags.contains(t))
}

/// 不区分大小写的子串匹配: 标题、描述、任一标签
pub fn matches_search(entity: &Entity, criteria: &FilterCriteria) -> bool {
    let term = criteria.search_term.trim();
    if term.is_empty() {
        return true;
    }

    let needle = term.to_lowercase();
    entity.title.to_lowercase().contains(&needle)
        || entity.description.to_lowercase().contains(&needle)
        || entity.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

/// 属性筛选: 每个键都必须存在且值相等 (忽略ASCII大小写)
pub fn matches_facets(entity: &Entity, criteria: &FilterCriteria) -> bool {
    criteria.facets.iter().all(|(key, expected)| {
        entity
            .attribute(key)
            .is_some_and(|actual| actual.eq_ignore_ascii_case(expected))
    })
}

/// 组合谓词
pub fn matches(entity: &Entity, criteria: &FilterCriteria) -> bool {
    matches_category(entity, criteria)
        && matches_subcategory(entity, criteria)
        && matches_tags(entity, criteria)
        && matches_facets(entity, criteria)
        && matches_search(entity, criteria)
}
