//! 筛选条件 - 一次用户交互对应一个新的不可变值。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// 顶层分类选择: 全部 或 指定分类
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Default)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }

    /// 指定的分类名，`All` 时为 None
    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(name) => Some(name),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(trimmed.to_string())
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        CategoryFilter::from(value.as_str())
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        match value {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Only(name) => name,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(name) => f.write_str(name),
        }
    }
}

/// 排序方式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    /// 按创建时间降序
    #[default]
    Newest,
    /// 按创建时间升序
    Oldest,
    /// 按热度降序
    MostPopular,
    /// 按 热度 / 天数 降序
    Trending,
}

impl SortKind {
    pub const ALL: [SortKind; 4] = [
        SortKind::Newest,
        SortKind::Oldest,
        SortKind::MostPopular,
        SortKind::Trending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKind::Newest => "newest",
            SortKind::Oldest => "oldest",
            SortKind::MostPopular => "most_popular",
            SortKind::Trending => "trending",
        }
    }
}

impl FromStr for SortKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortKind::Newest),
            "oldest" => Ok(SortKind::Oldest),
            "most_popular" | "popular" => Ok(SortKind::MostPopular),
            "trending" => Ok(SortKind::Trending),
            other => Err(FilterError::UnknownSort(other.to_string())),
        }
    }
}

impl fmt::Display for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 筛选条件
///
/// 每个 `with_*` / `without_*` 方法消耗旧值并返回新值。控制器整体替换条件，
/// 从不原地修改其中的字段。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct FilterCriteria {
    /// 搜索关键词
    pub search_term: String,
    /// 顶层分类
    pub category: CategoryFilter,
    /// 子分类，仅在选择了具体分类时有意义
    pub subcategory: Option<String>,
    /// 已选标签 (任一命中即可)
    pub tags: BTreeSet<String>,
    /// 属性筛选，例如职位的 location / type (全部命中)
    pub facets: BTreeMap<String, String>,
    /// 排序方式
    pub sort: SortKind,
}

impl FilterCriteria {
    /// 切换分类: 子分类和标签都随之清空
    pub fn with_category(self, category: impl Into<CategoryFilter>) -> Self {
        Self {
            category: category.into(),
            subcategory: None,
            tags: BTreeSet::new(),
            ..self
        }
    }

    /// 选择子分类，并用子分类关联的标签替换已选标签
    pub fn with_subcategory<I, S>(self, name: impl Into<String>, inherited_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subcategory: Some(name.into()),
            tags: inherited_tags.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    /// 标签不存在则加入，存在则移除
    pub fn with_tag_toggled(mut self, tag: &str) -> Self {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_string());
        }
        self
    }

    pub fn without_subcategory(self) -> Self {
        Self {
            subcategory: None,
            ..self
        }
    }

    pub fn without_tags(self) -> Self {
        Self {
            tags: BTreeSet::new(),
            ..self
        }
    }

    pub fn with_search_term(self, search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            ..self
        }
    }

    pub fn with_sort(self, sort: SortKind) -> Self {
        Self { sort, ..self }
    }

    /// 设置或移除 (value 为 None) 一个属性筛选
    pub fn with_facet(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        let key = key.into();
        match value {
            Some(v) if !v.trim().is_empty() => {
                self.facets.insert(key, v);
            }
            _ => {
                self.facets.remove(&key);
            }
        }
        self
    }

    /// 清除细化筛选 (子分类、标签、关键词、属性)，保留分类和排序
    pub fn cleared(self) -> Self {
        Self {
            category: self.category,
            sort: self.sort,
            ..Self::default()
        }
    }

    /// 是否存在任何细化筛选
    pub fn has_refinements(&self) -> bool {
        self.subcategory.is_some()
            || !self.tags.is_empty()
            || !self.search_term.trim().is_empty()
            || !self.facets.is_empty()
    }
}
