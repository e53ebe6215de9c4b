use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use utils_common::compression::{from_compressed_with_max_version, to_compressed};
use utils_common::Entity;

use crate::criteria::CategoryFilter;
use crate::error::CatalogError;

/// 快照版本
pub const SNAPSHOT_VERSION: [u8; 2] = [1, 0];

/// 条目目录 - 条目本身加上分类/子分类下已知的标签
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    /// 所有条目，保持录入顺序
    pub entities: Vec<Entity>,
    /// 分类 -> 该分类下出现过的标签
    pub category_tags: BTreeMap<String, BTreeSet<String>>,
    /// 分类 -> 子分类 -> 该子分类下出现过的标签
    pub subcategory_tags: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl Catalog {
    /// 由条目直接生成目录，条目可以为空
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        let mut category_tags: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut subcategory_tags: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> =
            BTreeMap::new();

        for entity in &entities {
            category_tags
                .entry(entity.category.clone())
                .or_default()
                .extend(entity.tags.iter().cloned());

            if let Some(sub) = &entity.subcategory {
                subcategory_tags
                    .entry(entity.category.clone())
                    .or_default()
                    .entry(sub.clone())
                    .or_default()
                    .extend(entity.tags.iter().cloned());
            }
        }

        Self {
            entities,
            category_tags,
            subcategory_tags,
        }
    }

    /// 从压缩快照恢复目录
    pub fn from_compressed(data: &[u8]) -> Result<Self, CatalogError> {
        Ok(from_compressed_with_max_version(data, SNAPSHOT_VERSION[0])?)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.category_tags.keys().map(String::as_str).collect()
    }

    /// 当前分类下可选的标签，`All` 时返回全部标签
    pub fn tags_for(&self, category: &CategoryFilter) -> BTreeSet<&str> {
        match category.name() {
            Some(name) => self
                .category_tags
                .get(name)
                .map(|tags| tags.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            None => self
                .category_tags
                .values()
                .flatten()
                .map(String::as_str)
                .collect(),
        }
    }

    pub fn subcategories_for(&self, category: &CategoryFilter) -> Vec<&str> {
        category
            .name()
            .and_then(|name| self.subcategory_tags.get(name))
            .map(|subs| subs.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// 选择子分类时要预选的标签
    pub fn inherited_tags(&self, category: &CategoryFilter, subcategory: &str) -> Vec<String> {
        category
            .name()
            .and_then(|name| self.subcategory_tags.get(name))
            .and_then(|subs| subs.get(subcategory))
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl AsRef<[Entity]> for Catalog {
    fn as_ref(&self) -> &[Entity] {
        &self.entities
    }
}

/// 目录构建器
#[derive(Default)]
pub struct CatalogBuilder {
    entities: Vec<Entity>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// 构建目录
    pub fn build(&self) -> Result<Catalog, CatalogError> {
        if self.entities.is_empty() {
            return Err(CatalogError::Empty);
        }

        let catalog = Catalog::from_entities(self.entities.clone());
        tracing::info!(
            entities = catalog.len(),
            categories = catalog.category_tags.len(),
            "目录构建完成"
        );
        Ok(catalog)
    }

    /// 构建并保存压缩快照
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let path = path.as_ref();
        let catalog = self.build()?;
        let bytes = to_compressed(&catalog, SNAPSHOT_VERSION)?;
        fs::write(path, &bytes)?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "目录快照已写入");
        Ok(bytes.len())
    }
}
