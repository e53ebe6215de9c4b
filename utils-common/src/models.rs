use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 条目类型 - 区分论坛、社团和职位列表
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// 论坛讨论
    #[default]
    Forum,
    /// 社团 / 兴趣小组
    Group,
    /// 职位或实习
    Job,
}

/// 列表条目 - 论坛、社团、职位共用的可筛选记录
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Entity {
    /// 唯一标识符
    pub id: String,
    /// 条目类型
    #[serde(default)]
    pub kind: EntityKind,
    /// 标题
    pub title: String,
    /// 描述
    #[serde(default)]
    pub description: String,
    /// 分类
    pub category: String,
    /// 子分类 (可选)
    #[serde(default)]
    pub subcategory: Option<String>,
    /// 标签列表
    #[serde(default)]
    pub tags: Vec<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 热度: 评论数 / 成员数 / 申请人数
    #[serde(default)]
    pub popularity: u64,
    /// 视图相关的附加属性，例如职位的 location / type
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// 详情页URL
    #[serde(default)]
    pub url: String,
}

impl Entity {
    /// 读取附加属性
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
