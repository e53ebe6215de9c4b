//! 数据入口: 外部加载的条目在这里被校验，格式不对的记录直接跳过，不会进入筛选核心。

use serde_json::Value;
use utils_common::Entity;

use crate::error::{FilterError, Result};

/// 解析结果
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ingested {
    /// 有效条目，保持原顺序
    pub entities: Vec<Entity>,
    /// 被跳过的记录数
    pub skipped: usize,
}

/// 解析JSON数组，跳过无法识别或缺少id的记录
pub fn parse_entities(json: &str) -> Result<Ingested> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(records) = value else {
        return Err(FilterError::InvalidPayload);
    };

    let mut out = Ingested::default();
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Entity>(record) {
            Ok(entity) if !entity.id.trim().is_empty() => out.entities.push(entity),
            Ok(_) => {
                tracing::warn!(index, "跳过缺少id的条目");
                out.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "跳过格式错误的条目");
                out.skipped += 1;
            }
        }
    }

    tracing::debug!(valid = out.entities.len(), skipped = out.skipped, "条目解析完成");
    Ok(out)
}
