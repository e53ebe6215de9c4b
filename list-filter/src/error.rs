//! 错误类型。筛选、排序本身是全函数，只有数据边界 (快照、JSON、JS桥) 会失败。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("未知的排序方式: {0:?}")]
    UnknownSort(String),

    #[error("条目数据必须是JSON数组")]
    InvalidPayload,

    #[error("解析JSON失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("序列化结果失败: {0}")]
    Serialize(String),
}

pub type Result<T, E = FilterError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("无法构建目录: 没有条目数据")]
    Empty,

    #[error("读写目录快照失败: {0}")]
    Io(#[from] std::io::Error),
}
