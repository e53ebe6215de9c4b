pub mod compression;
pub mod models;

// 重新导出常用类型和函数
pub use compression::{to_compressed, from_compressed, from_compressed_with_max_version, validate_compressed_data};
pub use models::{Entity, EntityKind};
