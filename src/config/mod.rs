// ==========================================
// Bullet Points - 配置层
// ==========================================
// 职责: 读取批处理配置（目标派生属性、作用域、语言）
// 存储: config_kv 表 (scope_id='global')
// ==========================================

pub mod config_manager;
pub mod config_reader_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use config_reader_trait::{BulletPointsConfigReader, BulletPointsSettings};
