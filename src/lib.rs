// ==========================================
// Bullet Points - 核心库
// ==========================================
// 技术栈: Rust + SQLite (EAV 存储)
// 系统定位: 按作用域解析属性值 → 渲染定义列表 → 回写派生属性
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 值解析 / 渲染 / 批处理编排
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 组装入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    AttributeDescriptor, BackendType, BatchResult, EntityOutcome, EntityRecord,
    EntitySelection, ResolvedAttributeValue, ResolvedEntity,
};

pub use engine::{AttributeValueResolver, BatchError, BatchOrchestrator, ListRenderer};

pub use api::{BulletPointsApi, GenerateRequest};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "bullet-points";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
