// ==========================================
// Bullet Points - 引擎层错误类型
// ==========================================
// 批次级错误: 一旦发生整个批次中止（不产生部分结果）
// 实体级错误不走这里,而是折叠进 BatchResult.errors
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    /// 输入不合法（属性列表为空 / 缺少筛选条件 / 派生属性在来源中）
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 配置读取失败
    #[error("配置错误: {0}")]
    Config(String),

    /// 类目/属性/实体筛选或批量解析失败
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, BatchError>;
