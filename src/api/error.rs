// ==========================================
// Bullet Points - API层错误类型
// ==========================================
// 职责: 将引擎/仓储错误转换为面向调用方的错误分类
// 红线: 不暴露内部标识,只保留可读原因
// ==========================================

use crate::engine::error::BatchError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::StorageError(msg) | RepositoryError::PersistenceError(msg) => {
                ApiError::DatabaseError(msg)
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 BatchError 转换
// ==========================================
impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            BatchError::Config(msg) => ApiError::ConfigError(msg),
            BatchError::Repository(err) => err.into(),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::not_found("eav_attribute", 7).into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m.contains("eav_attribute") && m.contains('7')));

        let err: ApiError = RepositoryError::StorageError("no such table".to_string()).into();
        assert!(matches!(err, ApiError::DatabaseError(_)));
    }

    #[test]
    fn test_batch_error_conversion() {
        let err: ApiError = BatchError::InvalidInput("empty".to_string()).into();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err: ApiError =
            BatchError::Repository(RepositoryError::LockError("poisoned".to_string())).into();
        assert!(matches!(err, ApiError::DatabaseConnectionError(ref m) if m.contains("poisoned")));
    }
}
