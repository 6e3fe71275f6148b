// ==========================================
// Bullet Points - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: NotFound / StorageError(读) / PersistenceError(写) / ValidationError
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据缺失 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    // ===== 数据库错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    /// 读路径（查询构建/执行）失败
    #[error("存储读取失败: {0}")]
    StorageError(String),

    /// 写路径失败（冲突/约束/校验）
    #[error("持久化失败: {0}")]
    PersistenceError(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 将写路径上的 rusqlite 错误归类为持久化错误
    pub fn persistence(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => RepositoryError::PersistenceError(msg),
            other => RepositoryError::PersistenceError(other.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}

// 读路径默认归类: 无记录 → NotFound, 其余 → StorageError
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            rusqlite::Error::SqliteFailure(_, Some(msg)) => RepositoryError::StorageError(msg),
            _ => RepositoryError::StorageError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_read_fault_maps_to_storage_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err: RepositoryError = conn
            .prepare("SELECT value FROM missing_table")
            .unwrap_err()
            .into();
        assert!(matches!(err, RepositoryError::StorageError(ref m) if m.contains("missing_table")));
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_write_fault_maps_to_persistence_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, v TEXT NOT NULL);")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t (id, v) VALUES (1, NULL)", [])
            .map_err(RepositoryError::persistence)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::PersistenceError(ref m) if m.contains("NOT NULL")));
    }
}
