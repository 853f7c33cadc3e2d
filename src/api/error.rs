// ==========================================
// 赌台荷官轮换系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/Engine错误为可读的错误消息
// 约定: 业务失败转为 OperationResult 失败结果，只有存储故障以 Err 返回
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("并发修改冲突: {0}")]
    ConcurrentModification(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
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
            // 并发控制错误
            RepositoryError::OptimisticLockFailure { .. }
            | RepositoryError::RecordAlreadyClosed { .. }
            | RepositoryError::UniqueConstraintViolation(_) => {
                ApiError::ConcurrentModification(format!("数据已被其他操作修改: {}", err))
            }

            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }

            // 数据库错误
            RepositoryError::LockError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("关联数据不存在: {}", msg))
            }

            // 数据质量错误
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::PreconditionFailed(msg) => ApiError::BusinessRuleViolation(msg),
            EngineError::ConcurrentModification(msg) => ApiError::ConcurrentModification(msg),
            EngineError::Store(e) => e.into(),
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
        let repo_err = RepositoryError::NotFound {
            entity: "Dealer".to_string(),
            id: "D001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Dealer"));
                assert!(msg.contains("D001"));
            }
            _ => panic!("Expected NotFound"),
        }

        let repo_err = RepositoryError::OptimisticLockFailure {
            entity: "Table".to_string(),
            id: "T001".to_string(),
            expected: 3,
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::ConcurrentModification(msg) => {
                assert!(msg.contains("T001"));
                assert!(msg.contains("已被其他操作修改"));
            }
            _ => panic!("Expected ConcurrentModification"),
        }
    }

    #[test]
    fn test_engine_store_error_unwraps_to_database_error() {
        let err: ApiError = EngineError::Store(RepositoryError::DatabaseQueryError("disk I/O".to_string())).into();
        assert!(matches!(err, ApiError::DatabaseError(msg) if msg == "disk I/O"));
    }
}
