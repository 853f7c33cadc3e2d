// ==========================================
// 赌台荷官轮换系统 - 引擎层错误类型
// ==========================================
// 分类:
// - NotFound / PreconditionFailed: 业务失败，无任何写入
// - ConcurrentModification: 提交时发现数据已被他人修改，事务已回滚
// - Store: 存储故障，原样上抛，引擎不重试
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity}不存在: id={id}")]
    NotFound { entity: String, id: String },

    #[error("前置条件不满足: {0}")]
    PreconditionFailed(String),

    #[error("并发修改冲突: {0}")]
    ConcurrentModification(String),

    #[error("存储失败: {0}")]
    Store(RepositoryError),
}

impl EngineError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        EngineError::PreconditionFailed(message.into())
    }

    /// 是否为业务失败（可转为失败结果返回给调用方）
    pub fn is_business_failure(&self) -> bool {
        !matches!(self, EngineError::Store(_))
    }
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        if err.is_conflict() {
            EngineError::ConcurrentModification(err.to_string())
        } else {
            match err {
                RepositoryError::NotFound { entity, id } => EngineError::NotFound { entity, id },
                other => EngineError::Store(other),
            }
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_map_to_concurrent_modification() {
        let err: EngineError = RepositoryError::RecordAlreadyClosed {
            entity: "Assignment".to_string(),
            id: "a1".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::ConcurrentModification(_)));
        assert!(err.is_business_failure());

        let err: EngineError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, EngineError::Store(_)));
        assert!(!err.is_business_failure());
    }
}
