// ==========================================
// 赌台荷官轮换系统 - API 操作结果
// ==========================================
// 业务结果(成功/失败) → OperationResult
// 存储故障 → Err(ApiError)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::AuditEntry;
use crate::engine::error::EngineResult;
use crate::repository::AuditSink;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub message: String,
    pub payload: Option<T>,
}

impl<T> OperationResult<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: Some(payload),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }
}

/// 将引擎结果折算为操作结果
///
/// 业务失败 → `Ok(failure)`；存储故障 → `Err`
pub(crate) fn settle<T>(
    result: EngineResult<T>,
    on_success: impl FnOnce(&T) -> String,
) -> ApiResult<OperationResult<T>> {
    match result {
        Ok(value) => {
            let message = on_success(&value);
            Ok(OperationResult::ok(message, value))
        }
        Err(e) if e.is_business_failure() => Ok(OperationResult::failure(e.to_string())),
        Err(e) => Err(ApiError::from(e)),
    }
}

/// 写审计日志（失败只告警，不影响操作结果）
pub(crate) fn audit(sink: &dyn AuditSink, entry: AuditEntry) {
    let action_type = entry.action_type;
    if let Err(e) = sink.log_action(entry) {
        warn!(action_type = %action_type, error = %e, "审计日志写入失败");
    }
}
