// ==========================================
// 赌台荷官轮换系统 - 配置管理 API
// ==========================================
// 职责: 轮换参数查询、更新、快照管理
// ==========================================

use std::sync::Arc;

use serde_json::json;

use crate::api::error::{ApiError, ApiResult};
use crate::api::result::{audit, OperationResult};
use crate::config::{config_keys, ConfigManager, RotationConfig, RotationConfigReader};
use crate::domain::{ActionType, AuditEntry};
use crate::repository::AuditSink;

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
    audit_sink: Arc<dyn AuditSink>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>, audit_sink: Arc<dyn AuditSink>) -> Self {
        Self {
            config_manager,
            audit_sink,
        }
    }

    /// 当前生效的轮换参数（未配置项取默认值）
    pub fn get_rotation_config(&self) -> ApiResult<RotationConfig> {
        self.config_manager
            .load_rotation_config()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// 更新单个配置项
    ///
    /// 键必须是已知配置键；间隔类为正整数，权重为非负数，匹配策略只接受 GREEDY / OPTIMAL
    pub fn update_config(&self, actor_id: &str, key: &str, value: &str) -> ApiResult<OperationResult<()>> {
        if let Err(reason) = validate_config_value(key, value) {
            return Ok(OperationResult::failure(reason));
        }

        self.config_manager
            .set_global_config_value(key, value.trim())
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(actor_id, ActionType::SettingsChanged, format!("Updated {} = {}", key, value.trim()))
                .with_payload(json!({ "key": key, "value": value.trim() })),
        );
        Ok(OperationResult::ok("Configuration updated", ()))
    }

    /// 导出配置快照（JSON）
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        self.config_manager
            .get_config_snapshot()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    /// 从快照恢复配置
    pub fn restore_config_from_snapshot(
        &self,
        actor_id: &str,
        snapshot_json: &str,
    ) -> ApiResult<OperationResult<usize>> {
        if serde_json::from_str::<serde_json::Value>(snapshot_json).is_err() {
            return Ok(OperationResult::failure("Snapshot is not valid JSON"));
        }

        let restored = self
            .config_manager
            .restore_config_from_snapshot(snapshot_json)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(
                actor_id,
                ActionType::SettingsChanged,
                format!("Restored {} configuration values from snapshot", restored),
            ),
        );
        Ok(OperationResult::ok("Configuration restored", restored))
    }
}

/// 以分钟/小时计的整数项，必须为正整数
const INTEGER_KEYS: &[&str] = &[
    config_keys::PUSH_INTERVAL_MINUTES,
    config_keys::BREAK_INTERVAL_MINUTES,
    config_keys::MEAL_DEADLINE_HOURS,
    config_keys::RECENT_BREAK_MINUTES,
    config_keys::OVERDUE_BREAK_MINUTES,
];

fn validate_config_value(key: &str, value: &str) -> Result<(), String> {
    if !config_keys::ALL.contains(&key) {
        return Err(format!("Unknown configuration key: {}", key));
    }

    let value = value.trim();
    if key == config_keys::MATCHING_STRATEGY {
        return match value.to_uppercase().as_str() {
            "GREEDY" | "OPTIMAL" | "HUNGARIAN" => Ok(()),
            _ => Err(format!("Unknown matching strategy: {}", value)),
        };
    }

    if INTEGER_KEYS.contains(&key) {
        return match value.parse::<i64>() {
            Ok(v) if v > 0 => Ok(()),
            _ => Err(format!("{} must be a positive integer", key)),
        };
    }

    // 评分权重允许为 0（关闭该项）
    match value.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.is_finite() => Ok(()),
        _ => Err(format!("{} must be a non-negative number", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_config_value() {
        assert!(validate_config_value(config_keys::PUSH_INTERVAL_MINUTES, "30").is_ok());
        assert!(validate_config_value(config_keys::PUSH_INTERVAL_MINUTES, "0").is_err());
        assert!(validate_config_value(config_keys::PUSH_INTERVAL_MINUTES, "20.5").is_err());
        assert!(validate_config_value(config_keys::WEIGHT_FAIRNESS, "0").is_ok());
        assert!(validate_config_value(config_keys::WEIGHT_FAIRNESS, "abc").is_err());
        assert!(validate_config_value(config_keys::MATCHING_STRATEGY, "optimal").is_ok());
        assert!(validate_config_value(config_keys::MATCHING_STRATEGY, "greedy").is_ok());
        assert!(validate_config_value(config_keys::MATCHING_STRATEGY, "random").is_err());
        assert!(validate_config_value("unknown_key", "1").is_err());
    }
}
