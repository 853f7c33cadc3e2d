use crate::domain::{AuditEntry, AuditLog};
use crate::repository::db_utils::{fmt_ts, utc_now};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// AuditSink Trait - 审计接收方
// ==========================================
// 调用方 (API 层) 以“发出即忘”的方式使用：失败只记录告警，不影响业务结果
pub trait AuditSink: Send + Sync {
    /// 记录一条审计日志，返回 log_id
    fn log_action(&self, entry: AuditEntry) -> RepositoryResult<String>;
}

// ==========================================
// AuditLogRepository - 审计日志仓储
// ==========================================
pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub(super) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入审计日志
    ///
    /// # 返回
    /// - `Ok(log_id)`: 成功插入
    pub fn insert(&self, log: &AuditLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO audit_log (
                log_id, actor_id, action_type, description,
                related_entity_id, related_entity_type, payload_json, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                log.log_id,
                log.actor_id,
                log.action_type.as_str(),
                log.description,
                log.related_entity_id,
                log.related_entity_type,
                log.payload_json.as_ref().map(|v| v.to_string()),
                fmt_ts(log.timestamp),
            ],
        )?;

        Ok(log.log_id.clone())
    }

    /// 由入参补全主键与时间戳后写入
    pub fn record(&self, entry: AuditEntry, timestamp: NaiveDateTime) -> RepositoryResult<String> {
        let log = AuditLog {
            log_id: Uuid::new_v4().to_string(),
            actor_id: entry.actor_id,
            action_type: entry.action_type,
            description: entry.description,
            related_entity_id: entry.related_entity_id,
            related_entity_type: entry.related_entity_type,
            payload_json: entry.payload_json,
            timestamp,
        };
        self.insert(&log)
    }
}

impl AuditSink for AuditLogRepository {
    fn log_action(&self, entry: AuditEntry) -> RepositoryResult<String> {
        self.record(entry, utc_now())
    }
}
