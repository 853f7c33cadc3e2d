use super::core::AuditLogRepository;
use crate::domain::{ActionType, AuditLog};
use crate::repository::db_utils::{fmt_ts, parse_ts};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

const AUDIT_COLUMNS: &str = r#"
    log_id, actor_id, action_type, description,
    related_entity_id, related_entity_type, payload_json, timestamp
"#;

impl AuditLogRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 最近的审计日志（时间倒序）
    pub fn find_recent(&self, limit: i32) -> RepositoryResult<Vec<AuditLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM audit_log ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
            AUDIT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 按操作人查询
    pub fn find_by_actor(&self, actor_id: &str, limit: i32) -> RepositoryResult<Vec<AuditLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM audit_log WHERE actor_id = ?1 ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
            AUDIT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![actor_id, limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 按时间范围查询（闭区间）
    pub fn find_by_time_range(
        &self,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> RepositoryResult<Vec<AuditLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM audit_log WHERE timestamp BETWEEN ?1 AND ?2 ORDER BY timestamp DESC, rowid DESC",
            AUDIT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![fmt_ts(start_time), fmt_ts(end_time)], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 按操作类型查询
    pub fn find_by_action_type(&self, action_type: ActionType, limit: i32) -> RepositoryResult<Vec<AuditLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM audit_log WHERE action_type = ?1 ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
            AUDIT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![action_type.as_str(), limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }

    /// 按关联实体查询（如某荷官/某赌台的全部操作）
    pub fn find_by_entity(&self, entity_id: &str) -> RepositoryResult<Vec<AuditLog>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM audit_log WHERE related_entity_id = ?1 ORDER BY timestamp DESC, rowid DESC",
            AUDIT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let logs = stmt
            .query_map(params![entity_id], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(logs)
    }
}

fn map_row(row: &Row) -> SqliteResult<AuditLog> {
    let action_type_str: String = row.get(2)?;
    let payload_json_str: Option<String> = row.get(6)?;
    let timestamp_str: String = row.get(7)?;

    // 未知类型按人工干预处理，避免历史数据因枚举调整而无法读取
    let action_type = ActionType::from_str(&action_type_str).unwrap_or(ActionType::ManualOverride);

    Ok(AuditLog {
        log_id: row.get(0)?,
        actor_id: row.get(1)?,
        action_type,
        description: row.get(3)?,
        related_entity_id: row.get(4)?,
        related_entity_type: row.get(5)?,
        payload_json: payload_json_str.and_then(|s| serde_json::from_str(&s).ok()),
        timestamp: parse_ts(7, &timestamp_str)?,
    })
}
