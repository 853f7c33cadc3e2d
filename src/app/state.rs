// ==========================================
// 赌台荷官轮换系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ConfigApi, RosterApi, RotationApi, StringApi};
use crate::config::{ConfigManager, RotationConfig, RotationConfigReader};
use crate::db;
use crate::repository::{AuditLogRepository, AuditSink, RotationStringRepository, SqliteRosterStore};

/// 应用状态
///
/// 所有 API 共享同一条 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 启动时加载的轮换参数
    pub rotation_config: RotationConfig,

    /// 派台/推送/休息/排班 API
    pub rotation_api: Arc<RotationApi<SqliteRosterStore>>,

    /// 轮换组 API
    pub string_api: Arc<StringApi<SqliteRosterStore>>,

    /// 名册管理 API
    pub roster_api: Arc<RosterApi>,

    /// 配置管理 API
    pub config_api: Arc<ConfigApi>,

    /// 审计日志仓储（用于审计查询）
    pub audit_log_repo: Arc<AuditLogRepository>,
}

impl AppState {
    /// 打开数据库文件并装配
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = db::open_shared_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        let mut state = Self::from_connection(conn)?;
        state.db_path = db_path;
        Ok(state)
    }

    /// 基于已建表的共享连接装配（测试用内存库同样走这里）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone()).map_err(|e| format!("无法初始化配置管理器: {}", e))?,
        );
        let rotation_config = config_manager
            .load_rotation_config()
            .map_err(|e| format!("无法加载轮换配置: {}", e))?;

        // ==========================================
        // Repository层
        // ==========================================
        let roster_store = Arc::new(SqliteRosterStore::from_connection(conn.clone()));
        let string_repo = Arc::new(RotationStringRepository::new(conn.clone()));
        let audit_log_repo = Arc::new(AuditLogRepository::new(conn));
        let audit_sink: Arc<dyn AuditSink> = audit_log_repo.clone();

        // ==========================================
        // API层
        // ==========================================
        let rotation_api = Arc::new(RotationApi::new(
            roster_store.clone(),
            rotation_config.clone(),
            audit_sink.clone(),
        ));
        let string_api = Arc::new(StringApi::new(
            string_repo,
            roster_store.clone(),
            rotation_config.clone(),
            audit_sink.clone(),
        ));
        let roster_api = Arc::new(RosterApi::new(
            roster_store,
            rotation_config.push_interval_minutes,
            audit_sink.clone(),
        ));
        let config_api = Arc::new(ConfigApi::new(config_manager, audit_sink));

        tracing::info!(
            push_interval_minutes = rotation_config.push_interval_minutes,
            matching_strategy = %rotation_config.matching_strategy,
            "AppState初始化完成"
        );

        Ok(Self {
            db_path: ":memory:".to_string(),
            rotation_config,
            rotation_api,
            string_api,
            roster_api,
            config_api,
            audit_log_repo,
        })
    }
}

/// 默认数据库路径
///
/// 优先读取环境变量 TABLE_ROTATION_DB_PATH，其次用户数据目录，最后当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("TABLE_ROTATION_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./table_rotation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("table-rotation");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("table_rotation.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_from_connection_wires_default_config() {
        let conn = db::open_in_memory().unwrap();
        let state = AppState::from_connection(conn).unwrap();
        assert_eq!(state.rotation_config.push_interval_minutes, 20);
        assert_eq!(state.db_path, ":memory:");
    }
}
