// ==========================================
// 赌台荷官轮换系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)，当前仅使用 scope_id='global'
// ==========================================

use crate::config::rotation_config::{MatchingStrategy, ScoringWeights};
use crate::config::rotation_config_trait::RotationConfigReader;
use crate::db::open_shared_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开数据库文件并创建 ConfigManager
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_shared_connection(db_path)?;
        Ok(Self { conn })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取数值配置；格式错误时告警并回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(
                        config_key = key,
                        raw_value = %raw,
                        default = %default,
                        "配置格式错误，使用默认值"
                    );
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 覆盖现有的 global 配置，快照中不存在的键保持不变
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }
}

// ==========================================
// RotationConfigReader Trait 实现
// ==========================================
impl RotationConfigReader for ConfigManager {
    fn get_push_interval_minutes(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::PUSH_INTERVAL_MINUTES, 20)
    }

    fn get_break_interval_minutes(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::BREAK_INTERVAL_MINUTES, 120)
    }

    fn get_meal_deadline_hours(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::MEAL_DEADLINE_HOURS, 5)
    }

    fn get_scoring_weights(&self) -> Result<ScoringWeights, Box<dyn Error>> {
        let d = ScoringWeights::default();
        Ok(ScoringWeights {
            skill_per_level: self.get_parsed_or_default(config_keys::WEIGHT_SKILL, d.skill_per_level)?,
            fairness: self.get_parsed_or_default(config_keys::WEIGHT_FAIRNESS, d.fairness)?,
            seniority_per_level: self
                .get_parsed_or_default(config_keys::WEIGHT_SENIORITY, d.seniority_per_level)?,
            pit_preference_bonus: self
                .get_parsed_or_default(config_keys::WEIGHT_PIT_PREFERENCE, d.pit_preference_bonus)?,
            recent_break_bonus: self
                .get_parsed_or_default(config_keys::WEIGHT_RECENT_BREAK, d.recent_break_bonus)?,
            overdue_break_penalty: self
                .get_parsed_or_default(config_keys::WEIGHT_OVERDUE_BREAK, d.overdue_break_penalty)?,
            same_pit_movement_bonus: self
                .get_parsed_or_default(config_keys::WEIGHT_SAME_PIT, d.same_pit_movement_bonus)?,
            recent_break_minutes: self
                .get_parsed_or_default(config_keys::RECENT_BREAK_MINUTES, d.recent_break_minutes)?,
            overdue_break_minutes: self
                .get_parsed_or_default(config_keys::OVERDUE_BREAK_MINUTES, d.overdue_break_minutes)?,
        })
    }

    fn get_matching_strategy(&self) -> Result<MatchingStrategy, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::MATCHING_STRATEGY, "GREEDY")?;
        Ok(MatchingStrategy::from_str(&value))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 时间间隔
    pub const PUSH_INTERVAL_MINUTES: &str = "push_interval_minutes";
    pub const BREAK_INTERVAL_MINUTES: &str = "break_interval_minutes";
    pub const MEAL_DEADLINE_HOURS: &str = "meal_deadline_hours";

    // 评分权重
    pub const WEIGHT_SKILL: &str = "weight_skill_per_level";
    pub const WEIGHT_FAIRNESS: &str = "weight_fairness";
    pub const WEIGHT_SENIORITY: &str = "weight_seniority_per_level";
    pub const WEIGHT_PIT_PREFERENCE: &str = "weight_pit_preference";
    pub const WEIGHT_RECENT_BREAK: &str = "weight_recent_break";
    pub const WEIGHT_OVERDUE_BREAK: &str = "weight_overdue_break_penalty";
    pub const WEIGHT_SAME_PIT: &str = "weight_same_pit_movement";

    // 休息时效阈值
    pub const RECENT_BREAK_MINUTES: &str = "recent_break_minutes";
    pub const OVERDUE_BREAK_MINUTES: &str = "overdue_break_minutes";

    // 排班
    pub const MATCHING_STRATEGY: &str = "matching_strategy";

    /// 全部已知配置键
    pub const ALL: &[&str] = &[
        PUSH_INTERVAL_MINUTES,
        BREAK_INTERVAL_MINUTES,
        MEAL_DEADLINE_HOURS,
        WEIGHT_SKILL,
        WEIGHT_FAIRNESS,
        WEIGHT_SENIORITY,
        WEIGHT_PIT_PREFERENCE,
        WEIGHT_RECENT_BREAK,
        WEIGHT_OVERDUE_BREAK,
        WEIGHT_SAME_PIT,
        RECENT_BREAK_MINUTES,
        OVERDUE_BREAK_MINUTES,
        MATCHING_STRATEGY,
    ];
}
