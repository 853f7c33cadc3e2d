// ==========================================
// 赌台荷官轮换系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建表语句，派台不变量用部分唯一索引兜底
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开数据库、建表，返回共享连接
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<Arc<Mutex<Connection>>> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 内存数据库（测试/演练用）
pub fn open_in_memory() -> rusqlite::Result<Arc<Mutex<Connection>>> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    let version = read_schema_version(conn)?;
    if version != Some(CURRENT_SCHEMA_VERSION) {
        tracing::warn!(
            expected = CURRENT_SCHEMA_VERSION,
            actual = ?version,
            "数据库 schema_version 与当前代码不一致"
        );
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_scope (
    scope_id TEXT PRIMARY KEY,
    scope_type TEXT NOT NULL,
    scope_key TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE(scope_type, scope_key)
);

INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
VALUES ('global', 'GLOBAL', 'global');

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS dealers (
    dealer_id TEXT PRIMARY KEY,
    employee_number TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    status TEXT NOT NULL,
    seniority_level INTEGER NOT NULL DEFAULT 0,
    shift_start TEXT NOT NULL,
    shift_end TEXT NOT NULL,
    last_break_time TEXT,
    last_meal_time TEXT,
    preferred_pit TEXT,
    revision INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS dealer_certifications (
    certification_id TEXT PRIMARY KEY,
    dealer_id TEXT NOT NULL REFERENCES dealers(dealer_id) ON DELETE CASCADE,
    game_type TEXT NOT NULL,
    proficiency_level INTEGER NOT NULL,
    craps_role TEXT NOT NULL DEFAULT 'NONE',
    certified_date TEXT NOT NULL,
    expiration_date TEXT,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS casino_tables (
    table_id TEXT PRIMARY KEY,
    table_number TEXT NOT NULL UNIQUE,
    game_type TEXT NOT NULL,
    status TEXT NOT NULL,
    pit TEXT NOT NULL,
    min_bet REAL NOT NULL DEFAULT 0,
    max_bet REAL NOT NULL DEFAULT 0,
    is_high_limit INTEGER NOT NULL DEFAULT 0,
    required_dealer_count INTEGER NOT NULL DEFAULT 1,
    push_interval_minutes INTEGER NOT NULL DEFAULT 20,
    is_locked INTEGER NOT NULL DEFAULT 0,
    revision INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS assignments (
    assignment_id TEXT PRIMARY KEY,
    dealer_id TEXT NOT NULL REFERENCES dealers(dealer_id),
    table_id TEXT NOT NULL REFERENCES casino_tables(table_id),
    start_time TEXT NOT NULL,
    end_time TEXT,
    craps_role TEXT NOT NULL DEFAULT 'NONE',
    is_current INTEGER NOT NULL,
    is_ai_generated INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

-- 每名荷官至多一条未结束派台
CREATE UNIQUE INDEX IF NOT EXISTS ux_assignments_dealer_open
    ON assignments(dealer_id) WHERE end_time IS NULL;

-- 每张赌台至多一条进行中的当前派台
CREATE UNIQUE INDEX IF NOT EXISTS ux_assignments_table_current
    ON assignments(table_id) WHERE is_current = 1 AND end_time IS NULL;

CREATE INDEX IF NOT EXISTS ix_assignments_table ON assignments(table_id, end_time);

CREATE TABLE IF NOT EXISTS break_records (
    break_id TEXT PRIMARY KEY,
    dealer_id TEXT NOT NULL REFERENCES dealers(dealer_id),
    break_type TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT,
    expected_duration_minutes INTEGER NOT NULL,
    is_compliant INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_break_records_dealer_open
    ON break_records(dealer_id) WHERE end_time IS NULL;

CREATE TABLE IF NOT EXISTS rotation_strings (
    string_id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 1,
    priority INTEGER NOT NULL,
    table_ids_json TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS rotation_string_members (
    member_id TEXT PRIMARY KEY,
    string_id TEXT NOT NULL REFERENCES rotation_strings(string_id) ON DELETE CASCADE,
    dealer_id TEXT NOT NULL REFERENCES dealers(dealer_id),
    rotation_order INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    assigned_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS ux_string_members_active
    ON rotation_string_members(string_id, dealer_id) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS audit_log (
    log_id TEXT PRIMARY KEY,
    actor_id TEXT NOT NULL,
    action_type TEXT NOT NULL,
    description TEXT NOT NULL,
    related_entity_id TEXT,
    related_entity_type TEXT,
    payload_json TEXT,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ix_audit_log_ts ON audit_log(timestamp);
"#;
