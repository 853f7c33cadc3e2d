// ==========================================
// 赌台荷官轮换系统 - 轮换组数据仓储
// ==========================================
// 依据: rotation_strings / rotation_string_members 表
// 红线: 成员移除 = 置 is_active=0（保留历史）
// ==========================================

use crate::domain::{RotationString, StringMember};
use crate::repository::db_utils::{fmt_ts, parse_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub struct RotationStringRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RotationStringRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 创建轮换组
    ///
    /// priority = 现有组数 + 1；名称重复 → UniqueConstraintViolation
    pub fn create(&self, name: &str, description: &str, now: NaiveDateTime) -> RepositoryResult<RotationString> {
        let conn = self.get_conn()?;

        let count: i32 = conn.query_row("SELECT COUNT(*) FROM rotation_strings", [], |row| row.get(0))?;
        let string = RotationString {
            string_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            is_active: true,
            priority: count + 1,
            members: Vec::new(),
            table_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            r#"
            INSERT INTO rotation_strings (
                string_id, name, description, is_active, priority, table_ids_json, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                string.string_id,
                string.name,
                string.description,
                string.is_active,
                string.priority,
                serde_json::to_string(&string.table_ids)?,
                fmt_ts(now),
                fmt_ts(now),
            ],
        )?;

        Ok(string)
    }

    /// 添加成员
    ///
    /// # 返回
    /// - `Ok(true)`: 已添加
    /// - `Ok(false)`: 荷官已是该组的有效成员（未做任何修改）
    pub fn add_member(
        &self,
        string_id: &str,
        dealer_id: &str,
        rotation_order: i32,
        now: NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                r#"
                SELECT 1 FROM rotation_string_members
                WHERE string_id = ?1 AND dealer_id = ?2 AND is_active = 1
                "#,
                params![string_id, dealer_id],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Ok(false);
        }

        tx.execute(
            r#"
            INSERT INTO rotation_string_members (
                member_id, string_id, dealer_id, rotation_order, is_active, assigned_at
            ) VALUES (?1, ?2, ?3, ?4, 1, ?5)
            "#,
            params![
                Uuid::new_v4().to_string(),
                string_id,
                dealer_id,
                rotation_order,
                fmt_ts(now),
            ],
        )?;
        touch(&tx, string_id, now)?;
        tx.commit()?;
        Ok(true)
    }

    /// 停用成员
    ///
    /// # 返回
    /// - `Ok(false)`: 荷官不是该组的有效成员
    pub fn deactivate_member(&self, string_id: &str, dealer_id: &str, now: NaiveDateTime) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let rows = tx.execute(
            r#"
            UPDATE rotation_string_members SET is_active = 0
            WHERE string_id = ?1 AND dealer_id = ?2 AND is_active = 1
            "#,
            params![string_id, dealer_id],
        )?;
        if rows > 0 {
            touch(&tx, string_id, now)?;
        }
        tx.commit()?;
        Ok(rows > 0)
    }

    /// 设置组内赌台
    pub fn set_table_ids(&self, string_id: &str, table_ids: &[String], now: NaiveDateTime) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE rotation_strings SET table_ids_json = ?1, updated_at = ?2 WHERE string_id = ?3",
            params![serde_json::to_string(table_ids)?, fmt_ts(now), string_id],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "RotationString".to_string(),
                id: string_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询（含全部成员，不论是否有效）
    pub fn find_by_id(&self, string_id: &str) -> RepositoryResult<Option<RotationString>> {
        let conn = self.get_conn()?;

        let found = conn
            .query_row(
                r#"
                SELECT string_id, name, description, is_active, priority, table_ids_json, created_at, updated_at
                FROM rotation_strings WHERE string_id = ?1
                "#,
                params![string_id],
                map_string_row,
            )
            .optional()?;

        match found {
            Some((mut string, table_ids_json)) => {
                string.table_ids = serde_json::from_str(&table_ids_json)?;
                string.members = load_members(&conn, &string.string_id)?;
                Ok(Some(string))
            }
            None => Ok(None),
        }
    }

    /// 有效轮换组，按优先级升序
    pub fn list_active(&self) -> RepositoryResult<Vec<RotationString>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT string_id, name, description, is_active, priority, table_ids_json, created_at, updated_at
            FROM rotation_strings WHERE is_active = 1
            ORDER BY priority ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], map_string_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut strings = Vec::with_capacity(rows.len());
        for (mut string, table_ids_json) in rows {
            string.table_ids = serde_json::from_str(&table_ids_json)?;
            string.members = load_members(&conn, &string.string_id)?;
            strings.push(string);
        }
        Ok(strings)
    }
}

fn touch(conn: &Connection, string_id: &str, now: NaiveDateTime) -> RepositoryResult<()> {
    conn.execute(
        "UPDATE rotation_strings SET updated_at = ?1 WHERE string_id = ?2",
        params![fmt_ts(now), string_id],
    )?;
    Ok(())
}

fn load_members(conn: &Connection, string_id: &str) -> RepositoryResult<Vec<StringMember>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT dealer_id, rotation_order, is_active, assigned_at
        FROM rotation_string_members
        WHERE string_id = ?1
        ORDER BY rotation_order ASC, assigned_at ASC
        "#,
    )?;
    let members = stmt
        .query_map(params![string_id], |row| {
            let assigned: String = row.get(3)?;
            Ok(StringMember {
                dealer_id: row.get(0)?,
                rotation_order: row.get(1)?,
                is_active: row.get(2)?,
                assigned_at: parse_ts(3, &assigned)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(members)
}

fn map_string_row(row: &Row) -> SqliteResult<(RotationString, String)> {
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;

    let string = RotationString {
        string_id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        is_active: row.get(3)?,
        priority: row.get(4)?,
        members: Vec::new(),
        table_ids: Vec::new(),
        created_at: parse_ts(6, &created)?,
        updated_at: parse_ts(7, &updated)?,
    };
    Ok((string, row.get(5)?))
}
