// ==========================================
// 变更集提交
// ==========================================
// 一个变更集 = 一个事务；任一变更失败即回滚（Transaction drop 时自动回滚）
// 冲突判定:
// - revision 不匹配 → OptimisticLockFailure
// - 结束/提升已关闭的记录 → RecordAlreadyClosed
// - 目标记录不存在 → NotFound

use super::core::SqliteRosterStore;
use crate::domain::{Assignment, BreakRecord};
use crate::repository::db_utils::fmt_ts;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::roster_store::{DealerUpdate, RosterChangeSet, RosterMutation};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

impl SqliteRosterStore {
    pub(super) fn apply_change_set(
        &self,
        conn: &mut Connection,
        change_set: &RosterChangeSet,
    ) -> RepositoryResult<()> {
        let tx = conn.transaction()?;

        for mutation in change_set.mutations() {
            apply_mutation(&tx, mutation)?;
        }

        tx.commit()?;
        debug!(mutations = change_set.mutations().len(), "变更集已提交");
        Ok(())
    }
}

fn apply_mutation(conn: &Connection, mutation: &RosterMutation) -> RepositoryResult<()> {
    match mutation {
        RosterMutation::InsertAssignment(a) => insert_assignment(conn, a),
        RosterMutation::EndAssignment {
            assignment_id,
            end_time,
        } => end_assignment(conn, assignment_id, *end_time),
        RosterMutation::PromoteAssignment {
            assignment_id,
            start_time,
        } => promote_assignment(conn, assignment_id, *start_time),
        RosterMutation::UpdateDealer(update) => update_dealer(conn, update),
        RosterMutation::TouchTable {
            table_id,
            expected_revision,
        } => touch_table(conn, table_id, *expected_revision),
        RosterMutation::InsertBreakRecord(record) => insert_break_record(conn, record),
        RosterMutation::CloseBreakRecord { break_id, end_time } => {
            close_break_record(conn, break_id, *end_time)
        }
    }
}

fn insert_assignment(conn: &Connection, a: &Assignment) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO assignments (
            assignment_id, dealer_id, table_id, start_time, end_time,
            craps_role, is_current, is_ai_generated, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            a.assignment_id,
            a.dealer_id,
            a.table_id,
            fmt_ts(a.start_time),
            a.end_time.map(fmt_ts),
            a.craps_role.to_db_str(),
            a.is_current,
            a.is_ai_generated,
            fmt_ts(a.created_at),
        ],
    )?;
    Ok(())
}

fn end_assignment(conn: &Connection, assignment_id: &str, end_time: NaiveDateTime) -> RepositoryResult<()> {
    let rows = conn.execute(
        "UPDATE assignments SET end_time = ?1, is_current = 0 WHERE assignment_id = ?2 AND end_time IS NULL",
        params![fmt_ts(end_time), assignment_id],
    )?;
    if rows == 0 {
        return Err(closed_or_missing(conn, "assignments", "assignment_id", "Assignment", assignment_id));
    }
    Ok(())
}

fn promote_assignment(
    conn: &Connection,
    assignment_id: &str,
    start_time: NaiveDateTime,
) -> RepositoryResult<()> {
    let rows = conn.execute(
        r#"
        UPDATE assignments SET is_current = 1, start_time = ?1
        WHERE assignment_id = ?2 AND end_time IS NULL AND is_current = 0
        "#,
        params![fmt_ts(start_time), assignment_id],
    )?;
    if rows == 0 {
        return Err(closed_or_missing(conn, "assignments", "assignment_id", "Assignment", assignment_id));
    }
    Ok(())
}

fn update_dealer(conn: &Connection, update: &DealerUpdate) -> RepositoryResult<()> {
    let rows = conn.execute(
        r#"
        UPDATE dealers
        SET status = ?1, last_break_time = ?2, last_meal_time = ?3,
            revision = revision + 1, updated_at = datetime('now')
        WHERE dealer_id = ?4 AND revision = ?5
        "#,
        params![
            update.status.to_db_str(),
            update.last_break_time.map(fmt_ts),
            update.last_meal_time.map(fmt_ts),
            update.dealer_id,
            update.expected_revision,
        ],
    )?;
    if rows == 0 {
        return Err(stale_or_missing(
            conn,
            "dealers",
            "dealer_id",
            "Dealer",
            &update.dealer_id,
            update.expected_revision,
        ));
    }
    Ok(())
}

fn touch_table(conn: &Connection, table_id: &str, expected_revision: i64) -> RepositoryResult<()> {
    let rows = conn.execute(
        r#"
        UPDATE casino_tables SET revision = revision + 1, updated_at = datetime('now')
        WHERE table_id = ?1 AND revision = ?2
        "#,
        params![table_id, expected_revision],
    )?;
    if rows == 0 {
        return Err(stale_or_missing(
            conn,
            "casino_tables",
            "table_id",
            "Table",
            table_id,
            expected_revision,
        ));
    }
    Ok(())
}

fn insert_break_record(conn: &Connection, r: &BreakRecord) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO break_records (
            break_id, dealer_id, break_type, start_time, end_time,
            expected_duration_minutes, is_compliant, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            r.break_id,
            r.dealer_id,
            r.break_type.to_db_str(),
            fmt_ts(r.start_time),
            r.end_time.map(fmt_ts),
            r.expected_duration_minutes,
            r.is_compliant,
            fmt_ts(r.created_at),
        ],
    )?;
    Ok(())
}

fn close_break_record(conn: &Connection, break_id: &str, end_time: NaiveDateTime) -> RepositoryResult<()> {
    let rows = conn.execute(
        "UPDATE break_records SET end_time = ?1 WHERE break_id = ?2 AND end_time IS NULL",
        params![fmt_ts(end_time), break_id],
    )?;
    if rows == 0 {
        return Err(closed_or_missing(conn, "break_records", "break_id", "BreakRecord", break_id));
    }
    Ok(())
}

// ==========================================
// 冲突分类
// ==========================================

fn row_exists(conn: &Connection, table: &str, key_column: &str, id: &str) -> RepositoryResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE {} = ?1", table, key_column);
    let found: Option<i64> = conn.query_row(&sql, params![id], |row| row.get(0)).optional()?;
    Ok(found.is_some())
}

fn closed_or_missing(
    conn: &Connection,
    table: &str,
    key_column: &str,
    entity: &str,
    id: &str,
) -> RepositoryError {
    match row_exists(conn, table, key_column, id) {
        Ok(true) => RepositoryError::RecordAlreadyClosed {
            entity: entity.to_string(),
            id: id.to_string(),
        },
        Ok(false) => RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        },
        Err(e) => e,
    }
}

fn stale_or_missing(
    conn: &Connection,
    table: &str,
    key_column: &str,
    entity: &str,
    id: &str,
    expected: i64,
) -> RepositoryError {
    match row_exists(conn, table, key_column, id) {
        Ok(true) => RepositoryError::OptimisticLockFailure {
            entity: entity.to_string(),
            id: id.to_string(),
            expected,
        },
        Ok(false) => RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        },
        Err(e) => e,
    }
}
