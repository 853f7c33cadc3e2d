// ==========================================
// 名册查询与行映射
// ==========================================
// 以 &Connection 为入参，事务 (Transaction) 内同样可用

use crate::domain::{
    Assignment, BreakRecord, BreakType, Certification, CrapsRole, Dealer, DealerStatus, GameType,
    HistoricalAssignment, ProficiencyLevel, Table, TableStatus,
};
use crate::repository::db_utils::{
    build_in_clause, fmt_ts, parse_date, parse_opt_ts, parse_time, parse_ts,
};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};

const DEALER_COLUMNS: &str = r#"
    dealer_id, employee_number, display_name, status, seniority_level,
    shift_start, shift_end, last_break_time, last_meal_time, preferred_pit, revision
"#;

const TABLE_COLUMNS: &str = r#"
    table_id, table_number, game_type, status, pit, min_bet, max_bet,
    is_high_limit, required_dealer_count, push_interval_minutes, is_locked, revision
"#;

pub(super) const ASSIGNMENT_COLUMNS: &str = r#"
    assignment_id, dealer_id, table_id, start_time, end_time,
    craps_role, is_current, is_ai_generated, created_at
"#;

const BREAK_COLUMNS: &str = r#"
    break_id, dealer_id, break_type, start_time, end_time,
    expected_duration_minutes, is_compliant, created_at
"#;

// ==========================================
// 荷官
// ==========================================

pub(super) fn find_dealer(conn: &Connection, dealer_id: &str) -> RepositoryResult<Option<Dealer>> {
    let sql = format!("SELECT {} FROM dealers WHERE dealer_id = ?1", DEALER_COLUMNS);
    let dealer = conn
        .query_row(&sql, params![dealer_id], map_dealer_row)
        .optional()?;

    match dealer {
        Some(mut d) => {
            hydrate_dealer(conn, &mut d)?;
            Ok(Some(d))
        }
        None => Ok(None),
    }
}

pub(super) fn list_dealers_by_status(
    conn: &Connection,
    statuses: &[DealerStatus],
) -> RepositoryResult<Vec<Dealer>> {
    let status_strs: Vec<&str> = statuses.iter().map(|s| s.to_db_str()).collect();
    let sql = format!(
        "SELECT {} FROM dealers WHERE {} ORDER BY employee_number",
        DEALER_COLUMNS,
        build_in_clause("status", &status_strs)
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut dealers = stmt
        .query_map(params_from_iter(status_strs.iter()), map_dealer_row)?
        .collect::<SqliteResult<Vec<_>>>()?;

    for dealer in dealers.iter_mut() {
        hydrate_dealer(conn, dealer)?;
    }
    Ok(dealers)
}

/// 加载资质与历史派台
fn hydrate_dealer(conn: &Connection, dealer: &mut Dealer) -> RepositoryResult<()> {
    let mut stmt = conn.prepare(
        r#"
        SELECT certification_id, dealer_id, game_type, proficiency_level, craps_role,
               certified_date, expiration_date, is_active
        FROM dealer_certifications
        WHERE dealer_id = ?1
        ORDER BY certified_date
        "#,
    )?;
    dealer.certifications = stmt
        .query_map(params![dealer.dealer_id], map_certification_row)?
        .collect::<SqliteResult<Vec<_>>>()?;

    // 历史派台：排除尚未开始的待上台记录
    let mut stmt = conn.prepare(
        r#"
        SELECT a.assignment_id, a.table_id, t.game_type, t.pit, a.start_time, a.end_time
        FROM assignments a
        JOIN casino_tables t ON t.table_id = a.table_id
        WHERE a.dealer_id = ?1
          AND NOT (a.is_current = 0 AND a.end_time IS NULL)
        ORDER BY a.start_time ASC
        "#,
    )?;
    dealer.assignment_history = stmt
        .query_map(params![dealer.dealer_id], |row| {
            let start_str: String = row.get(4)?;
            Ok(HistoricalAssignment {
                assignment_id: row.get(0)?,
                table_id: row.get(1)?,
                game_type: GameType::from_str(&row.get::<_, String>(2)?),
                pit: row.get(3)?,
                start_time: parse_ts(4, &start_str)?,
                end_time: parse_opt_ts(5, row.get(5)?)?,
            })
        })?
        .collect::<SqliteResult<Vec<_>>>()?;

    Ok(())
}

fn map_dealer_row(row: &Row) -> SqliteResult<Dealer> {
    let shift_start: String = row.get(5)?;
    let shift_end: String = row.get(6)?;

    Ok(Dealer {
        dealer_id: row.get(0)?,
        employee_number: row.get(1)?,
        display_name: row.get(2)?,
        status: DealerStatus::from_str(&row.get::<_, String>(3)?),
        seniority_level: row.get(4)?,
        shift_start: parse_time(5, &shift_start)?,
        shift_end: parse_time(6, &shift_end)?,
        last_break_time: parse_opt_ts(7, row.get(7)?)?,
        last_meal_time: parse_opt_ts(8, row.get(8)?)?,
        preferred_pit: row.get(9)?,
        certifications: Vec::new(),
        assignment_history: Vec::new(),
        revision: row.get(10)?,
    })
}

fn map_certification_row(row: &Row) -> SqliteResult<Certification> {
    let certified: String = row.get(5)?;
    let expiration: Option<String> = row.get(6)?;

    Ok(Certification {
        certification_id: row.get(0)?,
        dealer_id: row.get(1)?,
        game_type: GameType::from_str(&row.get::<_, String>(2)?),
        proficiency_level: ProficiencyLevel::from_value(row.get(3)?),
        craps_role: CrapsRole::from_str(&row.get::<_, String>(4)?),
        certified_date: parse_date(5, &certified)?,
        expiration_date: expiration.map(|s| parse_date(6, &s)).transpose()?,
        is_active: row.get(7)?,
    })
}

// ==========================================
// 赌台
// ==========================================

pub(super) fn find_table(conn: &Connection, table_id: &str) -> RepositoryResult<Option<Table>> {
    let sql = format!("SELECT {} FROM casino_tables WHERE table_id = ?1", TABLE_COLUMNS);
    let table = conn
        .query_row(&sql, params![table_id], map_table_row)
        .optional()?;

    match table {
        Some(mut t) => {
            hydrate_table(conn, &mut t)?;
            Ok(Some(t))
        }
        None => Ok(None),
    }
}

pub(super) fn list_tables_by_status(
    conn: &Connection,
    status: TableStatus,
) -> RepositoryResult<Vec<Table>> {
    let sql = format!(
        "SELECT {} FROM casino_tables WHERE status = ?1 ORDER BY table_number",
        TABLE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut tables = stmt
        .query_map(params![status.to_db_str()], map_table_row)?
        .collect::<SqliteResult<Vec<_>>>()?;

    for table in tables.iter_mut() {
        hydrate_table(conn, table)?;
    }
    Ok(tables)
}

pub(super) fn list_tables_by_ids(conn: &Connection, table_ids: &[String]) -> RepositoryResult<Vec<Table>> {
    let sql = format!(
        "SELECT {} FROM casino_tables WHERE {} ORDER BY table_number",
        TABLE_COLUMNS,
        build_in_clause("table_id", table_ids)
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut tables = stmt
        .query_map(params_from_iter(table_ids.iter()), map_table_row)?
        .collect::<SqliteResult<Vec<_>>>()?;

    for table in tables.iter_mut() {
        hydrate_table(conn, table)?;
    }
    Ok(tables)
}

/// 加载未结束的当前/待上台派台
fn hydrate_table(conn: &Connection, table: &mut Table) -> RepositoryResult<()> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE table_id = ?1 AND end_time IS NULL ORDER BY start_time ASC",
        ASSIGNMENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let open = stmt
        .query_map(params![table.table_id], map_assignment_row)?
        .collect::<SqliteResult<Vec<_>>>()?;

    let (current, next): (Vec<Assignment>, Vec<Assignment>) =
        open.into_iter().partition(|a| a.is_current);
    table.current_assignments = current;
    table.next_assignments = next;
    Ok(())
}

fn map_table_row(row: &Row) -> SqliteResult<Table> {
    Ok(Table {
        table_id: row.get(0)?,
        table_number: row.get(1)?,
        game_type: GameType::from_str(&row.get::<_, String>(2)?),
        status: TableStatus::from_str(&row.get::<_, String>(3)?),
        pit: row.get(4)?,
        min_bet: row.get(5)?,
        max_bet: row.get(6)?,
        is_high_limit: row.get(7)?,
        required_dealer_count: row.get(8)?,
        push_interval_minutes: row.get(9)?,
        current_assignments: Vec::new(),
        next_assignments: Vec::new(),
        is_locked: row.get(10)?,
        revision: row.get(11)?,
    })
}

// ==========================================
// 派台
// ==========================================

pub(super) fn find_assignment(conn: &Connection, assignment_id: &str) -> RepositoryResult<Option<Assignment>> {
    let sql = format!("SELECT {} FROM assignments WHERE assignment_id = ?1", ASSIGNMENT_COLUMNS);
    let assignment = conn
        .query_row(&sql, params![assignment_id], map_assignment_row)
        .optional()?;
    Ok(assignment)
}

pub(super) fn find_open_assignment_for_dealer(
    conn: &Connection,
    dealer_id: &str,
) -> RepositoryResult<Option<Assignment>> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE dealer_id = ?1 AND end_time IS NULL ORDER BY start_time DESC LIMIT 1",
        ASSIGNMENT_COLUMNS
    );
    let assignment = conn
        .query_row(&sql, params![dealer_id], map_assignment_row)
        .optional()?;
    Ok(assignment)
}

pub(super) fn list_assignments_for_table(
    conn: &Connection,
    table_id: &str,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> RepositoryResult<Vec<Assignment>> {
    let sql = format!(
        "SELECT {} FROM assignments WHERE table_id = ?1 AND start_time BETWEEN ?2 AND ?3 ORDER BY start_time ASC",
        ASSIGNMENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let assignments = stmt
        .query_map(params![table_id, fmt_ts(from), fmt_ts(to)], map_assignment_row)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(assignments)
}

pub(super) fn map_assignment_row(row: &Row) -> SqliteResult<Assignment> {
    let start: String = row.get(3)?;
    let created: String = row.get(8)?;

    Ok(Assignment {
        assignment_id: row.get(0)?,
        dealer_id: row.get(1)?,
        table_id: row.get(2)?,
        start_time: parse_ts(3, &start)?,
        end_time: parse_opt_ts(4, row.get(4)?)?,
        craps_role: CrapsRole::from_str(&row.get::<_, String>(5)?),
        is_current: row.get(6)?,
        is_ai_generated: row.get(7)?,
        created_at: parse_ts(8, &created)?,
    })
}

// ==========================================
// 休息记录
// ==========================================

pub(super) fn find_open_break(conn: &Connection, dealer_id: &str) -> RepositoryResult<Option<BreakRecord>> {
    let sql = format!(
        "SELECT {} FROM break_records WHERE dealer_id = ?1 AND end_time IS NULL ORDER BY start_time DESC LIMIT 1",
        BREAK_COLUMNS
    );
    let record = conn
        .query_row(&sql, params![dealer_id], map_break_row)
        .optional()?;
    Ok(record)
}

pub(super) fn list_break_records(
    conn: &Connection,
    dealer_id: &str,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> RepositoryResult<Vec<BreakRecord>> {
    let sql = format!(
        "SELECT {} FROM break_records WHERE dealer_id = ?1 AND start_time BETWEEN ?2 AND ?3 ORDER BY start_time ASC",
        BREAK_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params![dealer_id, fmt_ts(from), fmt_ts(to)], map_break_row)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(records)
}

fn map_break_row(row: &Row) -> SqliteResult<BreakRecord> {
    let start: String = row.get(3)?;
    let created: String = row.get(7)?;

    Ok(BreakRecord {
        break_id: row.get(0)?,
        dealer_id: row.get(1)?,
        break_type: BreakType::from_str(&row.get::<_, String>(2)?),
        start_time: parse_ts(3, &start)?,
        end_time: parse_opt_ts(4, row.get(4)?)?,
        expected_duration_minutes: row.get(5)?,
        is_compliant: row.get(6)?,
        created_at: parse_ts(7, &created)?,
    })
}
