// ==========================================
// 名册主数据维护
// ==========================================
// 荷官/资质/赌台的录入与状态维护（管理端调用，不走变更集）

use super::core::SqliteRosterStore;
use crate::domain::{Certification, Dealer, DealerStatus, Table, TableStatus};
use crate::repository::db_utils::{fmt_date, fmt_time, fmt_ts};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};

impl SqliteRosterStore {
    /// 录入荷官（连同资质）
    pub fn insert_dealer(&self, dealer: &Dealer) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO dealers (
                dealer_id, employee_number, display_name, status, seniority_level,
                shift_start, shift_end, last_break_time, last_meal_time, preferred_pit, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                dealer.dealer_id,
                dealer.employee_number,
                dealer.display_name,
                dealer.status.to_db_str(),
                dealer.seniority_level,
                fmt_time(dealer.shift_start),
                fmt_time(dealer.shift_end),
                dealer.last_break_time.map(fmt_ts),
                dealer.last_meal_time.map(fmt_ts),
                dealer.preferred_pit,
                dealer.revision,
            ],
        )?;

        for cert in &dealer.certifications {
            insert_certification_row(&tx, cert)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// 追加资质证书
    pub fn insert_certification(&self, cert: &Certification) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_certification_row(&conn, cert)
    }

    /// 录入赌台（台号冲突 → UniqueConstraintViolation）
    pub fn insert_table(&self, table: &Table) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO casino_tables (
                table_id, table_number, game_type, status, pit, min_bet, max_bet,
                is_high_limit, required_dealer_count, push_interval_minutes, is_locked, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                table.table_id,
                table.table_number,
                table.game_type.to_db_str(),
                table.status.to_db_str(),
                table.pit,
                table.min_bet,
                table.max_bet,
                table.is_high_limit,
                table.required_dealer_count,
                table.push_interval_minutes,
                table.is_locked,
                table.revision,
            ],
        )?;
        Ok(())
    }

    /// 设置赌台状态（开台/关台），revision 递增
    pub fn set_table_status(&self, table_id: &str, status: TableStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE casino_tables SET status = ?1, revision = revision + 1, updated_at = datetime('now')
            WHERE table_id = ?2
            "#,
            params![status.to_db_str(), table_id],
        )?;
        ensure_updated(rows, "Table", table_id)
    }

    /// 人工锁定/解锁赌台（锁定后排班引擎跳过）
    pub fn set_table_locked(&self, table_id: &str, locked: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE casino_tables SET is_locked = ?1, revision = revision + 1, updated_at = datetime('now')
            WHERE table_id = ?2
            "#,
            params![locked, table_id],
        )?;
        ensure_updated(rows, "Table", table_id)
    }

    /// 上下班打卡（OffShift ↔ Available），revision 递增
    pub fn set_dealer_status(&self, dealer_id: &str, status: DealerStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE dealers SET status = ?1, revision = revision + 1, updated_at = datetime('now')
            WHERE dealer_id = ?2
            "#,
            params![status.to_db_str(), dealer_id],
        )?;
        ensure_updated(rows, "Dealer", dealer_id)
    }
}

fn insert_certification_row(conn: &Connection, cert: &Certification) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO dealer_certifications (
            certification_id, dealer_id, game_type, proficiency_level, craps_role,
            certified_date, expiration_date, is_active
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            cert.certification_id,
            cert.dealer_id,
            cert.game_type.to_db_str(),
            cert.proficiency_level.value(),
            cert.craps_role.to_db_str(),
            fmt_date(cert.certified_date),
            cert.expiration_date.map(fmt_date),
            cert.is_active,
        ],
    )?;
    Ok(())
}

fn ensure_updated(rows: usize, entity: &str, id: &str) -> RepositoryResult<()> {
    if rows == 0 {
        return Err(RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}
