use super::queries;
use crate::domain::{Assignment, BreakRecord, Dealer, DealerStatus, Table, TableStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::roster_store::{RosterChangeSet, RosterStore};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteRosterStore - 名册存储
// ==========================================
pub struct SqliteRosterStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRosterStore {
    /// 基于共享连接创建存储（schema 由 db::init_schema 负责）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl RosterStore for SqliteRosterStore {
    fn find_dealer(&self, dealer_id: &str) -> RepositoryResult<Option<Dealer>> {
        let conn = self.get_conn()?;
        queries::find_dealer(&conn, dealer_id)
    }

    fn list_dealers_by_status(&self, statuses: &[DealerStatus]) -> RepositoryResult<Vec<Dealer>> {
        let conn = self.get_conn()?;
        queries::list_dealers_by_status(&conn, statuses)
    }

    fn find_table(&self, table_id: &str) -> RepositoryResult<Option<Table>> {
        let conn = self.get_conn()?;
        queries::find_table(&conn, table_id)
    }

    fn list_tables_by_status(&self, status: TableStatus) -> RepositoryResult<Vec<Table>> {
        let conn = self.get_conn()?;
        queries::list_tables_by_status(&conn, status)
    }

    fn list_tables_by_ids(&self, table_ids: &[String]) -> RepositoryResult<Vec<Table>> {
        let conn = self.get_conn()?;
        queries::list_tables_by_ids(&conn, table_ids)
    }

    fn find_assignment(&self, assignment_id: &str) -> RepositoryResult<Option<Assignment>> {
        let conn = self.get_conn()?;
        queries::find_assignment(&conn, assignment_id)
    }

    fn find_open_assignment_for_dealer(&self, dealer_id: &str) -> RepositoryResult<Option<Assignment>> {
        let conn = self.get_conn()?;
        queries::find_open_assignment_for_dealer(&conn, dealer_id)
    }

    fn list_assignments_for_table(
        &self,
        table_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        queries::list_assignments_for_table(&conn, table_id, from, to)
    }

    fn find_open_break(&self, dealer_id: &str) -> RepositoryResult<Option<BreakRecord>> {
        let conn = self.get_conn()?;
        queries::find_open_break(&conn, dealer_id)
    }

    fn list_break_records(
        &self,
        dealer_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<BreakRecord>> {
        let conn = self.get_conn()?;
        queries::list_break_records(&conn, dealer_id, from, to)
    }

    fn commit(&self, change_set: &RosterChangeSet) -> RepositoryResult<()> {
        if change_set.is_empty() {
            return Ok(());
        }
        let mut conn = self.get_conn()?;
        self.apply_change_set(&mut conn, change_set)
    }
}
