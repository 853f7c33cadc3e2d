use super::core::RotationEngine;
use crate::domain::{Assignment, Dealer, DealerStatus, Table, TableStatus};
use crate::engine::error::EngineResult;
use crate::repository::roster_store::RosterStore;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 批量推送结果（逐台独立，互不影响）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushSweepReport {
    pub pushed: Vec<String>,             // 已推送的台号
    pub skipped: Vec<String>,            // 到期但推送时条件已不满足
    pub failures: Vec<(String, String)>, // (台号, 原因)
}

impl<S> RotationEngine<S>
where
    S: RosterStore,
{
    /// 荷官当前在台派台
    pub fn current_assignment(&self, dealer_id: &str) -> EngineResult<Option<Assignment>> {
        Ok(self
            .store
            .find_open_assignment_for_dealer(dealer_id)?
            .filter(|a| a.is_current))
    }

    /// 荷官已在该台发牌时返回其在台派台
    pub fn seated_at(&self, dealer_id: &str, table_id: &str) -> EngineResult<Option<Assignment>> {
        Ok(self.current_assignment(dealer_id)?.filter(|a| a.table_id == table_id))
    }

    /// 休息/用餐中的荷官
    pub fn dealers_on_break(&self) -> EngineResult<Vec<Dealer>> {
        Ok(self
            .store
            .list_dealers_by_status(&[DealerStatus::OnBreak, DealerStatus::OnMeal])?)
    }

    /// 到期待推送的赌台
    ///
    /// 条件: 开台中；现任已满推送间隔；已有下一位
    pub fn tables_due_for_push(&self, now: NaiveDateTime) -> EngineResult<Vec<Table>> {
        let tables = self.store.list_tables_by_status(TableStatus::Open)?;

        Ok(tables
            .into_iter()
            .filter(|t| {
                let current_due = t
                    .active_current_assignment()
                    .map_or(false, |c| now - c.start_time >= Duration::minutes(t.push_interval_minutes));
                current_due && t.pending_next_assignment().is_some()
            })
            .collect())
    }

    /// 批量执行到期推送（单台失败不影响其他台）
    pub fn execute_due_pushes(&self, now: NaiveDateTime) -> EngineResult<PushSweepReport> {
        let due = self.tables_due_for_push(now)?;
        let mut report = PushSweepReport::default();

        for table in due {
            match self.execute_push(&table.table_id, now) {
                Ok(true) => report.pushed.push(table.table_number),
                Ok(false) => report.skipped.push(table.table_number),
                Err(e) => {
                    warn!(table_number = %table.table_number, error = %e, "到期推送失败");
                    report.failures.push((table.table_number, e.to_string()));
                }
            }
        }

        info!(
            pushed = report.pushed.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "到期推送扫描完成"
        );
        Ok(report)
    }
}
