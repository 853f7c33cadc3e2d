use crate::config::RotationConfig;
use crate::domain::{Assignment, DealerStatus, Table, TableStatus};
use crate::engine::error::EngineResult;
use crate::engine::matching::match_tables;
use crate::engine::rotation::{AssignOptions, RotationEngine};
use crate::engine::selector::DealerSelector;
use crate::repository::db_utils::to_storage_precision;
use crate::repository::roster_store::RosterStore;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// ScheduleResult - 排班结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub success: bool,
    pub message: String,
    pub assignments: Vec<Assignment>, // 建议派台（未落库）
    pub warnings: Vec<String>,
    pub metrics: ScheduleMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleMetrics {
    pub total_assignments: usize,
    pub tables_without_dealers: usize,
    pub unused_dealers: usize,
    pub push_count: u32,
    pub horizon_end: Option<NaiveDateTime>,
}

impl ScheduleResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            assignments: Vec::new(),
            warnings: Vec::new(),
            metrics: ScheduleMetrics::default(),
        }
    }
}

/// 排班落库结果（逐台独立）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    pub applied: Vec<Assignment>,
    pub unchanged: Vec<Assignment>, // 荷官已在建议赌台发牌，保持原派台
    pub failures: Vec<(String, String)>, // (table_id, 原因)
}

// ==========================================
// Scheduler - 排班器
// ==========================================
pub struct Scheduler<S>
where
    S: RosterStore,
{
    pub(super) store: Arc<S>,
    pub(super) engine: RotationEngine<S>,
    pub(super) selector: DealerSelector,
}

impl<S> Scheduler<S>
where
    S: RosterStore,
{
    pub fn new(store: Arc<S>, config: RotationConfig) -> Self {
        Self {
            selector: DealerSelector::new(config.weights.clone()),
            engine: RotationEngine::new(store.clone(), config),
            store,
        }
    }

    pub fn engine(&self) -> &RotationEngine<S> {
        &self.engine
    }

    pub fn config(&self) -> &RotationConfig {
        self.engine.config()
    }

    /// 生成全场排班建议（不落库）
    ///
    /// # 参数
    /// - start_time: 排班起点，建议派台均以此为开始时间
    /// - push_count: 规划的推送轮数，仅用于计算规划终点
    pub fn generate_schedule(&self, start_time: NaiveDateTime, push_count: u32) -> EngineResult<ScheduleResult> {
        let start_time = to_storage_precision(start_time);
        let tables = self.store.list_tables_by_status(TableStatus::Open)?;
        if tables.is_empty() {
            return Ok(ScheduleResult::failure("No open tables found"));
        }

        let pool = self
            .store
            .list_dealers_by_status(&[DealerStatus::Available, DealerStatus::Dealing])?;
        if pool.is_empty() {
            return Ok(ScheduleResult::failure("No available dealers found"));
        }

        info!(
            tables = tables.len(),
            dealers = pool.len(),
            strategy = %self.config().matching_strategy,
            "开始生成排班"
        );

        let mut warnings = Vec::new();
        let (staffable, locked): (Vec<Table>, Vec<Table>) = tables.iter().cloned().partition(|t| !t.is_locked);
        for table in &locked {
            warnings.push(format!("Table {} is locked, skipped", table.table_number));
        }

        let matches = match_tables(
            self.config().matching_strategy,
            &self.selector,
            &staffable,
            &pool,
            start_time,
        );

        let mut assignments = Vec::new();
        for (table, pick) in staffable.iter().zip(matches) {
            match pick {
                Some(candidate) => {
                    assignments.push(Assignment::new(
                        &candidate.dealer_id,
                        &table.table_id,
                        start_time,
                        true,
                        true,
                        start_time,
                    ));
                }
                None => {
                    warnings.push(format!(
                        "Could not find qualified dealer for table {}",
                        table.table_number
                    ));
                }
            }
        }

        let longest_push = tables.iter().map(|t| t.push_interval_minutes).max().unwrap_or(0);
        let metrics = ScheduleMetrics {
            total_assignments: assignments.len(),
            tables_without_dealers: tables.len() - assignments.len(),
            unused_dealers: pool.len() - assignments.len(),
            push_count,
            horizon_end: Some(start_time + Duration::minutes(longest_push * i64::from(push_count))),
        };

        if !warnings.is_empty() {
            warn!(warnings = warnings.len(), "排班存在未覆盖的赌台");
        }
        info!(
            assignments = metrics.total_assignments,
            tables_without_dealers = metrics.tables_without_dealers,
            unused_dealers = metrics.unused_dealers,
            "排班生成完成"
        );

        Ok(ScheduleResult {
            success: true,
            message: format!(
                "Successfully generated schedule with {} assignments",
                assignments.len()
            ),
            assignments,
            warnings,
            metrics,
        })
    }

    /// 将排班建议逐台落库（单台失败不影响其他台）
    pub fn apply_schedule(&self, proposals: &[Assignment], now: NaiveDateTime) -> ApplyReport {
        let mut report = ApplyReport::default();

        for proposal in proposals {
            if proposal.is_current {
                match self.engine.seated_at(&proposal.dealer_id, &proposal.table_id) {
                    Ok(Some(existing)) => {
                        report.unchanged.push(existing);
                        continue;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(table_id = %proposal.table_id, dealer_id = %proposal.dealer_id, error = %e, "排班落库失败");
                        report.failures.push((proposal.table_id.clone(), e.to_string()));
                        continue;
                    }
                }
            }

            let options = AssignOptions {
                start_time: Some(proposal.start_time),
                craps_role: proposal.craps_role,
                is_ai_generated: proposal.is_ai_generated,
            };
            match self
                .engine
                .assign(&proposal.dealer_id, &proposal.table_id, proposal.is_current, options, now)
            {
                Ok(assignment) => report.applied.push(assignment),
                Err(e) => {
                    warn!(table_id = %proposal.table_id, dealer_id = %proposal.dealer_id, error = %e, "排班落库失败");
                    report.failures.push((proposal.table_id.clone(), e.to_string()));
                }
            }
        }

        info!(
            applied = report.applied.len(),
            unchanged = report.unchanged.len(),
            failed = report.failures.len(),
            "排班落库完成"
        );
        report
    }
}
