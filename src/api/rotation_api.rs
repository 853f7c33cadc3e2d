// ==========================================
// 赌台荷官轮换系统 - 轮换 API
// ==========================================
// 职责: 派台/推送/撤台/休息/请假/下班、排班生成与落库、到期查询
// 约定:
// - 业务失败 → OperationResult { success: false }
// - 存储故障 → Err(ApiError)
// - 每个成功的状态变更写一条审计日志（失败只告警）
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::api::result::{audit, settle, OperationResult};
use crate::config::RotationConfig;
use crate::domain::{ActionType, Assignment, AuditEntry, BreakRecord, BreakType, Dealer, Table};
use crate::engine::{
    ApplyReport, AssignOptions, CallInOutcome, PushSweepReport, RotationEngine, ScheduleResult,
    Scheduler, ScoredCandidate,
};
use crate::repository::{AuditSink, RosterStore};

mod operations;
mod queries;
mod scheduling;

// ==========================================
// RotationApi - 轮换 API
// ==========================================
pub struct RotationApi<S>
where
    S: RosterStore,
{
    scheduler: Scheduler<S>,
    audit_sink: Arc<dyn AuditSink>,
}

impl<S> RotationApi<S>
where
    S: RosterStore,
{
    pub fn new(store: Arc<S>, config: RotationConfig, audit_sink: Arc<dyn AuditSink>) -> Self {
        Self {
            scheduler: Scheduler::new(store, config),
            audit_sink,
        }
    }

    fn engine(&self) -> &RotationEngine<S> {
        self.scheduler.engine()
    }

    fn audit(&self, entry: AuditEntry) {
        audit(self.audit_sink.as_ref(), entry);
    }
}
