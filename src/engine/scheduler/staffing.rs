use super::core::Scheduler;
use crate::domain::{Assignment, DealerStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rotation::AssignOptions;
use crate::engine::selector::ScoredCandidate;
use crate::repository::roster_store::RosterStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 请假处理结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallInOutcome {
    pub vacated: Option<Assignment>,     // 被腾出的派台（已结束）
    pub replacement: Option<Assignment>, // 补位派台
    pub warnings: Vec<String>,
}

impl<S> Scheduler<S>
where
    S: RosterStore,
{
    /// 为单张赌台推荐下一位荷官（候选池: 空闲 + 休息中）
    pub fn recommend_next_dealer(
        &self,
        table_id: &str,
        now: NaiveDateTime,
    ) -> EngineResult<Option<ScoredCandidate>> {
        self.recommend_excluding(table_id, None, now)
    }

    fn recommend_excluding(
        &self,
        table_id: &str,
        excluded_dealer: Option<&str>,
        now: NaiveDateTime,
    ) -> EngineResult<Option<ScoredCandidate>> {
        let table = self
            .store
            .find_table(table_id)?
            .ok_or_else(|| EngineError::not_found("Table", table_id))?;

        let pool: Vec<_> = self
            .store
            .list_dealers_by_status(&[DealerStatus::Available, DealerStatus::OnBreak])?
            .into_iter()
            .filter(|d| Some(d.dealer_id.as_str()) != excluded_dealer)
            .collect();

        Ok(self.selector.select_best_dealer(&table, &pool, now))
    }

    /// 处理请假并补位
    ///
    /// 请假本身先独立提交；补位失败只产生警告，不回滚请假。
    pub fn handle_call_in(&self, dealer_id: &str, now: NaiveDateTime) -> EngineResult<CallInOutcome> {
        let vacated = self.engine.mark_called_in(dealer_id, now)?;
        let mut outcome = CallInOutcome {
            vacated: vacated.clone(),
            ..Default::default()
        };

        let vacated = match vacated.filter(|a| a.is_current) {
            Some(a) => a,
            None => return Ok(outcome),
        };

        let candidate = match self.recommend_excluding(&vacated.table_id, Some(dealer_id), now) {
            Ok(Some(c)) => c,
            Ok(None) => {
                warn!(table_id = %vacated.table_id, "请假补位无合格荷官");
                outcome
                    .warnings
                    .push(format!("No qualified replacement for table {}", vacated.table_id));
                return Ok(outcome);
            }
            Err(e) if e.is_business_failure() => {
                outcome.warnings.push(format!("Replacement lookup failed: {}", e));
                return Ok(outcome);
            }
            Err(e) => return Err(e),
        };

        let options = AssignOptions {
            is_ai_generated: true,
            ..Default::default()
        };
        match self
            .engine
            .assign(&candidate.dealer_id, &vacated.table_id, true, options, now)
        {
            Ok(replacement) => {
                info!(
                    table_id = %vacated.table_id,
                    replacement = %candidate.employee_number,
                    score = candidate.score(),
                    "请假补位完成"
                );
                outcome.replacement = Some(replacement);
            }
            Err(e) if e.is_business_failure() => {
                warn!(table_id = %vacated.table_id, error = %e, "请假补位失败");
                outcome.warnings.push(format!(
                    "Replacement {} could not be assigned: {}",
                    candidate.employee_number, e
                ));
            }
            Err(e) => return Err(e),
        }

        Ok(outcome)
    }
}
