use super::core::RotationEngine;
use crate::domain::{Assignment, BreakRecord, BreakType, DealerStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::db_utils::to_storage_precision;
use crate::repository::roster_store::{DealerUpdate, RosterChangeSet, RosterStore};
use chrono::{Duration, NaiveDateTime};
use tracing::{info, warn};

impl<S> RotationEngine<S>
where
    S: RosterStore,
{
    // ==========================================
    // 休息 / 用餐
    // ==========================================

    /// 送荷官休息
    ///
    /// - 结束其在台派台（若有）
    /// - 记录 last_break_time（用餐时同时记录 last_meal_time）
    /// - 新建休息记录；距上次休息不超过休息间隔视为合规，首次休息合规
    pub fn send_to_break(
        &self,
        dealer_id: &str,
        break_type: BreakType,
        duration_minutes: i64,
        now: NaiveDateTime,
    ) -> EngineResult<BreakRecord> {
        let now = to_storage_precision(now);
        let dealer = self.load_dealer(dealer_id)?;

        if dealer.status.is_terminal() {
            return Err(EngineError::precondition(format!(
                "荷官 {} 当前状态为 {}，不可安排休息",
                dealer.employee_number, dealer.status
            )));
        }
        if self.store.find_open_break(dealer_id)?.is_some() {
            return Err(EngineError::precondition(format!(
                "荷官 {} 已在休息中",
                dealer.employee_number
            )));
        }

        let is_compliant = match dealer.last_break_time {
            Some(last) => now - last <= Duration::minutes(self.config.break_interval_minutes),
            None => true,
        };

        let mut set = RosterChangeSet::new();
        if let Some(open) = self.store.find_open_assignment_for_dealer(dealer_id)? {
            if open.is_current {
                self.end_engagement(&mut set, &open, now)?;
            }
        }

        let record = BreakRecord::open(dealer_id, break_type, now, duration_minutes, is_compliant);
        set.insert_break_record(record.clone());

        let mut update = DealerUpdate::from_dealer(
            &dealer,
            DealerStatus::project(Some(dealer.status), false, Some(break_type)),
        );
        update.last_break_time = Some(now);
        if break_type == BreakType::Meal {
            update.last_meal_time = Some(now);
        }
        set.update_dealer(update);

        self.store.commit(&set)?;

        if !is_compliant {
            warn!(
                dealer = %dealer.employee_number,
                break_interval_minutes = self.config.break_interval_minutes,
                "休息安排超出标准间隔"
            );
        }
        info!(
            dealer = %dealer.employee_number,
            break_type = %break_type,
            duration_minutes = duration_minutes,
            "荷官开始休息"
        );
        Ok(record)
    }

    /// 荷官返岗
    ///
    /// # 返回
    /// - `Ok(false)`: 没有未结束的休息记录（不做任何修改）
    pub fn return_from_break(&self, dealer_id: &str, now: NaiveDateTime) -> EngineResult<bool> {
        let now = to_storage_precision(now);
        let dealer = self.load_dealer(dealer_id)?;

        let open_break = match self.store.find_open_break(dealer_id)? {
            Some(b) => b,
            None => return Ok(false),
        };

        let has_current = self
            .store
            .find_open_assignment_for_dealer(dealer_id)?
            .map_or(false, |a| a.is_current);

        let mut set = RosterChangeSet::new();
        set.close_break_record(&open_break.break_id, now).update_dealer(DealerUpdate::from_dealer(
            &dealer,
            DealerStatus::project(Some(dealer.status), has_current, None),
        ));

        self.store.commit(&set)?;

        info!(dealer = %dealer.employee_number, "荷官返岗");
        Ok(true)
    }

    // ==========================================
    // 请假 / 提前下班
    // ==========================================

    /// 提前下班：荷官 → SentHome，结束其未结束派台与休息
    ///
    /// # 返回
    /// 被腾出的派台（若有）
    pub fn send_home(&self, dealer_id: &str, now: NaiveDateTime) -> EngineResult<Option<Assignment>> {
        self.release_for_shift(dealer_id, DealerStatus::SentHome, now)
    }

    /// 请假：荷官 → CalledIn，结束其未结束派台与休息
    ///
    /// 补位由调用方（排班器）负责。返回的派台保留原 is_current，用于判断是否腾出了在台位置。
    pub fn mark_called_in(&self, dealer_id: &str, now: NaiveDateTime) -> EngineResult<Option<Assignment>> {
        self.release_for_shift(dealer_id, DealerStatus::CalledIn, now)
    }

    fn release_for_shift(
        &self,
        dealer_id: &str,
        terminal: DealerStatus,
        now: NaiveDateTime,
    ) -> EngineResult<Option<Assignment>> {
        let now = to_storage_precision(now);
        let dealer = self.load_dealer(dealer_id)?;

        if dealer.status.is_terminal() {
            return Err(EngineError::precondition(format!(
                "荷官 {} 当前状态已为 {}",
                dealer.employee_number, dealer.status
            )));
        }

        let mut set = RosterChangeSet::new();

        let vacated = self.store.find_open_assignment_for_dealer(dealer_id)?;
        if let Some(open) = &vacated {
            self.end_engagement(&mut set, open, now)?;
        }
        if let Some(open_break) = self.store.find_open_break(dealer_id)? {
            set.close_break_record(&open_break.break_id, now);
        }
        set.update_dealer(DealerUpdate::from_dealer(&dealer, terminal));

        self.store.commit(&set)?;

        info!(
            dealer = %dealer.employee_number,
            status = %terminal,
            vacated_table = ?vacated.as_ref().map(|a| a.table_id.as_str()),
            "荷官离岗"
        );

        Ok(vacated.map(|mut a| {
            a.end_time = Some(now);
            a
        }))
    }
}
