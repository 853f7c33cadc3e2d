use super::core::Scheduler;
use crate::domain::{Dealer, DealerStatus};
use crate::engine::error::EngineResult;
use crate::repository::roster_store::RosterStore;
use chrono::{Duration, NaiveDateTime};

impl<S> Scheduler<S>
where
    S: RosterStore,
{
    /// 是否该休息：从未休息过，或距上次休息已满休息间隔
    pub fn needs_break(&self, dealer: &Dealer, now: NaiveDateTime) -> bool {
        match dealer.last_break_time {
            None => true,
            Some(last) => now - last >= Duration::minutes(self.config().break_interval_minutes),
        }
    }

    /// 在台荷官中该休息的
    pub fn dealers_due_for_break(&self, now: NaiveDateTime) -> EngineResult<Vec<Dealer>> {
        Ok(self
            .store
            .list_dealers_by_status(&[DealerStatus::Dealing])?
            .into_iter()
            .filter(|d| self.needs_break(d, now))
            .collect())
    }

    /// 是否已过用餐时限：本班次尚未用餐，且上班已满用餐时限
    ///
    /// 班次开始晚于 now 的时刻视为跨夜班，开始于前一天。
    pub fn needs_meal(&self, dealer: &Dealer, now: NaiveDateTime) -> bool {
        let mut shift_start = now.date().and_time(dealer.shift_start);
        if shift_start > now {
            shift_start -= Duration::days(1);
        }

        let meal_taken = dealer.last_meal_time.map_or(false, |t| t >= shift_start);
        !meal_taken && now - shift_start >= Duration::hours(self.config().meal_deadline_hours)
    }

    /// 在台或空闲荷官中已过用餐时限的
    pub fn dealers_due_for_meal(&self, now: NaiveDateTime) -> EngineResult<Vec<Dealer>> {
        Ok(self
            .store
            .list_dealers_by_status(&[DealerStatus::Dealing, DealerStatus::Available])?
            .into_iter()
            .filter(|d| self.needs_meal(d, now))
            .collect())
    }
}
