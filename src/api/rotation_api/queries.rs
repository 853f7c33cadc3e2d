use super::*;

impl<S> RotationApi<S>
where
    S: RosterStore,
{
    // ==========================================
    // 查询（不写审计）
    // ==========================================

    pub fn current_assignment(&self, dealer_id: &str) -> ApiResult<Option<Assignment>> {
        Ok(self.engine().current_assignment(dealer_id)?)
    }

    pub fn dealers_on_break(&self) -> ApiResult<Vec<Dealer>> {
        Ok(self.engine().dealers_on_break()?)
    }

    pub fn tables_due_for_push(&self, now: NaiveDateTime) -> ApiResult<Vec<Table>> {
        Ok(self.engine().tables_due_for_push(now)?)
    }

    pub fn dealers_due_for_break(&self, now: NaiveDateTime) -> ApiResult<Vec<Dealer>> {
        Ok(self.scheduler.dealers_due_for_break(now)?)
    }

    pub fn dealers_due_for_meal(&self, now: NaiveDateTime) -> ApiResult<Vec<Dealer>> {
        Ok(self.scheduler.dealers_due_for_meal(now)?)
    }
}
