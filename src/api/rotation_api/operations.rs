use super::*;

impl<S> RotationApi<S>
where
    S: RosterStore,
{
    // ==========================================
    // 派台 / 推送 / 撤台
    // ==========================================

    /// 派台
    ///
    /// # 参数
    /// - actor_id: 操作人
    /// - is_current: true=立即上台, false=排为下一位
    pub fn assign_dealer(
        &self,
        actor_id: &str,
        dealer_id: &str,
        table_id: &str,
        is_current: bool,
        options: AssignOptions,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<Assignment>> {
        let result = settle(
            self.engine().assign(dealer_id, table_id, is_current, options, now),
            |_| "Dealer assigned".to_string(),
        )?;

        if let Some(a) = &result.payload {
            self.audit(
                AuditEntry::new(
                    actor_id,
                    ActionType::DealerAssigned,
                    format!(
                        "Assigned dealer {} to table {} ({})",
                        a.dealer_id,
                        a.table_id,
                        if a.is_current { "current" } else { "next" }
                    ),
                )
                .related(&a.assignment_id, "Assignment")
                .with_payload(json!({
                    "dealer_id": a.dealer_id,
                    "table_id": a.table_id,
                    "is_current": a.is_current,
                    "is_ai_generated": a.is_ai_generated,
                })),
            );
        }
        Ok(result)
    }

    /// 执行推送
    ///
    /// 缺少现任或下一位（或赌台不存在）→ 失败结果
    pub fn execute_push(&self, actor_id: &str, table_id: &str, now: NaiveDateTime) -> ApiResult<OperationResult<()>> {
        let pushed = settle(self.engine().execute_push(table_id, now), |_| String::new())?;

        match pushed.payload {
            Some(true) => {
                self.audit(
                    AuditEntry::new(actor_id, ActionType::PushExecuted, format!("Push executed on table {}", table_id))
                        .related(table_id, "Table"),
                );
                Ok(OperationResult::ok("Push executed", ()))
            }
            Some(false) => Ok(OperationResult::failure(format!(
                "Table {} has no current and pending next dealer to push",
                table_id
            ))),
            None => Ok(OperationResult::failure(pushed.message)),
        }
    }

    /// 结束一条派台
    pub fn remove_dealer(
        &self,
        actor_id: &str,
        assignment_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<Assignment>> {
        let result = settle(self.engine().remove_dealer(assignment_id, now), |_| {
            "Dealer removed".to_string()
        })?;

        if let Some(a) = &result.payload {
            self.audit(
                AuditEntry::new(
                    actor_id,
                    ActionType::DealerRemoved,
                    format!("Removed dealer {} from table {}", a.dealer_id, a.table_id),
                )
                .related(&a.assignment_id, "Assignment"),
            );
        }
        Ok(result)
    }

    // ==========================================
    // 休息 / 返岗 / 下班 / 请假
    // ==========================================

    pub fn send_to_break(
        &self,
        actor_id: &str,
        dealer_id: &str,
        break_type: BreakType,
        duration_minutes: i64,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<BreakRecord>> {
        if duration_minutes <= 0 {
            return Ok(OperationResult::failure("Break duration must be positive"));
        }

        let result = settle(
            self.engine().send_to_break(dealer_id, break_type, duration_minutes, now),
            |r| {
                if r.is_compliant {
                    format!("Dealer sent to {}", break_type)
                } else {
                    format!("Dealer sent to {} (outside break interval)", break_type)
                }
            },
        )?;

        if let Some(r) = &result.payload {
            self.audit(
                AuditEntry::new(
                    actor_id,
                    ActionType::DealerSentToBreak,
                    format!("Sent dealer {} to {} for {} minutes", dealer_id, break_type, duration_minutes),
                )
                .related(dealer_id, "Dealer")
                .with_payload(json!({
                    "break_id": r.break_id,
                    "break_type": r.break_type,
                    "is_compliant": r.is_compliant,
                })),
            );
        }
        Ok(result)
    }

    /// 返岗；没有未结束的休息时返回成功且 payload=false
    pub fn return_from_break(
        &self,
        actor_id: &str,
        dealer_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<bool>> {
        let result = settle(self.engine().return_from_break(dealer_id, now), |returned| {
            if *returned {
                "Dealer returned from break".to_string()
            } else {
                "Dealer has no open break".to_string()
            }
        })?;

        if result.payload == Some(true) {
            self.audit(
                AuditEntry::new(
                    actor_id,
                    ActionType::DealerReturnedFromBreak,
                    format!("Dealer {} returned from break", dealer_id),
                )
                .related(dealer_id, "Dealer"),
            );
        }
        Ok(result)
    }

    pub fn send_home(
        &self,
        actor_id: &str,
        dealer_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<Option<Assignment>>> {
        let result = settle(self.engine().send_home(dealer_id, now), |_| "Dealer sent home".to_string())?;

        if let Some(vacated) = &result.payload {
            self.audit(
                AuditEntry::new(actor_id, ActionType::DealerSentHome, format!("Sent dealer {} home", dealer_id))
                    .related(dealer_id, "Dealer")
                    .with_payload(json!({
                        "vacated_table_id": vacated.as_ref().map(|a| a.table_id.clone()),
                    })),
            );
        }
        Ok(result)
    }

    /// 请假并自动补位
    pub fn handle_call_in(
        &self,
        actor_id: &str,
        dealer_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<CallInOutcome>> {
        let result = settle(self.scheduler.handle_call_in(dealer_id, now), |outcome| {
            match (&outcome.vacated, &outcome.replacement) {
                (_, Some(r)) => format!("Call-in handled, table {} reassigned to {}", r.table_id, r.dealer_id),
                (Some(v), None) if v.is_current => format!("Call-in handled, table {} left unstaffed", v.table_id),
                _ => "Call-in handled".to_string(),
            }
        })?;

        if let Some(outcome) = &result.payload {
            self.audit(
                AuditEntry::new(actor_id, ActionType::DealerCalledIn, format!("Dealer {} called in", dealer_id))
                    .related(dealer_id, "Dealer")
                    .with_payload(json!({
                        "vacated_table_id": outcome.vacated.as_ref().map(|a| a.table_id.clone()),
                        "replacement_dealer_id": outcome.replacement.as_ref().map(|a| a.dealer_id.clone()),
                        "warnings": outcome.warnings,
                    })),
            );
            if let Some(r) = &outcome.replacement {
                self.audit(
                    AuditEntry::new(
                        actor_id,
                        ActionType::DealerAssigned,
                        format!("Assigned replacement dealer {} to table {}", r.dealer_id, r.table_id),
                    )
                    .related(&r.assignment_id, "Assignment")
                    .with_payload(json!({ "is_ai_generated": r.is_ai_generated })),
                );
            }
        }
        Ok(result)
    }
}
