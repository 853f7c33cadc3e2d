use super::*;

impl<S> RotationApi<S>
where
    S: RosterStore,
{
    // ==========================================
    // 排班
    // ==========================================

    /// 生成全场排班建议（不落库）
    ///
    /// OperationResult.success 与排班结果的 success 一致；失败时 payload 仍带回结果明细
    pub fn generate_schedule(
        &self,
        actor_id: &str,
        start_time: NaiveDateTime,
        push_count: u32,
    ) -> ApiResult<OperationResult<ScheduleResult>> {
        let result = settle(self.scheduler.generate_schedule(start_time, push_count), |r| {
            r.message.clone()
        })?;

        let schedule = match result.payload {
            Some(schedule) => schedule,
            None => return Ok(OperationResult::failure(result.message)),
        };

        if !schedule.success {
            return Ok(OperationResult {
                success: false,
                message: schedule.message.clone(),
                payload: Some(schedule),
            });
        }

        self.audit(
            AuditEntry::new(actor_id, ActionType::ScheduleGenerated, schedule.message.clone()).with_payload(json!({
                "start_time": start_time.to_string(),
                "push_count": push_count,
                "total_assignments": schedule.metrics.total_assignments,
                "tables_without_dealers": schedule.metrics.tables_without_dealers,
                "warnings": schedule.warnings,
            })),
        );
        Ok(OperationResult::ok(schedule.message.clone(), schedule))
    }

    /// 排班建议逐台落库
    ///
    /// 部分失败时 success 仍为 true，失败明细见 payload.failures
    pub fn apply_schedule(
        &self,
        actor_id: &str,
        proposals: &[Assignment],
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<ApplyReport>> {
        if proposals.is_empty() {
            return Ok(OperationResult::failure("No assignments to apply"));
        }

        let report = self.scheduler.apply_schedule(proposals, now);
        let message = format!(
            "Applied {} of {} assignments ({} unchanged)",
            report.applied.len(),
            proposals.len(),
            report.unchanged.len()
        );

        if !report.applied.is_empty() {
            self.audit(
                AuditEntry::new(actor_id, ActionType::ScheduleGenerated, message.clone()).with_payload(json!({
                    "applied": report.applied.iter().map(|a| a.assignment_id.clone()).collect::<Vec<_>>(),
                    "failures": report.failures,
                })),
            );
        }

        if report.applied.is_empty() && report.unchanged.is_empty() {
            return Ok(OperationResult {
                success: false,
                message,
                payload: Some(report),
            });
        }
        Ok(OperationResult::ok(message, report))
    }

    /// 单台推荐下一位荷官
    pub fn recommend_next_dealer(
        &self,
        table_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<ScoredCandidate>> {
        let result = settle(self.scheduler.recommend_next_dealer(table_id, now), |_| String::new())?;

        Ok(match result.payload {
            Some(Some(candidate)) => OperationResult::ok(
                format!("Recommended dealer {}", candidate.employee_number),
                candidate,
            ),
            Some(None) => OperationResult::failure(format!("No qualified dealer available for table {}", table_id)),
            None => OperationResult::failure(result.message),
        })
    }

    /// 批量执行到期推送
    pub fn execute_due_pushes(&self, actor_id: &str, now: NaiveDateTime) -> ApiResult<OperationResult<PushSweepReport>> {
        let result = settle(self.engine().execute_due_pushes(now), |r| {
            format!(
                "Pushed {} tables ({} failed)",
                r.pushed.len(),
                r.failures.len()
            )
        })?;

        if let Some(report) = &result.payload {
            if !report.pushed.is_empty() {
                self.audit(
                    AuditEntry::new(actor_id, ActionType::PushExecuted, result.message.clone()).with_payload(json!({
                        "tables": report.pushed,
                        "failures": report.failures,
                    })),
                );
            }
        }
        Ok(result)
    }
}
