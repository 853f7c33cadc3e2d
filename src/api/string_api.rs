// ==========================================
// 赌台荷官轮换系统 - 轮换组 API
// ==========================================
// 职责: 轮换组管理 + 轮换组整体轮换
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::json;

use crate::api::error::ApiResult;
use crate::api::result::{audit, settle, OperationResult};
use crate::config::RotationConfig;
use crate::domain::{ActionType, AuditEntry, Dealer, RotationString};
use crate::engine::{StringRotationResult, StringRotationService};
use crate::repository::{AuditSink, RosterStore, RotationStringRepository};

pub struct StringApi<S>
where
    S: RosterStore,
{
    service: StringRotationService<S>,
    audit_sink: Arc<dyn AuditSink>,
}

impl<S> StringApi<S>
where
    S: RosterStore,
{
    pub fn new(
        strings: Arc<RotationStringRepository>,
        store: Arc<S>,
        config: RotationConfig,
        audit_sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            service: StringRotationService::new(strings, store, config),
            audit_sink,
        }
    }

    /// 执行轮换组轮换
    pub fn execute_string_rotation(
        &self,
        actor_id: &str,
        string_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<StringRotationResult>> {
        let result = settle(self.service.execute_string_rotation(string_id, now), |r| {
            r.message.clone()
        })?;

        let rotation = match result.payload {
            Some(r) => r,
            None => return Ok(OperationResult::failure(result.message)),
        };

        if !rotation.success {
            return Ok(OperationResult {
                success: false,
                message: rotation.message.clone(),
                payload: Some(rotation),
            });
        }

        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(actor_id, ActionType::StringRotationExecuted, rotation.message.clone())
                .related(string_id, "RotationString")
                .with_payload(json!({
                    "assignments": rotation.assignments.len(),
                    "unchanged": rotation.unchanged.len(),
                    "warnings": rotation.warnings,
                })),
        );
        Ok(OperationResult::ok(rotation.message.clone(), rotation))
    }

    // ==========================================
    // 轮换组管理
    // ==========================================

    pub fn create_string(
        &self,
        actor_id: &str,
        name: &str,
        description: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<RotationString>> {
        if name.trim().is_empty() {
            return Ok(OperationResult::failure("Rotation string name must not be empty"));
        }

        let result = settle(self.service.create_string(name.trim(), description, now), |s| {
            format!("Rotation string {} created", s.name)
        })?;

        if let Some(s) = &result.payload {
            audit(
                self.audit_sink.as_ref(),
                AuditEntry::new(actor_id, ActionType::ManualOverride, result.message.clone())
                    .related(&s.string_id, "RotationString"),
            );
        }
        Ok(result)
    }

    pub fn add_dealer(
        &self,
        actor_id: &str,
        string_id: &str,
        dealer_id: &str,
        rotation_order: i32,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<()>> {
        let result = settle(
            self.service.add_dealer(string_id, dealer_id, rotation_order, now),
            |_| "Dealer added to rotation string".to_string(),
        )?;

        if result.success {
            audit(
                self.audit_sink.as_ref(),
                AuditEntry::new(
                    actor_id,
                    ActionType::ManualOverride,
                    format!("Added dealer {} to rotation string (order {})", dealer_id, rotation_order),
                )
                .related(string_id, "RotationString"),
            );
        }
        Ok(result)
    }

    pub fn remove_dealer(
        &self,
        actor_id: &str,
        string_id: &str,
        dealer_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<()>> {
        let result = settle(self.service.remove_dealer(string_id, dealer_id, now), |_| String::new())?;

        Ok(match result.payload {
            Some(true) => {
                audit(
                    self.audit_sink.as_ref(),
                    AuditEntry::new(
                        actor_id,
                        ActionType::ManualOverride,
                        format!("Removed dealer {} from rotation string", dealer_id),
                    )
                    .related(string_id, "RotationString"),
                );
                OperationResult::ok("Dealer removed from rotation string", ())
            }
            Some(false) => OperationResult::failure(format!(
                "Dealer {} is not an active member of this rotation string",
                dealer_id
            )),
            None => OperationResult::failure(result.message),
        })
    }

    pub fn set_tables(
        &self,
        actor_id: &str,
        string_id: &str,
        table_ids: &[String],
        now: NaiveDateTime,
    ) -> ApiResult<OperationResult<()>> {
        let result = settle(self.service.set_tables(string_id, table_ids, now), |_| {
            format!("Rotation string now covers {} tables", table_ids.len())
        })?;

        if result.success {
            audit(
                self.audit_sink.as_ref(),
                AuditEntry::new(actor_id, ActionType::ManualOverride, result.message.clone())
                    .related(string_id, "RotationString")
                    .with_payload(json!({ "table_ids": table_ids })),
            );
        }
        Ok(result)
    }

    pub fn list_active_strings(&self) -> ApiResult<Vec<RotationString>> {
        Ok(self.service.list_active_strings()?)
    }

    pub fn dealers_in_string(&self, string_id: &str) -> ApiResult<OperationResult<Vec<Dealer>>> {
        settle(self.service.dealers_in_string(string_id), |dealers| {
            format!("{} active dealers", dealers.len())
        })
    }
}
