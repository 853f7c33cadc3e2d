use crate::config::RotationConfig;
use crate::domain::{Assignment, TableStatus};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rotation::{AssignOptions, RotationEngine};
use crate::repository::roster_store::RosterStore;
use crate::repository::rotation_string_repo::RotationStringRepository;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// 轮换组执行结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringRotationResult {
    pub success: bool,
    pub message: String,
    pub assignments: Vec<Assignment>,
    pub unchanged: Vec<Assignment>, // 组员已在配对赌台发牌
    pub warnings: Vec<String>,
}

impl StringRotationResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            assignments: Vec::new(),
            unchanged: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

// ==========================================
// StringRotationService - 轮换组服务
// ==========================================
pub struct StringRotationService<S>
where
    S: RosterStore,
{
    pub(super) strings: Arc<RotationStringRepository>,
    pub(super) store: Arc<S>,
    pub(super) engine: RotationEngine<S>,
}

impl<S> StringRotationService<S>
where
    S: RosterStore,
{
    pub fn new(strings: Arc<RotationStringRepository>, store: Arc<S>, config: RotationConfig) -> Self {
        Self {
            engine: RotationEngine::new(store.clone(), config),
            strings,
            store,
        }
    }

    /// 执行轮换组轮换
    ///
    /// 配对数 = min(有效成员数, 开台赌台数)；多出的荷官或赌台各产生一条警告。
    /// 单对派台失败只产生警告，其余配对照常执行。
    pub fn execute_string_rotation(&self, string_id: &str, now: NaiveDateTime) -> EngineResult<StringRotationResult> {
        let string = match self.strings.find_by_id(string_id)? {
            Some(s) if s.is_active => s,
            Some(s) => {
                return Ok(StringRotationResult::failure(format!(
                    "Rotation string {} is inactive",
                    s.name
                )))
            }
            None => return Ok(StringRotationResult::failure("Rotation string not found")),
        };

        let members = string.active_members();
        if members.is_empty() {
            return Ok(StringRotationResult::failure(format!(
                "Rotation string {} has no active dealers",
                string.name
            )));
        }

        let tables: Vec<_> = self
            .store
            .list_tables_by_ids(&string.table_ids)?
            .into_iter()
            .filter(|t| t.status == TableStatus::Open)
            .collect();

        let mut assignments = Vec::new();
        let mut unchanged = Vec::new();
        let mut warnings = Vec::new();

        for (member, table) in members.iter().zip(tables.iter()) {
            if let Some(existing) = self.engine.seated_at(&member.dealer_id, &table.table_id)? {
                unchanged.push(existing);
                continue;
            }
            match self
                .engine
                .assign(&member.dealer_id, &table.table_id, true, AssignOptions::default(), now)
            {
                Ok(a) => assignments.push(a),
                Err(e) => {
                    warn!(
                        string = %string.name,
                        dealer_id = %member.dealer_id,
                        table_number = %table.table_number,
                        error = %e,
                        "轮换组派台失败"
                    );
                    warnings.push(format!(
                        "Dealer {} could not be assigned to table {}: {}",
                        member.dealer_id, table.table_number, e
                    ));
                }
            }
        }

        for member in members.iter().skip(tables.len()) {
            warnings.push(format!("Dealer {} has no open table in this rotation", member.dealer_id));
        }
        for table in tables.iter().skip(members.len()) {
            warnings.push(format!("Table {} has no dealer in this rotation", table.table_number));
        }

        info!(
            string = %string.name,
            assignments = assignments.len(),
            unchanged = unchanged.len(),
            warnings = warnings.len(),
            "轮换组轮换完成"
        );

        Ok(StringRotationResult {
            success: true,
            message: format!(
                "Executed rotation for string {} with {} assignments",
                string.name,
                assignments.len()
            ),
            assignments,
            unchanged,
            warnings,
        })
    }

    pub(super) fn require_string(&self, string_id: &str) -> EngineResult<()> {
        match self.strings.find_by_id(string_id)? {
            Some(_) => Ok(()),
            None => Err(EngineError::not_found("RotationString", string_id)),
        }
    }
}
