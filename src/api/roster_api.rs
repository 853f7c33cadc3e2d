// ==========================================
// 赌台荷官轮换系统 - 名册管理 API
// ==========================================
// 职责: 荷官/资质/赌台主数据录入，开关台、锁台、上下班
// 约定: 主数据写入直接走 SqliteRosterStore 的管理接口（不经引擎变更集）
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::result::{audit, OperationResult};
use crate::domain::{
    ActionType, AuditEntry, Certification, CrapsRole, Dealer, DealerStatus, GameType,
    ProficiencyLevel, Table, TableStatus,
};
use crate::repository::{AuditSink, RepositoryError, RosterStore, SqliteRosterStore};

// ==========================================
// 请求结构
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCertification {
    pub game_type: GameType,
    pub proficiency_level: ProficiencyLevel,
    #[serde(default)]
    pub craps_role: CrapsRole,
    pub certified_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDealer {
    pub employee_number: String,
    pub display_name: String,
    pub seniority_level: i32,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub preferred_pit: Option<String>,
    #[serde(default)]
    pub certifications: Vec<NewCertification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTable {
    pub table_number: String,
    pub game_type: GameType,
    pub pit: String,
    pub min_bet: f64,
    pub max_bet: f64,
    #[serde(default)]
    pub is_high_limit: bool,
    pub required_dealer_count: i32,
    /// 缺省取配置的推送间隔
    pub push_interval_minutes: Option<i64>,
}

// ==========================================
// RosterApi - 名册管理 API
// ==========================================
pub struct RosterApi {
    store: Arc<SqliteRosterStore>,
    default_push_interval_minutes: i64,
    audit_sink: Arc<dyn AuditSink>,
}

impl RosterApi {
    pub fn new(
        store: Arc<SqliteRosterStore>,
        default_push_interval_minutes: i64,
        audit_sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            default_push_interval_minutes,
            audit_sink,
        }
    }

    // ==========================================
    // 荷官
    // ==========================================

    /// 录入荷官（员工号重复 → 失败结果）
    pub fn register_dealer(&self, actor_id: &str, request: NewDealer) -> ApiResult<OperationResult<Dealer>> {
        if request.employee_number.trim().is_empty() {
            return Ok(OperationResult::failure("Employee number must not be empty"));
        }
        if request.seniority_level < 0 {
            return Ok(OperationResult::failure("Seniority level must not be negative"));
        }

        let dealer_id = Uuid::new_v4().to_string();
        let dealer = Dealer {
            certifications: request
                .certifications
                .iter()
                .map(|c| build_certification(&dealer_id, c))
                .collect(),
            dealer_id,
            employee_number: request.employee_number.trim().to_string(),
            display_name: request.display_name,
            status: DealerStatus::Available,
            seniority_level: request.seniority_level,
            shift_start: request.shift_start,
            shift_end: request.shift_end,
            last_break_time: None,
            last_meal_time: None,
            preferred_pit: request.preferred_pit,
            assignment_history: Vec::new(),
            revision: 0,
        };

        match self.store.insert_dealer(&dealer) {
            Ok(()) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Ok(OperationResult::failure(format!(
                    "Employee number {} already exists",
                    dealer.employee_number
                )))
            }
            Err(e) => return Err(e.into()),
        }

        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(
                actor_id,
                ActionType::ManualOverride,
                format!("Registered dealer {}", dealer.employee_number),
            )
            .related(&dealer.dealer_id, "Dealer"),
        );
        Ok(OperationResult::ok("Dealer registered", dealer))
    }

    pub fn add_certification(
        &self,
        actor_id: &str,
        dealer_id: &str,
        request: NewCertification,
    ) -> ApiResult<OperationResult<Certification>> {
        if self.store.find_dealer(dealer_id)?.is_none() {
            return Ok(OperationResult::failure(format!("Dealer {} not found", dealer_id)));
        }

        let cert = build_certification(dealer_id, &request);
        self.store.insert_certification(&cert)?;

        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(
                actor_id,
                ActionType::ManualOverride,
                format!("Certified dealer for {} ({})", cert.game_type, cert.proficiency_level),
            )
            .related(dealer_id, "Dealer"),
        );
        Ok(OperationResult::ok("Certification added", cert))
    }

    /// 上班打卡: 非当班/终态 → Available
    pub fn start_shift(&self, actor_id: &str, dealer_id: &str) -> ApiResult<OperationResult<()>> {
        let dealer = match self.store.find_dealer(dealer_id)? {
            Some(d) => d,
            None => return Ok(OperationResult::failure(format!("Dealer {} not found", dealer_id))),
        };
        if !dealer.status.is_terminal() {
            return Ok(OperationResult::failure(format!(
                "Dealer {} is already on shift ({})",
                dealer.employee_number, dealer.status
            )));
        }

        self.store.set_dealer_status(dealer_id, DealerStatus::Available)?;
        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(actor_id, ActionType::ManualOverride, format!("Dealer {} started shift", dealer.employee_number))
                .related(dealer_id, "Dealer"),
        );
        Ok(OperationResult::ok("Dealer on shift", ()))
    }

    /// 下班打卡: 仅空闲且无未结束派台的荷官 → OffShift
    pub fn end_shift(&self, actor_id: &str, dealer_id: &str) -> ApiResult<OperationResult<()>> {
        let dealer = match self.store.find_dealer(dealer_id)? {
            Some(d) => d,
            None => return Ok(OperationResult::failure(format!("Dealer {} not found", dealer_id))),
        };
        if dealer.status != DealerStatus::Available || self.store.find_open_assignment_for_dealer(dealer_id)?.is_some() {
            return Ok(OperationResult::failure(format!(
                "Dealer {} must be idle to end shift ({})",
                dealer.employee_number, dealer.status
            )));
        }

        self.store.set_dealer_status(dealer_id, DealerStatus::OffShift)?;
        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(actor_id, ActionType::ManualOverride, format!("Dealer {} ended shift", dealer.employee_number))
                .related(dealer_id, "Dealer"),
        );
        Ok(OperationResult::ok("Dealer off shift", ()))
    }

    pub fn get_dealer(&self, dealer_id: &str) -> ApiResult<Option<Dealer>> {
        Ok(self.store.find_dealer(dealer_id)?)
    }

    pub fn list_dealers(&self, statuses: &[DealerStatus]) -> ApiResult<Vec<Dealer>> {
        Ok(self.store.list_dealers_by_status(statuses)?)
    }

    // ==========================================
    // 赌台
    // ==========================================

    /// 录入赌台（初始为关台；台号重复 → 失败结果）
    pub fn create_table(&self, actor_id: &str, request: NewTable) -> ApiResult<OperationResult<Table>> {
        if request.table_number.trim().is_empty() {
            return Ok(OperationResult::failure("Table number must not be empty"));
        }
        if request.min_bet < 0.0 || request.max_bet < request.min_bet {
            return Ok(OperationResult::failure("Invalid bet limits"));
        }
        let push_interval = request
            .push_interval_minutes
            .unwrap_or(self.default_push_interval_minutes);
        if push_interval <= 0 {
            return Ok(OperationResult::failure("Push interval must be positive"));
        }

        let table = Table {
            table_id: Uuid::new_v4().to_string(),
            table_number: request.table_number.trim().to_string(),
            game_type: request.game_type,
            status: TableStatus::Closed,
            pit: request.pit,
            min_bet: request.min_bet,
            max_bet: request.max_bet,
            is_high_limit: request.is_high_limit,
            required_dealer_count: request.required_dealer_count.max(1),
            push_interval_minutes: push_interval,
            current_assignments: Vec::new(),
            next_assignments: Vec::new(),
            is_locked: false,
            revision: 0,
        };

        match self.store.insert_table(&table) {
            Ok(()) => {}
            Err(RepositoryError::UniqueConstraintViolation(_)) => {
                return Ok(OperationResult::failure(format!(
                    "Table number {} already exists",
                    table.table_number
                )))
            }
            Err(e) => return Err(e.into()),
        }

        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(actor_id, ActionType::ManualOverride, format!("Created table {}", table.table_number))
                .related(&table.table_id, "Table")
                .with_payload(json!({ "game_type": table.game_type, "pit": table.pit })),
        );
        Ok(OperationResult::ok("Table created", table))
    }

    pub fn open_table(&self, actor_id: &str, table_id: &str) -> ApiResult<OperationResult<()>> {
        let table = match self.store.find_table(table_id)? {
            Some(t) => t,
            None => return Ok(OperationResult::failure(format!("Table {} not found", table_id))),
        };
        if table.status == TableStatus::Open {
            return Ok(OperationResult::failure(format!("Table {} is already open", table.table_number)));
        }

        self.store.set_table_status(table_id, TableStatus::Open)?;
        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(actor_id, ActionType::TableOpened, format!("Opened table {}", table.table_number))
                .related(table_id, "Table"),
        );
        Ok(OperationResult::ok("Table opened", ()))
    }

    /// 关台（仍有未结束派台时拒绝）
    pub fn close_table(&self, actor_id: &str, table_id: &str) -> ApiResult<OperationResult<()>> {
        let table = match self.store.find_table(table_id)? {
            Some(t) => t,
            None => return Ok(OperationResult::failure(format!("Table {} not found", table_id))),
        };
        if table.active_current_assignment().is_some() || table.pending_next_assignment().is_some() {
            return Ok(OperationResult::failure(format!(
                "Table {} still has dealers assigned",
                table.table_number
            )));
        }

        self.store.set_table_status(table_id, TableStatus::Closed)?;
        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(actor_id, ActionType::TableClosed, format!("Closed table {}", table.table_number))
                .related(table_id, "Table"),
        );
        Ok(OperationResult::ok("Table closed", ()))
    }

    /// 人工锁定/解锁（锁定的赌台不参与自动排班）
    pub fn set_table_locked(&self, actor_id: &str, table_id: &str, locked: bool) -> ApiResult<OperationResult<()>> {
        match self.store.set_table_locked(table_id, locked) {
            Ok(()) => {}
            Err(RepositoryError::NotFound { .. }) => {
                return Ok(OperationResult::failure(format!("Table {} not found", table_id)))
            }
            Err(e) => return Err(ApiError::from(e)),
        }

        audit(
            self.audit_sink.as_ref(),
            AuditEntry::new(
                actor_id,
                ActionType::ManualOverride,
                format!("{} table {}", if locked { "Locked" } else { "Unlocked" }, table_id),
            )
            .related(table_id, "Table"),
        );
        Ok(OperationResult::ok(if locked { "Table locked" } else { "Table unlocked" }, ()))
    }

    pub fn get_table(&self, table_id: &str) -> ApiResult<Option<Table>> {
        Ok(self.store.find_table(table_id)?)
    }

    pub fn list_tables(&self, status: TableStatus) -> ApiResult<Vec<Table>> {
        Ok(self.store.list_tables_by_status(status)?)
    }
}

fn build_certification(dealer_id: &str, request: &NewCertification) -> Certification {
    Certification {
        certification_id: Uuid::new_v4().to_string(),
        dealer_id: dealer_id.to_string(),
        game_type: request.game_type,
        proficiency_level: request.proficiency_level,
        craps_role: request.craps_role,
        certified_date: request.certified_date,
        expiration_date: request.expiration_date,
        is_active: true,
    }
}
