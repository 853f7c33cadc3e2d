use crate::config::RotationConfig;
use crate::domain::{Assignment, CrapsRole, Dealer, DealerStatus, Table};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::db_utils::to_storage_precision;
use crate::repository::roster_store::{DealerUpdate, RosterChangeSet, RosterStore};
use chrono::{Duration, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, info};

/// 派台选项
#[derive(Debug, Clone, Default)]
pub struct AssignOptions {
    /// 指定开始时间；缺省时在台 = now，待上台 = now + 赌台推送间隔
    pub start_time: Option<NaiveDateTime>,
    pub craps_role: CrapsRole,
    pub is_ai_generated: bool,
}

// ==========================================
// RotationEngine - 轮换引擎
// ==========================================
pub struct RotationEngine<S>
where
    S: RosterStore,
{
    pub(super) store: Arc<S>,
    pub(super) config: RotationConfig,
}

impl<S> RotationEngine<S>
where
    S: RosterStore,
{
    pub fn new(store: Arc<S>, config: RotationConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ==========================================
    // 读取辅助
    // ==========================================

    pub(super) fn load_dealer(&self, dealer_id: &str) -> EngineResult<Dealer> {
        self.store
            .find_dealer(dealer_id)?
            .ok_or_else(|| EngineError::not_found("Dealer", dealer_id))
    }

    pub(super) fn load_table(&self, table_id: &str) -> EngineResult<Table> {
        self.store
            .find_table(table_id)?
            .ok_or_else(|| EngineError::not_found("Table", table_id))
    }

    /// 结束一条未结束派台并校验其所在赌台的 revision
    pub(super) fn end_engagement(
        &self,
        set: &mut RosterChangeSet,
        assignment: &Assignment,
        now: NaiveDateTime,
    ) -> EngineResult<()> {
        let table = self.load_table(&assignment.table_id)?;
        set.touch_table(&table.table_id, table.revision)
            .end_assignment(&assignment.assignment_id, now);
        Ok(())
    }

    /// 荷官离台后的状态：保留终态，否则看是否仍有休息记录
    pub(super) fn status_after_leaving(&self, dealer: &Dealer) -> EngineResult<DealerStatus> {
        let open_break = self.store.find_open_break(&dealer.dealer_id)?;
        Ok(DealerStatus::project(
            Some(dealer.status),
            false,
            open_break.map(|b| b.break_type),
        ))
    }

    // ==========================================
    // 派台
    // ==========================================

    /// 派台
    ///
    /// - 在台 (is_current=true): 结束荷官自身未结束的派台、结束该台现任派台，荷官 → Dealing
    /// - 待上台 (is_current=false): 要求荷官没有未结束派台，不改变荷官状态
    /// - 终态荷官 (CalledIn/SentHome/OffShift) 不可派台
    pub fn assign(
        &self,
        dealer_id: &str,
        table_id: &str,
        is_current: bool,
        options: AssignOptions,
        now: NaiveDateTime,
    ) -> EngineResult<Assignment> {
        let now = to_storage_precision(now);
        let dealer = self.load_dealer(dealer_id)?;
        let table = self.load_table(table_id)?;

        if dealer.status.is_terminal() {
            return Err(EngineError::precondition(format!(
                "荷官 {} 当前状态为 {}，不可派台",
                dealer.employee_number, dealer.status
            )));
        }

        let open = self.store.find_open_assignment_for_dealer(dealer_id)?;
        let mut set = RosterChangeSet::new();

        let start_time = match (options.start_time, is_current) {
            (Some(t), _) => to_storage_precision(t),
            (None, true) => now,
            (None, false) => now + Duration::minutes(table.push_interval_minutes),
        };
        let mut assignment = Assignment::new(
            dealer_id,
            table_id,
            start_time,
            is_current,
            options.is_ai_generated,
            now,
        );
        assignment.craps_role = options.craps_role;

        if is_current {
            if let Some(open) = &open {
                if open.is_current && open.table_id == table_id {
                    return Err(EngineError::precondition(format!(
                        "荷官 {} 已在赌台 {} 发牌",
                        dealer.employee_number, table.table_number
                    )));
                }
            }

            // 先结束旧占用，再插入新派台（唯一索引按语句逐条校验）
            set.touch_table(&table.table_id, table.revision);
            if let Some(open) = &open {
                self.end_engagement(&mut set, open, now)?;
            }

            if let Some(incumbent) = table.active_current_assignment() {
                set.end_assignment(&incumbent.assignment_id, now);
                let incumbent_dealer = self.load_dealer(&incumbent.dealer_id)?;
                let status = self.status_after_leaving(&incumbent_dealer)?;
                set.update_dealer(DealerUpdate::from_dealer(&incumbent_dealer, status));
            }

            // 休息中直接上台：同时结束休息
            if let Some(open_break) = self.store.find_open_break(dealer_id)? {
                set.close_break_record(&open_break.break_id, now);
            }

            set.insert_assignment(assignment.clone());
            set.update_dealer(DealerUpdate::from_dealer(&dealer, DealerStatus::Dealing));
        } else {
            if let Some(open) = &open {
                return Err(EngineError::precondition(format!(
                    "荷官 {} 已有未结束派台 (table_id={})，不可再排为下一位",
                    dealer.employee_number, open.table_id
                )));
            }
            set.touch_table(&table.table_id, table.revision)
                .insert_assignment(assignment.clone());
        }

        self.store.commit(&set)?;

        info!(
            dealer_id = %dealer_id,
            table_number = %table.table_number,
            is_current = is_current,
            is_ai_generated = assignment.is_ai_generated,
            "派台完成"
        );
        Ok(assignment)
    }

    // ==========================================
    // 推送
    // ==========================================

    /// 执行推送：现任下台、下一位上台
    ///
    /// # 返回
    /// - `Ok(false)`: 赌台不存在，或缺少现任/下一位（不做任何修改）
    /// - `Ok(true)`: 推送完成
    pub fn execute_push(&self, table_id: &str, now: NaiveDateTime) -> EngineResult<bool> {
        let now = to_storage_precision(now);
        let table = match self.store.find_table(table_id)? {
            Some(t) => t,
            None => return Ok(false),
        };

        let (current, next) = match (table.active_current_assignment(), table.pending_next_assignment()) {
            (Some(c), Some(n)) => (c.clone(), n.clone()),
            _ => {
                debug!(table_number = %table.table_number, "缺少现任或下一位，跳过推送");
                return Ok(false);
            }
        };

        let outgoing = self.load_dealer(&current.dealer_id)?;
        let incoming = self.load_dealer(&next.dealer_id)?;
        if incoming.status.is_terminal() {
            return Err(EngineError::precondition(format!(
                "下一位荷官 {} 当前状态为 {}，不可上台",
                incoming.employee_number, incoming.status
            )));
        }

        let mut set = RosterChangeSet::new();
        set.touch_table(&table.table_id, table.revision)
            .end_assignment(&current.assignment_id, now)
            .promote_assignment(&next.assignment_id, now);

        let outgoing_status = self.status_after_leaving(&outgoing)?;
        set.update_dealer(DealerUpdate::from_dealer(&outgoing, outgoing_status));

        if let Some(open_break) = self.store.find_open_break(&incoming.dealer_id)? {
            set.close_break_record(&open_break.break_id, now);
        }
        set.update_dealer(DealerUpdate::from_dealer(&incoming, DealerStatus::Dealing));

        self.store.commit(&set)?;

        info!(
            table_number = %table.table_number,
            outgoing = %outgoing.employee_number,
            incoming = %incoming.employee_number,
            "推送完成"
        );
        Ok(true)
    }

    // ==========================================
    // 撤台
    // ==========================================

    /// 结束一条未结束派台，荷官回到空闲（或其休息状态）
    pub fn remove_dealer(&self, assignment_id: &str, now: NaiveDateTime) -> EngineResult<Assignment> {
        let now = to_storage_precision(now);
        let mut assignment = self
            .store
            .find_assignment(assignment_id)?
            .ok_or_else(|| EngineError::not_found("Assignment", assignment_id))?;

        if !assignment.is_open() {
            return Err(EngineError::precondition(format!(
                "派台 {} 已结束，不可重复撤台",
                assignment_id
            )));
        }

        let dealer = self.load_dealer(&assignment.dealer_id)?;
        let mut set = RosterChangeSet::new();
        self.end_engagement(&mut set, &assignment, now)?;
        let status = self.status_after_leaving(&dealer)?;
        set.update_dealer(DealerUpdate::from_dealer(&dealer, status));

        self.store.commit(&set)?;

        assignment.end_time = Some(now);
        assignment.is_current = false;
        info!(
            assignment_id = %assignment_id,
            dealer = %dealer.employee_number,
            "撤台完成"
        );
        Ok(assignment)
    }
}
