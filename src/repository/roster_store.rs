// ==========================================
// 赌台荷官轮换系统 - 人员名册存储接口
// ==========================================
// 职责: 定义引擎所需的名册读写接口（不包含实现）
// 写入约定:
// - 引擎只产出变更集 (RosterChangeSet)，由存储在一个事务内整体提交
// - 变更集携带读取时的 revision，存储据此做乐观锁校验
// - 任一变更失败则整体回滚，引擎不做补偿
// ==========================================

use crate::domain::{Assignment, BreakRecord, Dealer, DealerStatus, Table, TableStatus};
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;

// ==========================================
// RosterStore Trait
// ==========================================
// 实现者: SqliteRosterStore
pub trait RosterStore: Send + Sync {
    // ===== 荷官 =====

    /// 按ID查询荷官（含资质与历史派台）
    fn find_dealer(&self, dealer_id: &str) -> RepositoryResult<Option<Dealer>>;

    /// 按状态查询荷官（含资质与历史派台），按员工号排序
    fn list_dealers_by_status(&self, statuses: &[DealerStatus]) -> RepositoryResult<Vec<Dealer>>;

    // ===== 赌台 =====

    /// 按ID查询赌台（含未结束的当前/下一位派台）
    fn find_table(&self, table_id: &str) -> RepositoryResult<Option<Table>>;

    /// 按状态查询赌台，按台号排序
    fn list_tables_by_status(&self, status: TableStatus) -> RepositoryResult<Vec<Table>>;

    /// 按ID集合查询赌台，按台号排序（不存在的ID被忽略）
    fn list_tables_by_ids(&self, table_ids: &[String]) -> RepositoryResult<Vec<Table>>;

    // ===== 派台 =====

    fn find_assignment(&self, assignment_id: &str) -> RepositoryResult<Option<Assignment>>;

    /// 荷官未结束的派台（在台或待上台）
    fn find_open_assignment_for_dealer(&self, dealer_id: &str) -> RepositoryResult<Option<Assignment>>;

    /// 赌台在时间范围内开始的派台（含已结束）
    fn list_assignments_for_table(
        &self,
        table_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<Assignment>>;

    // ===== 休息记录 =====

    /// 荷官最近一条未结束的休息记录
    fn find_open_break(&self, dealer_id: &str) -> RepositoryResult<Option<BreakRecord>>;

    /// 荷官在时间范围内开始的休息记录
    fn list_break_records(
        &self,
        dealer_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<BreakRecord>>;

    // ===== 写入 =====

    /// 在单个事务内提交变更集
    fn commit(&self, change_set: &RosterChangeSet) -> RepositoryResult<()>;
}

// ==========================================
// RosterMutation - 单条变更
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RosterMutation {
    InsertAssignment(Assignment),
    /// 结束派台（仅对未结束记录生效）
    EndAssignment {
        assignment_id: String,
        end_time: NaiveDateTime,
    },
    /// 待上台 → 在台
    PromoteAssignment {
        assignment_id: String,
        start_time: NaiveDateTime,
    },
    UpdateDealer(DealerUpdate),
    /// 赌台 revision 校验并递增
    TouchTable {
        table_id: String,
        expected_revision: i64,
    },
    InsertBreakRecord(BreakRecord),
    CloseBreakRecord {
        break_id: String,
        end_time: NaiveDateTime,
    },
}

/// 荷官状态与休息时间戳的整体写回
#[derive(Debug, Clone, PartialEq)]
pub struct DealerUpdate {
    pub dealer_id: String,
    pub expected_revision: i64,
    pub status: DealerStatus,
    pub last_break_time: Option<NaiveDateTime>,
    pub last_meal_time: Option<NaiveDateTime>,
}

impl DealerUpdate {
    /// 以荷官当前快照为基础构造写回
    pub fn from_dealer(dealer: &Dealer, status: DealerStatus) -> Self {
        Self {
            dealer_id: dealer.dealer_id.clone(),
            expected_revision: dealer.revision,
            status,
            last_break_time: dealer.last_break_time,
            last_meal_time: dealer.last_meal_time,
        }
    }
}

// ==========================================
// RosterChangeSet - 变更集
// ==========================================
// 变更按加入顺序执行：先结束旧派台，再插入/提升新派台，
// 以满足“每名荷官/每张赌台至多一条进行中派台”的唯一索引。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterChangeSet {
    mutations: Vec<RosterMutation>,
}

impl RosterChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mutations(&self) -> &[RosterMutation] {
        &self.mutations
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn insert_assignment(&mut self, assignment: Assignment) -> &mut Self {
        self.mutations.push(RosterMutation::InsertAssignment(assignment));
        self
    }

    pub fn end_assignment(&mut self, assignment_id: &str, end_time: NaiveDateTime) -> &mut Self {
        self.mutations.push(RosterMutation::EndAssignment {
            assignment_id: assignment_id.to_string(),
            end_time,
        });
        self
    }

    pub fn promote_assignment(&mut self, assignment_id: &str, start_time: NaiveDateTime) -> &mut Self {
        self.mutations.push(RosterMutation::PromoteAssignment {
            assignment_id: assignment_id.to_string(),
            start_time,
        });
        self
    }

    /// 写回荷官状态
    ///
    /// 同一荷官在一个变更集内只保留一条写回（保留首次的 expected_revision），
    /// 否则第二次 revision 校验必然失败。
    pub fn update_dealer(&mut self, update: DealerUpdate) -> &mut Self {
        let existing = self.mutations.iter_mut().find_map(|m| match m {
            RosterMutation::UpdateDealer(u) if u.dealer_id == update.dealer_id => Some(u),
            _ => None,
        });

        match existing {
            Some(u) => {
                u.status = update.status;
                u.last_break_time = update.last_break_time;
                u.last_meal_time = update.last_meal_time;
            }
            None => self.mutations.push(RosterMutation::UpdateDealer(update)),
        }
        self
    }

    pub fn touch_table(&mut self, table_id: &str, expected_revision: i64) -> &mut Self {
        let already = self.mutations.iter().any(|m| {
            matches!(m, RosterMutation::TouchTable { table_id: t, .. } if t == table_id)
        });
        if !already {
            self.mutations.push(RosterMutation::TouchTable {
                table_id: table_id.to_string(),
                expected_revision,
            });
        }
        self
    }

    pub fn insert_break_record(&mut self, record: BreakRecord) -> &mut Self {
        self.mutations.push(RosterMutation::InsertBreakRecord(record));
        self
    }

    pub fn close_break_record(&mut self, break_id: &str, end_time: NaiveDateTime) -> &mut Self {
        self.mutations.push(RosterMutation::CloseBreakRecord {
            break_id: break_id.to_string(),
            end_time,
        });
        self
    }
}
