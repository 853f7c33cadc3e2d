// ==========================================
// 赌台荷官轮换系统 - 赌台领域模型
// ==========================================

use crate::domain::assignment::Assignment;
use crate::domain::types::{GameType, TableStatus};
use serde::{Deserialize, Serialize};

/// 标准推送间隔（分钟）
pub const DEFAULT_PUSH_INTERVAL_MINUTES: i64 = 20;

// ==========================================
// Table - 赌台
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub table_id: String,
    pub table_number: String, // 台号（唯一），如 BJ302 / R12 / CR4
    pub game_type: GameType,
    pub status: TableStatus,
    pub pit: String,

    // ===== 限额 =====
    pub min_bet: f64,
    pub max_bet: f64,
    pub is_high_limit: bool,

    pub required_dealer_count: i32,
    pub push_interval_minutes: i64,

    // ===== 派台 (由仓储加载，仅含未结束的记录) =====
    pub current_assignments: Vec<Assignment>,
    pub next_assignments: Vec<Assignment>, // 按 start_time 升序

    pub is_locked: bool, // 人工锁定，排班引擎不覆盖

    pub revision: i64,
}

impl Table {
    /// 进行中的当前派台
    pub fn active_current_assignment(&self) -> Option<&Assignment> {
        self.current_assignments
            .iter()
            .find(|a| a.is_current && a.end_time.is_none())
    }

    /// 最早的待上台派台
    pub fn pending_next_assignment(&self) -> Option<&Assignment> {
        self.next_assignments
            .iter()
            .filter(|a| !a.is_current && a.end_time.is_none())
            .min_by_key(|a| a.start_time)
    }
}
