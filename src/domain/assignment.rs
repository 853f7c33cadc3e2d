// ==========================================
// 赌台荷官轮换系统 - 派台领域模型
// ==========================================
// 红线: 派台记录只追加不删除
//       结束派台 = 写入 end_time 并清除 is_current，此后不再修改
// ==========================================

use crate::domain::types::CrapsRole;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Assignment - 派台
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: String,
    pub dealer_id: String,
    pub table_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>, // None = 进行中/待上台
    pub craps_role: CrapsRole,
    pub is_current: bool,     // true = 在台, false = 下一位
    pub is_ai_generated: bool, // 引擎推荐 vs 人工指派
    pub created_at: NaiveDateTime,
}

impl Assignment {
    /// 创建新的派台记录
    pub fn new(
        dealer_id: &str,
        table_id: &str,
        start_time: NaiveDateTime,
        is_current: bool,
        is_ai_generated: bool,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            assignment_id: Uuid::new_v4().to_string(),
            dealer_id: dealer_id.to_string(),
            table_id: table_id.to_string(),
            start_time,
            end_time: None,
            craps_role: CrapsRole::None,
            is_current,
            is_ai_generated,
            created_at,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}
