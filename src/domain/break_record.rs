// ==========================================
// 赌台荷官轮换系统 - 休息记录
// ==========================================

use crate::domain::types::BreakType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// BreakRecord - 休息/用餐记录
// ==========================================
// 创建: 送休息时; 关闭: 返岗时写入 end_time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakRecord {
    pub break_id: String,
    pub dealer_id: String,
    pub break_type: BreakType,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub expected_duration_minutes: i64,
    pub is_compliant: bool, // 是否在规定休息间隔内安排
    pub created_at: NaiveDateTime,
}

impl BreakRecord {
    pub fn open(
        dealer_id: &str,
        break_type: BreakType,
        start_time: NaiveDateTime,
        expected_duration_minutes: i64,
        is_compliant: bool,
    ) -> Self {
        Self {
            break_id: Uuid::new_v4().to_string(),
            dealer_id: dealer_id.to_string(),
            break_type,
            start_time,
            end_time: None,
            expected_duration_minutes,
            is_compliant,
            created_at: start_time,
        }
    }
}
