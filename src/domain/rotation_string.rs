// ==========================================
// 赌台荷官轮换系统 - 轮换组 (Rotation String)
// ==========================================
// 一组有序荷官 + 一组固定赌台，按顺序整体轮换
// 例: "Craps" / "HighLimit" / "MainFloor"
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationString {
    pub string_id: String,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    pub priority: i32, // 越小越优先
    pub members: Vec<StringMember>,
    pub table_ids: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RotationString {
    /// 有效成员，按轮换顺序
    pub fn active_members(&self) -> Vec<&StringMember> {
        let mut members: Vec<&StringMember> = self.members.iter().filter(|m| m.is_active).collect();
        members.sort_by_key(|m| m.rotation_order);
        members
    }
}

// ==========================================
// StringMember - 轮换组成员
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StringMember {
    pub dealer_id: String,
    pub rotation_order: i32,
    pub is_active: bool,
    pub assigned_at: NaiveDateTime,
}
