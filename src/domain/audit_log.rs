// ==========================================
// 赌台荷官轮换系统 - 审计日志领域模型
// ==========================================
// 红线: 所有写操作完成后由调用方记录
// 用途: 审计追踪
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

// ==========================================
// AuditLog - 审计日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub log_id: String,
    pub actor_id: String,                     // 操作人（员工号）
    pub action_type: ActionType,
    pub description: String,
    pub related_entity_id: Option<String>,
    pub related_entity_type: Option<String>,  // "Dealer" / "Table" / "RotationString"
    pub payload_json: Option<JsonValue>,      // 附加数据
    pub timestamp: NaiveDateTime,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    DealerAssigned,
    DealerRemoved,
    DealerSentToBreak,
    DealerReturnedFromBreak,
    DealerSentHome,
    DealerCalledIn,
    PushExecuted,
    ScheduleGenerated,
    StringRotationExecuted,
    ManualOverride,
    TableOpened,
    TableClosed,
    SettingsChanged,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::DealerAssigned => "DealerAssigned",
            ActionType::DealerRemoved => "DealerRemoved",
            ActionType::DealerSentToBreak => "DealerSentToBreak",
            ActionType::DealerReturnedFromBreak => "DealerReturnedFromBreak",
            ActionType::DealerSentHome => "DealerSentHome",
            ActionType::DealerCalledIn => "DealerCalledIn",
            ActionType::PushExecuted => "PushExecuted",
            ActionType::ScheduleGenerated => "ScheduleGenerated",
            ActionType::StringRotationExecuted => "StringRotationExecuted",
            ActionType::ManualOverride => "ManualOverride",
            ActionType::TableOpened => "TableOpened",
            ActionType::TableClosed => "TableClosed",
            ActionType::SettingsChanged => "SettingsChanged",
        }
    }

    /// 从字符串解析（未知值返回 None）
    pub fn from_str(s: &str) -> Option<Self> {
        let action = match s {
            "DealerAssigned" => ActionType::DealerAssigned,
            "DealerRemoved" => ActionType::DealerRemoved,
            "DealerSentToBreak" => ActionType::DealerSentToBreak,
            "DealerReturnedFromBreak" => ActionType::DealerReturnedFromBreak,
            "DealerSentHome" => ActionType::DealerSentHome,
            "DealerCalledIn" => ActionType::DealerCalledIn,
            "PushExecuted" => ActionType::PushExecuted,
            "ScheduleGenerated" => ActionType::ScheduleGenerated,
            "StringRotationExecuted" => ActionType::StringRotationExecuted,
            "ManualOverride" => ActionType::ManualOverride,
            "TableOpened" => ActionType::TableOpened,
            "TableClosed" => ActionType::TableClosed,
            "SettingsChanged" => ActionType::SettingsChanged,
            _ => return None,
        };
        Some(action)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// AuditEntry - 写入审计的入参
// ==========================================
// 不含主键与时间戳，由审计接收方补全
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_id: String,
    pub action_type: ActionType,
    pub description: String,
    pub related_entity_id: Option<String>,
    pub related_entity_type: Option<String>,
    pub payload_json: Option<JsonValue>,
}

impl AuditEntry {
    pub fn new(actor_id: &str, action_type: ActionType, description: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            action_type,
            description: description.into(),
            related_entity_id: None,
            related_entity_type: None,
            payload_json: None,
        }
    }

    /// 关联实体
    pub fn related(mut self, entity_id: &str, entity_type: &str) -> Self {
        self.related_entity_id = Some(entity_id.to_string());
        self.related_entity_type = Some(entity_type.to_string());
        self
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }
}
