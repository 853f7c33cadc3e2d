// ==========================================
// 赌台荷官轮换系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod audit_log;
pub mod break_record;
pub mod dealer;
pub mod rotation_string;
pub mod table;
pub mod types;

// 重导出核心类型
pub use assignment::Assignment;
pub use audit_log::{ActionType, AuditEntry, AuditLog};
pub use break_record::BreakRecord;
pub use dealer::{Certification, Dealer, HistoricalAssignment};
pub use rotation_string::{RotationString, StringMember};
pub use table::{Table, DEFAULT_PUSH_INTERVAL_MINUTES};
pub use types::{BreakType, CrapsRole, DealerStatus, GameType, ProficiencyLevel, TableStatus};
