// ==========================================
// 赌台荷官轮换系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod audit_log_repo;
pub mod db_utils;
pub mod error;
pub mod rotation_string_repo;
pub mod roster_store;
pub mod sqlite_roster_store;

// 重导出核心仓储
pub use audit_log_repo::{AuditLogRepository, AuditSink};
pub use error::{RepositoryError, RepositoryResult};
pub use rotation_string_repo::RotationStringRepository;
pub use roster_store::{DealerUpdate, RosterChangeSet, RosterMutation, RosterStore};
pub use sqlite_roster_store::SqliteRosterStore;
