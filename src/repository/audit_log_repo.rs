// ==========================================
// 赌台荷官轮换系统 - 审计日志数据仓储
// ==========================================
// 依据: audit_log 表
// 红线: 只追加，不修改、不删除
// ==========================================

mod core;
mod queries;


pub use core::{AuditLogRepository, AuditSink};
