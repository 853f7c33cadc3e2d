// ==========================================
// 赌台荷官轮换系统 - SQLite 名册存储
// ==========================================
// 职责: RosterStore 的 SQLite 实现
// 红线: Repository 不做业务逻辑,只做数据映射与事务提交
// ==========================================

mod admin;
mod commit;
mod core;
mod queries;


pub use core::SqliteRosterStore;
