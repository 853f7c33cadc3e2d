// ==========================================
// 赌台荷官轮换系统 - 轮换引擎
// ==========================================
// 职责: 派台/推送/撤台/休息/请假/下班的状态转换
// 红线:
// - Engine 不拼 SQL，所有写入以变更集形式交给 RosterStore 一次提交
// - 荷官状态按“终态 > 在台 > 休息 > 空闲”由提交后的占用情况推导
// - 审计日志由调用方 (API 层) 记录，引擎不写审计
// ==========================================

mod breaks;
mod core;
mod queries;

#[cfg(test)]
mod tests;

pub use core::{AssignOptions, RotationEngine};
pub use queries::PushSweepReport;
