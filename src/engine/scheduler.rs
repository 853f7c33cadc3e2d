// ==========================================
// 赌台荷官轮换系统 - 排班器
// ==========================================
// 职责: 全场排班生成/落库、单台推荐、请假补位、休息到期查询
// 红线: 只经 RosterStore 读数据、经 RotationEngine 写数据，不拼 SQL
// ==========================================

mod breaks;
mod core;
mod staffing;

#[cfg(test)]
mod tests;

pub use core::{ApplyReport, ScheduleMetrics, ScheduleResult, Scheduler};
pub use staffing::CallInOutcome;
