// ==========================================
// 赌台荷官轮换系统 - 引擎层
// ==========================================
// 职责: 实现派台/推送/休息/排班规则,不拼 SQL
// 红线: Engine 只通过 RosterStore 读写; 审计由 API 层负责
// ==========================================

pub mod error;
pub mod fairness;
pub mod matching;
pub mod rotation;
pub mod scheduler;
pub mod selector;
pub mod string_rotation;

#[cfg(test)]
pub mod test_fixtures;

// 重导出核心引擎
pub use error::{EngineError, EngineResult};
pub use fairness::{FairnessBreakdown, FairnessCalculator};
pub use matching::match_tables;
pub use rotation::{AssignOptions, PushSweepReport, RotationEngine};
pub use scheduler::{ApplyReport, CallInOutcome, ScheduleMetrics, ScheduleResult, Scheduler};
pub use selector::{DealerSelector, ScoreBreakdown, ScoredCandidate};
pub use string_rotation::{StringRotationResult, StringRotationService};
