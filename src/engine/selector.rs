// ==========================================
// 赌台荷官轮换系统 - 候选荷官选择器
// ==========================================
// 职责: 对候选荷官逐项评分并排序，选出最适合某张赌台的荷官
// 输入: 赌台、候选池（只读）、评分时刻
// 输出: 带评分明细的候选列表（高分在前）
// 红线: 不修改候选池；无有效资质的荷官一律不入选
// ==========================================

mod core;
mod scoring;

#[cfg(test)]
mod tests;

pub use core::{DealerSelector, ScoreBreakdown, ScoredCandidate};
