use super::core::ScoreBreakdown;
use crate::config::ScoringWeights;
use crate::domain::{Dealer, ProficiencyLevel, Table};
use chrono::NaiveDateTime;

/// 计算单个候选的评分明细（资质过滤已由调用方完成）
///
/// 评分项:
/// 1) 技能: 熟练度 × skill_per_level
/// 2) 公平性: fairness × fairness 权重
/// 3) 资历: seniority_level × seniority_per_level
/// 4) 偏好区域: preferred_pit == table.pit
/// 5) 休息时效: 仅在有 last_break_time 时计算；< recent 加分，> overdue 扣分
/// 6) 动线: 最近一次派台与本台同区域
pub(super) fn compute_breakdown(
    dealer: &Dealer,
    table: &Table,
    proficiency: ProficiencyLevel,
    fairness_score: f64,
    weights: &ScoringWeights,
    as_of: NaiveDateTime,
) -> ScoreBreakdown {
    let skill = proficiency.value() as f64 * weights.skill_per_level;
    let fairness = fairness_score * weights.fairness;
    let seniority = dealer.seniority_level as f64 * weights.seniority_per_level;

    let pit_preference = match dealer.preferred_pit.as_deref() {
        Some(pit) if !pit.is_empty() && pit == table.pit => weights.pit_preference_bonus,
        _ => 0.0,
    };

    let break_recency = match dealer.last_break_time {
        Some(last_break) => {
            let minutes = (as_of - last_break).num_seconds() as f64 / 60.0;
            if minutes < weights.recent_break_minutes as f64 {
                weights.recent_break_bonus
            } else if minutes > weights.overdue_break_minutes as f64 {
                -weights.overdue_break_penalty
            } else {
                0.0
            }
        }
        None => 0.0,
    };

    let movement = match dealer.most_recent_assignment() {
        Some(last) if last.pit == table.pit => weights.same_pit_movement_bonus,
        _ => 0.0,
    };

    let total = skill + fairness + seniority + pit_preference + break_recency + movement;

    ScoreBreakdown {
        skill,
        fairness,
        seniority,
        pit_preference,
        break_recency,
        movement,
        total,
    }
}
