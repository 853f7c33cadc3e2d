// ==========================================
// 赌台荷官轮换系统 - 轮换参数快照
// ==========================================
// 职责: 引擎运行所需的全部参数（时间间隔、评分权重、匹配策略）
// 来源: RotationConfigReader::load_rotation_config()，缺省值见 Default
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// MatchingStrategy - 排班匹配策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchingStrategy {
    /// 按台号依次取最高分荷官，不回溯
    #[default]
    Greedy,
    /// 全局最优匹配：先最大化开台数，再最大化总分
    Optimal,
}

impl MatchingStrategy {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "OPTIMAL" | "HUNGARIAN" => MatchingStrategy::Optimal,
            _ => MatchingStrategy::Greedy,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            MatchingStrategy::Greedy => "GREEDY",
            MatchingStrategy::Optimal => "OPTIMAL",
        }
    }
}

impl fmt::Display for MatchingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// ScoringWeights - 候选荷官评分权重
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skill_per_level: f64,          // 熟练度每级得分
    pub fairness: f64,                 // 公平性系数
    pub seniority_per_level: f64,      // 资历每级得分
    pub pit_preference_bonus: f64,     // 偏好区域
    pub recent_break_bonus: f64,       // 刚休息过
    pub overdue_break_penalty: f64,    // 久未休息（扣分，取正值）
    pub same_pit_movement_bonus: f64,  // 同区域动线
    pub recent_break_minutes: i64,     // 小于该值视为刚休息
    pub overdue_break_minutes: i64,    // 大于该值视为久未休息
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skill_per_level: 20.0,
            fairness: 30.0,
            seniority_per_level: 2.0,
            pit_preference_bonus: 15.0,
            recent_break_bonus: 10.0,
            overdue_break_penalty: 20.0,
            same_pit_movement_bonus: 10.0,
            recent_break_minutes: 90,
            overdue_break_minutes: 120,
        }
    }
}

// ==========================================
// RotationConfig - 参数快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    pub push_interval_minutes: i64,  // 新建下一位派台的默认间隔
    pub break_interval_minutes: i64, // 两次休息的标准间隔
    pub meal_deadline_hours: i64,    // 上班后须在该时限内用餐
    pub weights: ScoringWeights,
    pub matching_strategy: MatchingStrategy,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            push_interval_minutes: 20,
            break_interval_minutes: 120,
            meal_deadline_hours: 5,
            weights: ScoringWeights::default(),
            matching_strategy: MatchingStrategy::Greedy,
        }
    }
}
