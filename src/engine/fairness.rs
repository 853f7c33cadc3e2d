// ==========================================
// 赌台荷官轮换系统 - 公平性计算
// ==========================================
// 输入: 荷官历史派台、当前时刻
// 输出: 公平性得分 ∈ (0, 1]，越高越应获得派台
// 公式:
//   diversity = 1 / (游戏种类数 + 1)
//   workload  = 1 / (当日工作分钟 + 1)
//   score     = (diversity + workload) / 2
// 无历史记录 → 1.0
// ==========================================

use crate::domain::Dealer;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 公平性计算明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessBreakdown {
    pub games_worked: usize,
    pub minutes_worked_today: f64,
    pub diversity: f64,
    pub workload: f64,
    pub score: f64,
}

// ==========================================
// FairnessCalculator - 无状态
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct FairnessCalculator;

impl FairnessCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 计算公平性得分
    pub fn calculate(&self, dealer: &Dealer, now: NaiveDateTime) -> f64 {
        self.breakdown(dealer, now).score
    }

    /// 计算公平性得分并返回明细
    pub fn breakdown(&self, dealer: &Dealer, now: NaiveDateTime) -> FairnessBreakdown {
        if dealer.assignment_history.is_empty() {
            return FairnessBreakdown {
                games_worked: 0,
                minutes_worked_today: 0.0,
                diversity: 1.0,
                workload: 1.0,
                score: 1.0,
            };
        }

        let games_worked = dealer
            .assignment_history
            .iter()
            .map(|a| a.game_type)
            .collect::<HashSet<_>>()
            .len();

        // 未来开始的记录跨度为负，按 0 计
        let today = now.date();
        let minutes_worked_today: f64 = dealer
            .assignment_history
            .iter()
            .filter(|a| a.start_time.date() == today)
            .map(|a| {
                let end = a.end_time.unwrap_or(now);
                ((end - a.start_time).num_seconds() as f64 / 60.0).max(0.0)
            })
            .sum();

        let diversity = 1.0 / (games_worked as f64 + 1.0);
        let workload = 1.0 / (minutes_worked_today + 1.0);

        FairnessBreakdown {
            games_worked,
            minutes_worked_today,
            diversity,
            workload,
            score: (diversity + workload) / 2.0,
        }
    }
}
