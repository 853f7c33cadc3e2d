use super::scoring::compute_breakdown;
use crate::config::ScoringWeights;
use crate::domain::{Dealer, ProficiencyLevel, Table};
use crate::engine::fairness::FairnessCalculator;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 评分明细（各项独立列出，便于解释推荐原因）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill: f64,
    pub fairness: f64,
    pub seniority: f64,
    pub pit_preference: f64,
    pub break_recency: f64,
    pub movement: f64,
    pub total: f64,
}

/// 评分后的候选荷官
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub dealer_id: String,
    pub employee_number: String,
    pub display_name: String,
    pub proficiency_level: ProficiencyLevel,
    pub pool_index: usize, // 在候选池中的位置
    pub breakdown: ScoreBreakdown,
}

impl ScoredCandidate {
    pub fn score(&self) -> f64 {
        self.breakdown.total
    }
}

// ==========================================
// DealerSelector - 候选荷官选择器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct DealerSelector {
    weights: ScoringWeights,
    fairness: FairnessCalculator,
}

impl DealerSelector {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            fairness: FairnessCalculator::new(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// 对单个荷官评分
    ///
    /// # 返回
    /// - `None`: 荷官没有该游戏的有效资质（启用且未过期）
    pub fn score_dealer(&self, table: &Table, dealer: &Dealer, as_of: NaiveDateTime) -> Option<ScoreBreakdown> {
        let cert = dealer.active_certification_for(table.game_type, as_of.date())?;
        let fairness_score = self.fairness.calculate(dealer, as_of);

        Some(compute_breakdown(
            dealer,
            table,
            cert.proficiency_level,
            fairness_score,
            &self.weights,
            as_of,
        ))
    }

    /// 对候选池全部评分并排序（高分在前；同分保持候选池顺序）
    pub fn rank_candidates(&self, table: &Table, pool: &[Dealer], as_of: NaiveDateTime) -> Vec<ScoredCandidate> {
        let mut ranked: Vec<ScoredCandidate> = pool
            .iter()
            .enumerate()
            .filter_map(|(idx, dealer)| {
                let cert = dealer.active_certification_for(table.game_type, as_of.date())?;
                let breakdown = self.score_dealer(table, dealer, as_of)?;
                Some(ScoredCandidate {
                    dealer_id: dealer.dealer_id.clone(),
                    employee_number: dealer.employee_number.clone(),
                    display_name: dealer.display_name.clone(),
                    proficiency_level: cert.proficiency_level,
                    pool_index: idx,
                    breakdown,
                })
            })
            .collect();

        // sort_by 为稳定排序
        ranked.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
        ranked
    }

    /// 选出最佳候选
    ///
    /// # 返回
    /// - `None`: 候选池中没有可胜任该台的荷官
    pub fn select_best_dealer(&self, table: &Table, pool: &[Dealer], as_of: NaiveDateTime) -> Option<ScoredCandidate> {
        self.rank_candidates(table, pool, as_of).into_iter().next()
    }
}
