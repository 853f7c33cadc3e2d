// ==========================================
// 赌台荷官轮换系统 - 荷官领域模型
// ==========================================
// 职责: 荷官主数据、资质证书、历史派台记录
// 红线: 不含数据访问逻辑
// ==========================================

use crate::domain::types::{CrapsRole, DealerStatus, GameType, ProficiencyLevel};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Dealer - 荷官
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dealer {
    // ===== 主键 =====
    pub dealer_id: String,
    pub employee_number: String,
    pub display_name: String,

    // ===== 状态 =====
    pub status: DealerStatus,
    pub seniority_level: i32,

    // ===== 班次窗口 =====
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,

    // ===== 休息时间戳 =====
    pub last_break_time: Option<NaiveDateTime>,
    pub last_meal_time: Option<NaiveDateTime>,

    pub preferred_pit: Option<String>,

    // ===== 关联数据 (由仓储加载) =====
    pub certifications: Vec<Certification>,
    pub assignment_history: Vec<HistoricalAssignment>, // 按 start_time 升序

    // ===== 乐观锁 =====
    pub revision: i64,
}

impl Dealer {
    /// 查找指定游戏可用的资质
    ///
    /// 只考虑 is_active 且未过期的证书；同一游戏存在多张有效证书时取最高熟练度。
    pub fn active_certification_for(
        &self,
        game_type: GameType,
        as_of: NaiveDate,
    ) -> Option<&Certification> {
        self.certifications
            .iter()
            .filter(|c| c.game_type == game_type && c.is_valid_on(as_of))
            .max_by_key(|c| c.proficiency_level)
    }

    /// 最近一次派台（按开始时间）
    pub fn most_recent_assignment(&self) -> Option<&HistoricalAssignment> {
        self.assignment_history.iter().max_by_key(|a| a.start_time)
    }
}

// ==========================================
// Certification - 游戏资质
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certification {
    pub certification_id: String,
    pub dealer_id: String,
    pub game_type: GameType,
    pub proficiency_level: ProficiencyLevel,
    pub craps_role: CrapsRole,
    pub certified_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    pub is_active: bool,
}

impl Certification {
    /// 在指定日期是否有效（启用且未过期）
    pub fn is_valid_on(&self, as_of: NaiveDate) -> bool {
        self.is_active && self.expiration_date.map_or(true, |exp| exp >= as_of)
    }
}

// ==========================================
// HistoricalAssignment - 历史派台记录
// ==========================================
// 用途: 公平性计算（游戏多样性 + 当日工作量）、动线判断
// 说明: game_type / pit 由仓储从 tables 表联查得到
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalAssignment {
    pub assignment_id: String,
    pub table_id: String,
    pub game_type: GameType,
    pub pit: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cert(game_type: GameType, level: ProficiencyLevel, active: bool, exp: Option<NaiveDate>) -> Certification {
        Certification {
            certification_id: format!("c-{}-{}", game_type, level.value()),
            dealer_id: "d1".to_string(),
            game_type,
            proficiency_level: level,
            craps_role: CrapsRole::None,
            certified_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expiration_date: exp,
            is_active: active,
        }
    }

    fn dealer_with(certifications: Vec<Certification>) -> Dealer {
        Dealer {
            dealer_id: "d1".to_string(),
            employee_number: "E001".to_string(),
            display_name: "Test Dealer".to_string(),
            status: DealerStatus::Available,
            seniority_level: 0,
            shift_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            shift_end: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            last_break_time: None,
            last_meal_time: None,
            preferred_pit: None,
            certifications,
            assignment_history: Vec::new(),
            revision: 0,
        }
    }

    #[test]
    fn test_expired_and_inactive_certifications_are_ignored() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let dealer = dealer_with(vec![
            cert(GameType::Blackjack, ProficiencyLevel::Expert, false, None),
            cert(
                GameType::Blackjack,
                ProficiencyLevel::Advanced,
                true,
                Some(NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()),
            ),
        ]);

        assert!(dealer.active_certification_for(GameType::Blackjack, today).is_none());
    }

    #[test]
    fn test_highest_valid_certification_wins() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let dealer = dealer_with(vec![
            cert(GameType::Roulette, ProficiencyLevel::Basic, true, None),
            cert(GameType::Roulette, ProficiencyLevel::Advanced, true, Some(today)),
        ]);

        let found = dealer.active_certification_for(GameType::Roulette, today).unwrap();
        assert_eq!(found.proficiency_level, ProficiencyLevel::Advanced);
    }
}
