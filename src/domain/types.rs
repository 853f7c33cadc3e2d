// ==========================================
// 赌台荷官轮换系统 - 领域类型定义
// ==========================================
// 职责: 游戏类型、熟练度、荷官/赌台状态等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 游戏类型 (Game Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameType {
    Blackjack,
    Roulette,
    Craps,
    PaiGow,
    Baccarat,
    ThreeCardPoker,
    TexasHoldem,
    UltimateTexasHoldem,
    MississippiStud,
    SpanishTwentyOne,
    Other,
}

impl GameType {
    /// 从字符串解析游戏类型（未知值归为 Other）
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "BLACKJACK" => GameType::Blackjack,
            "ROULETTE" => GameType::Roulette,
            "CRAPS" => GameType::Craps,
            "PAI_GOW" => GameType::PaiGow,
            "BACCARAT" => GameType::Baccarat,
            "THREE_CARD_POKER" => GameType::ThreeCardPoker,
            "TEXAS_HOLDEM" => GameType::TexasHoldem,
            "ULTIMATE_TEXAS_HOLDEM" => GameType::UltimateTexasHoldem,
            "MISSISSIPPI_STUD" => GameType::MississippiStud,
            "SPANISH_TWENTY_ONE" => GameType::SpanishTwentyOne,
            _ => GameType::Other,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            GameType::Blackjack => "BLACKJACK",
            GameType::Roulette => "ROULETTE",
            GameType::Craps => "CRAPS",
            GameType::PaiGow => "PAI_GOW",
            GameType::Baccarat => "BACCARAT",
            GameType::ThreeCardPoker => "THREE_CARD_POKER",
            GameType::TexasHoldem => "TEXAS_HOLDEM",
            GameType::UltimateTexasHoldem => "ULTIMATE_TEXAS_HOLDEM",
            GameType::MississippiStud => "MISSISSIPPI_STUD",
            GameType::SpanishTwentyOne => "SPANISH_TWENTY_ONE",
            GameType::Other => "OTHER",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 熟练度 (Proficiency Level)
// ==========================================
// 数值 1-5，参与技能得分计算
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProficiencyLevel {
    Trainee = 1,
    Basic = 2,
    Intermediate = 3,
    Advanced = 4,
    Expert = 5,
}

impl ProficiencyLevel {
    /// 数值等级 (1-5)
    pub fn value(&self) -> i32 {
        *self as i32
    }

    /// 从数值解析，越界值夹到 1..=5
    pub fn from_value(v: i32) -> Self {
        match v {
            i32::MIN..=1 => ProficiencyLevel::Trainee,
            2 => ProficiencyLevel::Basic,
            3 => ProficiencyLevel::Intermediate,
            4 => ProficiencyLevel::Advanced,
            _ => ProficiencyLevel::Expert,
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProficiencyLevel::Trainee => write!(f, "TRAINEE"),
            ProficiencyLevel::Basic => write!(f, "BASIC"),
            ProficiencyLevel::Intermediate => write!(f, "INTERMEDIATE"),
            ProficiencyLevel::Advanced => write!(f, "ADVANCED"),
            ProficiencyLevel::Expert => write!(f, "EXPERT"),
        }
    }
}

// ==========================================
// 花旗骰岗位 (Craps Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrapsRole {
    #[default]
    None,
    Boxman,
    BaseDealer,
    Stickman,
}

impl CrapsRole {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "BOXMAN" => CrapsRole::Boxman,
            "BASE_DEALER" => CrapsRole::BaseDealer,
            "STICKMAN" => CrapsRole::Stickman,
            _ => CrapsRole::None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            CrapsRole::None => "NONE",
            CrapsRole::Boxman => "BOXMAN",
            CrapsRole::BaseDealer => "BASE_DEALER",
            CrapsRole::Stickman => "STICKMAN",
        }
    }
}

// ==========================================
// 荷官状态 (Dealer Status)
// ==========================================
// 状态机:
//   Available → Dealing → OnBreak|OnMeal → Available
//   Dealing|Available → CalledIn / SentHome (当班终态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealerStatus {
    Available, // 空闲
    Dealing,   // 在台
    OnBreak,   // 休息
    OnMeal,    // 用餐
    OffShift,  // 非当班
    SentHome,  // 提前下班
    CalledIn,  // 请假
}

impl DealerStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "DEALING" => DealerStatus::Dealing,
            "ON_BREAK" => DealerStatus::OnBreak,
            "ON_MEAL" => DealerStatus::OnMeal,
            "OFF_SHIFT" => DealerStatus::OffShift,
            "SENT_HOME" => DealerStatus::SentHome,
            "CALLED_IN" => DealerStatus::CalledIn,
            _ => DealerStatus::Available,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            DealerStatus::Available => "AVAILABLE",
            DealerStatus::Dealing => "DEALING",
            DealerStatus::OnBreak => "ON_BREAK",
            DealerStatus::OnMeal => "ON_MEAL",
            DealerStatus::OffShift => "OFF_SHIFT",
            DealerStatus::SentHome => "SENT_HOME",
            DealerStatus::CalledIn => "CALLED_IN",
        }
    }

    /// 当班终态：不可再被派台
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DealerStatus::OffShift | DealerStatus::SentHome | DealerStatus::CalledIn
        )
    }

    /// 由当前占用情况推导荷官状态
    ///
    /// 优先级: 终态 > 在台 > 休息/用餐 > 空闲
    ///
    /// # 参数
    /// - `terminal`: 已有的终态（若荷官当前为终态）
    /// - `has_current`: 是否持有进行中的当前派台
    /// - `open_break`: 未结束的休息记录类型
    pub fn project(
        terminal: Option<DealerStatus>,
        has_current: bool,
        open_break: Option<BreakType>,
    ) -> DealerStatus {
        if let Some(status) = terminal.filter(|s| s.is_terminal()) {
            return status;
        }
        if has_current {
            return DealerStatus::Dealing;
        }
        match open_break {
            Some(BreakType::Meal) => DealerStatus::OnMeal,
            Some(BreakType::Break) => DealerStatus::OnBreak,
            None => DealerStatus::Available,
        }
    }
}

impl fmt::Display for DealerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 赌台状态 (Table Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Closed,      // 关台
    Open,        // 开台
    NeedsDealer, // 待派荷官
    Locked,      // 锁定
}

impl TableStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "OPEN" => TableStatus::Open,
            "NEEDS_DEALER" => TableStatus::NeedsDealer,
            "LOCKED" => TableStatus::Locked,
            _ => TableStatus::Closed,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            TableStatus::Closed => "CLOSED",
            TableStatus::Open => "OPEN",
            TableStatus::NeedsDealer => "NEEDS_DEALER",
            TableStatus::Locked => "LOCKED",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 休息类型 (Break Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakType {
    Break, // 常规休息
    Meal,  // 用餐
}

impl BreakType {
    /// 调用方传入的字符串: "Meal" 视为用餐，其余均为常规休息
    pub fn from_str(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("meal") {
            BreakType::Meal
        } else {
            BreakType::Break
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            BreakType::Break => "Break",
            BreakType::Meal => "Meal",
        }
    }
}

impl fmt::Display for BreakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
