// ==========================================
// 赌台荷官轮换系统 - 轮换配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::rotation_config::{MatchingStrategy, RotationConfig, ScoringWeights};
use std::error::Error;

// ==========================================
// RotationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait RotationConfigReader: Send + Sync {
    // ===== 时间间隔 =====

    /// 推送间隔（分钟），默认 20
    fn get_push_interval_minutes(&self) -> Result<i64, Box<dyn Error>>;

    /// 休息间隔（分钟），默认 120
    fn get_break_interval_minutes(&self) -> Result<i64, Box<dyn Error>>;

    /// 用餐时限（小时），默认 5
    fn get_meal_deadline_hours(&self) -> Result<i64, Box<dyn Error>>;

    // ===== 评分 =====

    fn get_scoring_weights(&self) -> Result<ScoringWeights, Box<dyn Error>>;

    /// 排班匹配策略，默认 GREEDY
    fn get_matching_strategy(&self) -> Result<MatchingStrategy, Box<dyn Error>>;

    /// 一次性读取全部参数
    fn load_rotation_config(&self) -> Result<RotationConfig, Box<dyn Error>> {
        Ok(RotationConfig {
            push_interval_minutes: self.get_push_interval_minutes()?,
            break_interval_minutes: self.get_break_interval_minutes()?,
            meal_deadline_hours: self.get_meal_deadline_hours()?,
            weights: self.get_scoring_weights()?,
            matching_strategy: self.get_matching_strategy()?,
        })
    }
}
