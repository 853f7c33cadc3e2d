// ==========================================
// 赌台荷官轮换系统 - 配置层
// ==========================================
// 职责: 轮换参数管理（间隔、评分权重、匹配策略）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod rotation_config;
pub mod rotation_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use rotation_config::{MatchingStrategy, RotationConfig, ScoringWeights};
pub use rotation_config_trait::RotationConfigReader;
