// ==========================================
// 赌台荷官轮换系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 轮换决策支持（派台/推送/休息/排班，人工最终控制权）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 轮换规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{BreakType, CrapsRole, DealerStatus, GameType, ProficiencyLevel, TableStatus};

// 领域实体
pub use domain::{ActionType, Assignment, AuditLog, BreakRecord, Dealer, RotationString, Table};

// 引擎
pub use engine::{DealerSelector, RotationEngine, Scheduler, StringRotationService};

// API
pub use api::{ConfigApi, OperationResult, RosterApi, RotationApi, StringApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "赌台荷官轮换系统";
