// ==========================================
// 赌台荷官轮换系统 - API 层
// ==========================================
// 职责: 对外业务接口，统一结果封装 + 审计落库
// 约定: 业务失败 -> OperationResult{success: false}
//       存储失败 -> Err(ApiError)
// ==========================================

pub mod config_api;
pub mod error;
pub mod result;
pub mod roster_api;
pub mod rotation_api;
pub mod string_api;

// 重导出核心类型
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use result::OperationResult;
pub use roster_api::{NewCertification, NewDealer, NewTable, RosterApi};
pub use rotation_api::RotationApi;
pub use string_api::StringApi;
