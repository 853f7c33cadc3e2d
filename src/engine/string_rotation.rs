// ==========================================
// 赌台荷官轮换系统 - 轮换组服务
// ==========================================
// 职责: 按轮换组整体派台 + 组成员/赌台管理
// 配对规则: 有效成员按轮换顺序 × 组内开台赌台按台号，逐位配对
// ==========================================

mod core;
mod members;


pub use core::{StringRotationResult, StringRotationService};
