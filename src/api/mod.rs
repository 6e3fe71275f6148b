// ==========================================
// Bullet Points - API层
// ==========================================
// 职责: 组装连接/配置/协作者/编排器,对外提供单一入口
// ==========================================

pub mod bullet_points_api;
pub mod error;

pub use bullet_points_api::{parse_id_list, parse_sku_list, BulletPointsApi, GenerateRequest};
pub use error::{ApiError, ApiResult};
