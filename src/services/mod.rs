//! 业务能力层
//!
//! 每个服务只描述"我能做什么"，只处理单次网关调用，不关心流程顺序：
//! - `PlanService` - 生成书籍方案能力（结构化输出）
//! - `ChapterService` - 生成单章正文能力
//! - `CoverService` - 生成封面图片能力

pub mod chapter_service;
pub mod cover_service;
pub mod plan_service;

pub use chapter_service::ChapterService;
pub use cover_service::CoverService;
pub use plan_service::PlanService;
