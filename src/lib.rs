//! # eBook Publisher
//!
//! 一个把主题变成可售卖电子书的 Rust 应用程序：
//! 收集主题 → 生成书籍方案 → 用户批准 → 逐章生成正文（封面并行）→ 阅读与导出
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单次网关调用
//! - `PlanService` - 书籍方案生成能力（结构化输出）
//! - `ChapterService` - 单章正文生成能力
//! - `CoverService` - 封面图片生成能力
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一本书"的完整生成流程
//! - `Session` - 显式状态容器，(状态, 事件) → 新状态 的纯函数转换
//! - `BookFlow` - 生成编排（封面任务 + 顺序章节循环）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/app` - 会话主循环，读输入、发事件、分发视图
//!
//! ### ④ 展示层（Render）
//! - `render/` - 当前状态的纯渲染（终端视图 + 打印导出）
//!
//! ## 并发模型
//!
//! 单逻辑线程协作调度：章节调用按索引全序逐个 await；封面调用是唯一
//! 的例外，循环开始前 spawn 一次，结果什么时候到就什么时候应用。
//! 不支持取消在途调用。

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{BookPlan, ChapterContent, ChapterOutline, CoverImage, PLANNED_CHAPTER_COUNT};
pub use orchestrator::App;
pub use services::{ChapterService, CoverService, PlanService};
pub use workflow::{BookFlow, ChapterView, Session, SessionEvent, SessionState};
