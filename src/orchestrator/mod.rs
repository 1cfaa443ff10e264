//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整个会话的调度，是系统的"指挥中心"。
//!
//! ### `app` - 应用主循环
//! - 管理应用生命周期（初始化、运行）
//! - 持有 Config、各服务和会话状态机
//! - 读取用户输入，转成会话事件
//! - 按当前状态分发到对应视图
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (会话主循环)
//!     ↓
//! workflow::BookFlow / Session (生成编排 + 状态机)
//!     ↓
//! services (能力层：plan / chapter / cover)
//!     ↓
//! render (展示层：终端视图 + HTML 导出)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：App 只做调度，不做具体业务判断
//! 2. **显式状态**：所有状态变化都经过 Session 的事件转换
//! 3. **向下依赖**：编排层 → workflow → services

pub mod app;

pub use app::App;
