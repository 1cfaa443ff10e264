//! 流程层
//!
//! 定义"一本书"的完整生成流程：
//! - `session` - 显式状态容器；(状态, 事件) → 新状态 的纯函数转换
//! - `book_flow` - 生成编排（封面任务 + 顺序章节循环），只依赖业务能力层

pub mod book_flow;
pub mod session;

pub use book_flow::BookFlow;
pub use session::{ChapterView, Session, SessionEvent, SessionState, CHAPTER_FALLBACK_TEXT};
