//! 领域模型
//!
//! 电子书生成过程中的全部数据结构：
//! - `BookPlan` / `ChapterOutline` - AI 一次性生成的书籍蓝图（创建后不可变）
//! - `ChapterContent` - 逐章生成过程中的可变记录
//! - `CoverImage` - 封面图片数据

pub mod book;

pub use book::{BookPlan, ChapterContent, ChapterOutline, CoverImage, PLANNED_CHAPTER_COUNT};
