//! 展示层
//!
//! 当前状态的纯渲染，不含任何独立逻辑：
//! - `views` - 五个互斥的终端视图（落地页 / 方案生成中 / 评审 / 生成进度 / 成书阅读）
//! - `printer` - 打印导出：生成分页的 HTML 文件，按章节顺序包含全部已完成章节

pub mod printer;
pub mod views;
