use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// 方案要求的固定章节数
pub const PLANNED_CHAPTER_COUNT: usize = 10;

/// 章节大纲
///
/// 书籍方案的一部分，章节生成的只读输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterOutline {
    pub title: String,
    pub outline: String,
}

impl std::fmt::Display for ChapterOutline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 截断大纲内容以便显示（最多80个字符）
        let outline_preview = if self.outline.chars().count() > 80 {
            self.outline.chars().take(80).collect::<String>() + "..."
        } else {
            self.outline.clone()
        };
        write!(f, "{} — {}", self.title, outline_preview)
    }
}

/// 书籍方案
///
/// 由 AI 一次性生成的完整蓝图：书名、副标题、销售文案、封面视觉提示词
/// 和固定数量的章节大纲。创建后不可变，会话期间由状态机持有。
///
/// 字段名与网关返回的 JSON 保持 camelCase 对应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPlan {
    pub title: String,
    pub subtitle: String,
    pub sales_description: String,
    pub cover_visual_prompt: String,
    pub chapters: Vec<ChapterOutline>,
}

impl BookPlan {
    /// 方案的实际章节数
    ///
    /// 进度条分母从这里取值，而不是写死的常量
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

/// 章节内容
///
/// 生成开始时批量创建，每章生成结束后按索引原地替换一次。
/// 永远不会被移除；终态要么是生成的正文，要么是固定的兜底文案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterContent {
    /// 章节位置（稳定标识）
    pub index: usize,
    /// 章节标题（从大纲复制）
    pub title: String,
    /// Markdown 正文（生成前为空）
    pub content: String,
    pub is_generating: bool,
    pub is_complete: bool,
}

impl ChapterContent {
    /// 创建等待生成的章节记录
    pub fn pending(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            content: String::new(),
            is_generating: true,
            is_complete: false,
        }
    }

    /// 生成结束，写入终态内容
    pub fn finish(&mut self, content: String) {
        self.content = content;
        self.is_generating = false;
        self.is_complete = true;
    }
}

/// 封面图片
///
/// 独立于章节状态异步获取；缺失是合法的"加载中"状态，不是错误
#[derive(Debug, Clone)]
pub struct CoverImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl CoverImage {
    /// 转为可直接嵌入 HTML 的 data URI
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_deserializes_camel_case() {
        let json = r#"{
            "title": "Dieta Low Carb Definitiva",
            "subtitle": "O guia completo",
            "salesDescription": "Um parágrafo de vendas.",
            "coverVisualPrompt": "Abstract professional cover",
            "chapters": [
                { "title": "Capítulo um", "outline": "- ponto a\n- ponto b" }
            ]
        }"#;

        let plan: BookPlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.title, "Dieta Low Carb Definitiva");
        assert_eq!(plan.sales_description, "Um parágrafo de vendas.");
        assert_eq!(plan.cover_visual_prompt, "Abstract professional cover");
        assert_eq!(plan.chapter_count(), 1);
        assert_eq!(plan.chapters[0].title, "Capítulo um");
    }

    #[test]
    fn test_chapter_content_lifecycle() {
        let mut chapter = ChapterContent::pending(3, "Capítulo 4");
        assert!(chapter.is_generating);
        assert!(!chapter.is_complete);
        assert!(chapter.content.is_empty());

        chapter.finish("## Texto gerado".to_string());
        assert!(!chapter.is_generating);
        assert!(chapter.is_complete);
        assert_eq!(chapter.content, "## Texto gerado");
        // 索引是稳定标识，不随状态变化
        assert_eq!(chapter.index, 3);
    }

    #[test]
    fn test_cover_image_data_uri() {
        let cover = CoverImage {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            mime_type: "image/png".to_string(),
        };
        let uri = cover.to_data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(uri, "data:image/png;base64,iVBORw==");
    }
}
