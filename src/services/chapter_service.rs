//! 章节生成服务 - 业务能力层
//!
//! 只负责"生成单章正文"能力，不关心流程
//!
//! 单章失败由调用方兜底（固定文案替换），本服务只如实上报错误

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ChapterError};
use crate::models::ChapterOutline;

/// 章节生成服务
///
/// 职责：
/// - 一次网关调用，生成一章的 Markdown 正文
/// - 只处理单个章节
/// - 不出现 Vec<ChapterContent>
/// - 不关心章节顺序
#[derive(Clone)]
pub struct ChapterService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl ChapterService {
    /// 创建新的章节生成服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.gemini_api_key)
            .with_api_base(&config.chat_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.text_model_name.clone(),
        }
    }

    /// 生成单章正文
    ///
    /// # 参数
    /// - `book_title`: 书名
    /// - `outline`: 本章大纲
    /// - `index`: 章节索引（从 0 开始）
    ///
    /// # 返回
    /// 返回生成的 Markdown 正文
    pub async fn generate_chapter(
        &self,
        book_title: &str,
        outline: &ChapterOutline,
        index: usize,
    ) -> AppResult<String> {
        debug!(
            "调用章节生成 API，模型: {}, 章节: {}",
            self.model_name,
            index + 1
        );

        let prompt = Self::build_chapter_prompt(book_title, outline, index);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AppError::chapter_api_failed(index, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .build()
            .map_err(|e| AppError::chapter_api_failed(index, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("第 {} 章生成 API 调用失败: {}", index + 1, e);
            AppError::chapter_api_failed(index, e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(AppError::Chapter(ChapterError::EmptyContent { index }))?;

        debug!(
            "第 {} 章生成成功，正文长度: {} 字符",
            index + 1,
            content.len()
        );

        Ok(content)
    }

    /// 构建章节生成提示词
    ///
    /// 固定的格式和篇幅要求：Markdown、最少 800 词、不重复章节标题
    pub(crate) fn build_chapter_prompt(
        book_title: &str,
        outline: &ChapterOutline,
        index: usize,
    ) -> String {
        format!(
            r#"Você é o autor do livro "{}".
Escreva o conteúdo completo do Capítulo {}: "{}".

Contexto/Outline do capítulo: {}

Requisitos:
- Escreva em Português do Brasil.
- Use formatação Markdown (títulos, subtítulos, listas, negrito).
- O texto deve ser profundo, educativo e prático.
- Mínimo de 800 palavras.
- NÃO inclua o título do capítulo no início (ele será adicionado automaticamente). Comece com uma introdução engajadora."#,
            book_title,
            index + 1,
            outline.title,
            outline.outline
        )
    }
}
