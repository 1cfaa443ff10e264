//! 方案生成服务 - 业务能力层
//!
//! 只负责"生成书籍方案"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 通过自定义 API 端点访问 Gemini 的 OpenAI 兼容接口
//! - 使用结构化输出（JSON Schema）约束方案形状

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, PlanError};
use crate::models::{BookPlan, PLANNED_CHAPTER_COUNT};

/// 方案生成服务
///
/// 职责：
/// - 一次网关调用，生成完整的书籍方案
/// - 校验返回的结构（固定章节数）
/// - 失败不重试，错误直接上抛给调用方
pub struct PlanService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl PlanService {
    /// 创建新的方案生成服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（Gemini 的 OpenAI 兼容端点）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.gemini_api_key)
            .with_api_base(&config.chat_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.text_model_name.clone(),
        }
    }

    /// 生成书籍方案
    ///
    /// # 参数
    /// - `topic`: 书籍主题（非空）
    ///
    /// # 返回
    /// 返回校验过的 `BookPlan`（恰好 10 个章节大纲）
    pub async fn generate_plan(&self, topic: &str) -> AppResult<BookPlan> {
        if topic.trim().is_empty() {
            return Err(AppError::Plan(PlanError::EmptyTopic));
        }

        debug!("调用方案生成 API，模型: {}", self.model_name);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(Self::build_plan_prompt(topic))
            .build()
            .map_err(|e| AppError::plan_api_failed(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(0.7)
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: "book_plan".to_string(),
                    description: None,
                    schema: Some(Self::plan_schema()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| AppError::plan_api_failed(&self.model_name, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("方案生成 API 调用失败: {}", e);
            AppError::plan_api_failed(&self.model_name, e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                AppError::Plan(PlanError::EmptyResponse {
                    model: self.model_name.clone(),
                })
            })?;

        debug!("方案生成 API 调用成功，响应长度: {} 字符", content.len());

        Self::parse_plan_response(&content)
    }

    /// 构建方案生成提示词
    ///
    /// 固定的作者语气与语言要求：巴西葡萄牙语、权威且有吸引力的畅销书编辑口吻
    fn build_plan_prompt(topic: &str) -> String {
        format!(
            r#"Atue como um editor de livros best-seller. Crie um plano completo para um eBook profissional sobre o tema: "{}".
O eBook deve ter exatamente {} capítulos. O conteúdo deve ser em Português do Brasil.
O tom deve ser autoritário, engajador e lucrativo."#,
            topic, PLANNED_CHAPTER_COUNT
        )
    }

    /// 方案的结构化输出 Schema
    fn plan_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "A catchy, best-selling title for the ebook"
                },
                "subtitle": {
                    "type": "string",
                    "description": "A compelling subtitle"
                },
                "salesDescription": {
                    "type": "string",
                    "description": "A marketing paragraph designed to sell the book"
                },
                "coverVisualPrompt": {
                    "type": "string",
                    "description": "A highly detailed visual description for an image generator to create a book cover. Abstract, professional, high quality."
                },
                "chapters": {
                    "type": "array",
                    "description": "Exactly 10 chapters",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "outline": {
                                "type": "string",
                                "description": "Brief bullet points of what this chapter covers"
                            }
                        },
                        "required": ["title", "outline"]
                    }
                }
            },
            "required": ["title", "subtitle", "salesDescription", "coverVisualPrompt", "chapters"]
        })
    }

    /// 解析并校验方案响应
    ///
    /// 网关偶尔会把结构化输出包在 Markdown 代码块里，先剥掉再解析
    pub(crate) fn parse_plan_response(raw: &str) -> AppResult<BookPlan> {
        let cleaned = Self::strip_code_fence(raw);

        let plan: BookPlan = serde_json::from_str(cleaned).map_err(|e| {
            warn!("方案 JSON 解析失败: {}", e);
            AppError::Plan(PlanError::MalformedPlan {
                source: Box::new(e),
            })
        })?;

        if plan.chapters.len() != PLANNED_CHAPTER_COUNT {
            return Err(AppError::Plan(PlanError::WrongChapterCount {
                expected: PLANNED_CHAPTER_COUNT,
                actual: plan.chapters.len(),
            }));
        }

        Ok(plan)
    }

    /// 剥掉 Markdown 代码块围栏（```json ... ```）
    fn strip_code_fence(raw: &str) -> &str {
        let trimmed = raw.trim();
        let Some(rest) = trimmed.strip_prefix("```") else {
            return trimmed;
        };
        // 跳过语言标记行（例如 "json"）
        let body = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest,
        };
        body.strip_suffix("```").unwrap_or(body).trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_json(chapter_count: usize) -> String {
        let chapters: Vec<String> = (0..chapter_count)
            .map(|i| format!(r#"{{ "title": "Capítulo {}", "outline": "- tópico" }}"#, i + 1))
            .collect();
        format!(
            r#"{{
                "title": "Dieta Low Carb Definitiva",
                "subtitle": "Emagreça com ciência",
                "salesDescription": "O guia que vende.",
                "coverVisualPrompt": "Minimalist abstract shapes",
                "chapters": [{}]
            }}"#,
            chapters.join(",")
        )
    }

    #[test]
    fn test_parse_plan_response_valid() {
        let plan = PlanService::parse_plan_response(&plan_json(10)).unwrap();
        assert_eq!(plan.title, "Dieta Low Carb Definitiva");
        assert_eq!(plan.chapter_count(), 10);
    }

    #[test]
    fn test_parse_plan_response_with_code_fence() {
        let fenced = format!("```json\n{}\n```", plan_json(10));
        let plan = PlanService::parse_plan_response(&fenced).unwrap();
        assert_eq!(plan.chapter_count(), 10);
    }

    #[test]
    fn test_parse_plan_response_wrong_chapter_count() {
        let err = PlanService::parse_plan_response(&plan_json(7)).unwrap_err();
        assert!(err.to_string().contains("7"));
    }

    #[test]
    fn test_parse_plan_response_malformed() {
        assert!(PlanService::parse_plan_response("não é json").is_err());
        assert!(PlanService::parse_plan_response("").is_err());
    }

    #[test]
    fn test_build_plan_prompt_mentions_topic_and_count() {
        let prompt = PlanService::build_plan_prompt("Dieta Low Carb");
        assert!(prompt.contains("Dieta Low Carb"));
        assert!(prompt.contains("exatamente 10 capítulos"));
        assert!(prompt.contains("Português do Brasil"));
    }
}
