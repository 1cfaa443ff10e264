//! 封面生成服务 - 业务能力层
//!
//! 只负责"生成封面图片"能力，不关心流程
//!
//! 图片生成走 Gemini 原生 REST 端点（OpenAI 兼容层不覆盖 imageConfig），
//! 响应里的内容 parts 中混有文本和内嵌图片，取第一个图片 part

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, CoverError};
use crate::models::CoverImage;

/// 固定的封面风格前缀，拼在视觉提示词前面
const COVER_STYLE_PREFIX: &str = "A professional, minimalistic, high-end book cover art. No text.";

/// 封面生成服务
///
/// 职责：
/// - 一次网关调用，生成封面图片
/// - 提取响应中的内嵌图片字节
/// - 失败由调用方决定如何处理（流程上是 fire-and-forget，只记日志）
#[derive(Clone)]
pub struct CoverService {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model_name: String,
}

impl CoverService {
    /// 创建新的封面生成服务
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.gemini_api_key.clone(),
            api_base: config.image_api_base_url.clone(),
            model_name: config.image_model_name.clone(),
        }
    }

    /// 生成封面图片
    ///
    /// # 参数
    /// - `visual_prompt`: 方案里的封面视觉提示词
    ///
    /// # 返回
    /// 返回解码后的图片字节和 MIME 类型
    pub async fn generate_cover(&self, visual_prompt: &str) -> AppResult<CoverImage> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.api_base, self.model_name
        );

        debug!("调用封面生成 API，模型: {}", self.model_name);

        let body = json!({
            "contents": [{
                "parts": [{
                    "text": format!("{} {}", COVER_STYLE_PREFIX, visual_prompt)
                }]
            }],
            "generationConfig": {
                "imageConfig": {
                    "aspectRatio": "3:4",
                    "imageSize": "1K"
                }
            }
        });

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("封面请求发送失败: {}", e);
                AppError::cover_request_failed(&endpoint, e)
            })?;

        let payload: Value = response.json().await.map_err(|e| {
            warn!("封面响应读取失败: {}", e);
            AppError::Cover(CoverError::BadPayload {
                source: Box::new(e),
            })
        })?;

        let cover = Self::extract_inline_image(&payload)?;

        debug!(
            "封面生成成功: {} ({} 字节)",
            cover.mime_type,
            cover.bytes.len()
        );

        Ok(cover)
    }

    /// 从响应中提取第一个内嵌图片 part
    ///
    /// 响应形状: candidates[0].content.parts[*].inlineData.{mimeType, data}
    pub(crate) fn extract_inline_image(payload: &Value) -> AppResult<CoverImage> {
        let parts = payload
            .get("candidates")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.get("parts"))
            .and_then(|v| v.as_array())
            .ok_or(AppError::Cover(CoverError::NoImagePart))?;

        for part in parts {
            let Some(inline) = part.get("inlineData") else {
                continue;
            };
            let Some(data) = inline.get("data").and_then(|v| v.as_str()) else {
                continue;
            };

            let bytes = STANDARD.decode(data).map_err(|e| {
                AppError::Cover(CoverError::DecodeFailed {
                    source: Box::new(e),
                })
            })?;

            let mime_type = inline
                .get("mimeType")
                .and_then(|v| v.as_str())
                .unwrap_or("image/png")
                .to_string();

            return Ok(CoverImage { bytes, mime_type });
        }

        Err(AppError::Cover(CoverError::NoImagePart))
    }
}
