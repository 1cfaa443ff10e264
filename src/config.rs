/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// Gemini API 访问凭证
    pub gemini_api_key: String,
    /// OpenAI 兼容聊天端点（方案 + 章节生成）
    pub chat_api_base_url: String,
    /// 原生 REST 端点（封面图片生成）
    pub image_api_base_url: String,
    /// 文本生成模型
    pub text_model_name: String,
    /// 图片生成模型
    pub image_model_name: String,
    /// 导出的 HTML 文件路径
    pub export_html_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            chat_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            image_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model_name: "gemini-2.5-flash".to_string(),
            image_model_name: "gemini-3-pro-image-preview".to_string(),
            export_html_file: "ebook.html".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or(default.gemini_api_key),
            chat_api_base_url: std::env::var("CHAT_API_BASE_URL").unwrap_or(default.chat_api_base_url),
            image_api_base_url: std::env::var("IMAGE_API_BASE_URL").unwrap_or(default.image_api_base_url),
            text_model_name: std::env::var("TEXT_MODEL_NAME").unwrap_or(default.text_model_name),
            image_model_name: std::env::var("IMAGE_MODEL_NAME").unwrap_or(default.image_model_name),
            export_html_file: std::env::var("EXPORT_HTML_FILE").unwrap_or(default.export_html_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}
