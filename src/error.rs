use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 书籍方案生成错误
    Plan(PlanError),
    /// 章节生成错误
    Chapter(ChapterError),
    /// 封面生成错误
    Cover(CoverError),
    /// 导出错误
    Export(ExportError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Plan(e) => write!(f, "方案错误: {}", e),
            AppError::Chapter(e) => write!(f, "章节错误: {}", e),
            AppError::Cover(e) => write!(f, "封面错误: {}", e),
            AppError::Export(e) => write!(f, "导出错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Plan(e) => Some(e),
            AppError::Chapter(e) => Some(e),
            AppError::Cover(e) => Some(e),
            AppError::Export(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 书籍方案生成错误
///
/// 方案失败是唯一会阻断流程、直接展示给用户的错误
#[derive(Debug)]
pub enum PlanError {
    /// 主题为空
    EmptyTopic,
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyResponse {
        model: String,
    },
    /// 返回的 JSON 结构无法解析
    MalformedPlan {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 章节数量不符合要求
    WrongChapterCount {
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::EmptyTopic => write!(f, "书籍主题不能为空"),
            PlanError::ApiCallFailed { model, source } => {
                write!(f, "方案生成 API 调用失败 (模型: {}): {}", model, source)
            }
            PlanError::EmptyResponse { model } => {
                write!(f, "方案生成返回内容为空 (模型: {})", model)
            }
            PlanError::MalformedPlan { source } => {
                write!(f, "方案 JSON 解析失败: {}", source)
            }
            PlanError::WrongChapterCount { expected, actual } => {
                write!(f, "方案章节数量错误: 期望 {} 个, 实际 {} 个", expected, actual)
            }
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanError::ApiCallFailed { source, .. } | PlanError::MalformedPlan { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 章节生成错误
///
/// 单个章节失败不会中断顺序生成，调用方用固定的兜底文案替换内容
#[derive(Debug)]
pub enum ChapterError {
    /// API 调用失败
    ApiCallFailed {
        index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyContent {
        index: usize,
    },
}

impl fmt::Display for ChapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterError::ApiCallFailed { index, source } => {
                write!(f, "第 {} 章生成 API 调用失败: {}", index + 1, source)
            }
            ChapterError::EmptyContent { index } => {
                write!(f, "第 {} 章生成内容为空", index + 1)
            }
        }
    }
}

impl std::error::Error for ChapterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChapterError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 封面生成错误
///
/// 只记录日志，永远不展示给用户；封面保持"加载中"状态
#[derive(Debug)]
pub enum CoverError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 响应 JSON 解析失败
    BadPayload {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 响应中没有内嵌图片部分
    NoImagePart,
    /// Base64 图片数据解码失败
    DecodeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for CoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverError::RequestFailed { endpoint, source } => {
                write!(f, "封面请求失败 ({}): {}", endpoint, source)
            }
            CoverError::BadPayload { source } => {
                write!(f, "封面响应解析失败: {}", source)
            }
            CoverError::NoImagePart => write!(f, "封面响应中没有图片数据"),
            CoverError::DecodeFailed { source } => {
                write!(f, "封面图片 Base64 解码失败: {}", source)
            }
        }
    }
}

impl std::error::Error for CoverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoverError::RequestFailed { source, .. }
            | CoverError::BadPayload { source }
            | CoverError::DecodeFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            CoverError::NoImagePart => None,
        }
    }
}

/// 导出错误
#[derive(Debug)]
pub enum ExportError {
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Plan(PlanError::MalformedPlan {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建方案 API 调用错误
    pub fn plan_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Plan(PlanError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建章节 API 调用错误
    pub fn chapter_api_failed(
        index: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Chapter(ChapterError::ApiCallFailed {
            index,
            source: Box::new(source),
        })
    }

    /// 创建封面请求错误
    pub fn cover_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Cover(CoverError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建导出写入错误
    pub fn export_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Export(ExportError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
