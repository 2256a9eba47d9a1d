use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 用户输入校验错误
    #[error("输入错误: {0}")]
    Validation(#[from] ValidationError),
    /// 持久化错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 远程题目生成错误
    #[error("题目生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 用户输入校验错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 专题名称为空
    #[error("专题名称不能为空")]
    EmptyTopicName,
    /// 题目列表为空
    #[error("请至少添加一道题目")]
    EmptyQuestionList,
    /// 生成题目时没有样题
    #[error("请先提供一些样题")]
    BlankGenerationSource,
    /// 上传的文件不是 PDF
    #[error("文件类型不是 PDF: {mime}")]
    NotPdf { mime: String },
    /// 专题不存在
    #[error("专题不存在: {name}")]
    UnknownTopic { name: String },
}

/// 持久化错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 写入失败
    #[error("写入 {key} 失败: {source}")]
    WriteFailed { key: String, source: BoxError },
    /// 读取失败（键不存在不算失败）
    #[error("读取 {key} 失败: {source}")]
    ReadFailed { key: String, source: BoxError },
    /// 序列化失败
    #[error("序列化专题列表失败: {source}")]
    SerializeFailed { source: BoxError },
}

/// 远程题目生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 网络请求失败
    #[error("请求 {endpoint} 失败: {source}")]
    RequestFailed { endpoint: String, source: BoxError },
    /// 服务端返回非 2xx 状态
    #[error("服务返回错误状态 {status}: {body}")]
    BadStatus { status: u16, body: String },
    /// 响应结构不符合预期
    #[error("响应格式不正确: {reason}")]
    MalformedResponse { reason: String },
    /// 已有请求在进行中
    #[error("已有生成请求正在进行")]
    AlreadyInFlight,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件 {path} 失败: {source}")]
    FileReadFailed { path: String, source: BoxError },
    /// TOML 解析失败
    #[error("解析配置文件 {path} 失败: {source}")]
    TomlParseFailed { path: String, source: BoxError },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建存储写入错误
    pub fn storage_write_failed(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::WriteFailed {
            key: key.into(),
            source: Box::new(source),
        })
    }

    /// 创建存储读取错误
    pub fn storage_read_failed(
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Storage(StorageError::ReadFailed {
            key: key.into(),
            source: Box::new(source),
        })
    }

    /// 创建生成请求失败错误
    pub fn generation_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Generation(GenerationError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建响应格式错误
    pub fn malformed_response(reason: impl Into<String>) -> Self {
        AppError::Generation(GenerationError::MalformedResponse {
            reason: reason.into(),
        })
    }

    /// 是否需要提示给用户（配置错误只在启动时记录日志）
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, AppError::Config(_))
    }

    /// 给用户看的提示文案
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(ValidationError::EmptyTopicName) => {
                "Please enter both topic name and questions".to_string()
            }
            AppError::Validation(ValidationError::EmptyQuestionList) => {
                "Please add at least one question".to_string()
            }
            AppError::Validation(ValidationError::BlankGenerationSource) => {
                "Please provide some sample questions first".to_string()
            }
            AppError::Validation(e) => e.to_string(),
            AppError::Storage(_) => "Error saving topics. Please try again.".to_string(),
            AppError::Generation(GenerationError::AlreadyInFlight) => {
                "Questions are already being generated. Please wait.".to_string()
            }
            AppError::Generation(
                GenerationError::MalformedResponse { .. } | GenerationError::BadStatus { .. },
            ) => {
                "Could not generate questions. Please try again.".to_string()
            }
            AppError::Generation(_) => {
                "Error generating questions. Please check your connection and try again."
                    .to_string()
            }
            AppError::Config(e) => e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(StorageError::SerializeFailed {
            source: Box::new(err),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
