//! 题目生成客户端
//!
//! 封装对外部文本生成服务的调用：文本进，文本出，可能失败

use crate::config::Config;
use crate::error::{AppError, AppResult, GenerationError};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::future::Future;
use tracing::{debug, warn};

/// 文本生成能力
///
/// 职责：
/// - 接收完整的提示词
/// - 返回生成的文本（每行一道题）
/// - 不认识草稿，不关心合并
pub trait QuestionGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Anthropic Messages API 客户端
pub struct AnthropicClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    api_version: String,
    model_name: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// 创建新的生成客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.llm_api_url.clone(),
            api_key: config.llm_api_key.clone(),
            api_version: config.llm_api_version.clone(),
            model_name: config.llm_model_name.clone(),
            max_tokens: config.llm_max_tokens,
        }
    }

    async fn send(&self, prompt: &str) -> AppResult<String> {
        debug!("调用生成服务，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let body = MessagesRequest {
            model: &self.model_name,
            max_tokens: self.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self
            .http
            .post(&self.api_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body);

        if !self.api_key.is_empty() {
            request = request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", &self.api_version);
        }

        let response = request.send().await.map_err(|e| {
            warn!("生成服务请求失败: {}", e);
            AppError::generation_request_failed(&self.api_url, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("生成服务返回错误状态 {}: {}", status, body);
            return Err(GenerationError::BadStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let json: JsonValue = response
            .json()
            .await
            .map_err(|e| AppError::malformed_response(format!("响应不是合法 JSON: {}", e)))?;

        let text = extract_text(&json)?;
        debug!("生成服务调用成功，返回 {} 行", text.lines().count());
        Ok(text)
    }
}

impl QuestionGenerator for AnthropicClient {
    fn generate(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send {
        self.send(prompt)
    }
}

/// 取出 `content[0].text`，缺失或为空都算格式错误
pub fn extract_text(response: &JsonValue) -> AppResult<String> {
    let text = response
        .get("content")
        .and_then(|c| c.get(0))
        .and_then(|first| first.get("text"))
        .and_then(|t| t.as_str())
        .ok_or_else(|| AppError::malformed_response("缺少 content[0].text"))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::malformed_response("content[0].text 为空"));
    }
    Ok(text.to_string())
}
