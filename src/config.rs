use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 本地存储目录（每个键一个文件）
    pub storage_dir: String,
    /// 专题列表使用的存储键
    pub storage_key: String,
    /// 默认考试时长（分钟）
    pub default_duration_minutes: u32,
    /// AI 扩充时默认生成的题目数量
    pub default_generate_count: u32,
    /// 日志级别（RUST_LOG 未设置时使用）
    pub log_level: String,
    // --- LLM 配置 ---
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub llm_api_version: String,
    pub llm_model_name: String,
    pub llm_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: ".mock_test".to_string(),
            storage_key: "quiz-topics".to_string(),
            default_duration_minutes: 6,
            default_generate_count: 10,
            log_level: "info".to_string(),
            llm_api_url: "https://api.anthropic.com/v1/messages".to_string(),
            llm_api_key: String::new(),
            llm_api_version: "2023-06-01".to_string(),
            llm_model_name: "claude-sonnet-4-20250514".to_string(),
            llm_max_tokens: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            storage_dir: std::env::var("MOCK_TEST_STORAGE_DIR").unwrap_or(default.storage_dir),
            storage_key: std::env::var("MOCK_TEST_STORAGE_KEY").unwrap_or(default.storage_key),
            default_duration_minutes: std::env::var("MOCK_TEST_DURATION_MINUTES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_duration_minutes),
            default_generate_count: std::env::var("MOCK_TEST_GENERATE_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_generate_count),
            log_level: std::env::var("MOCK_TEST_LOG_LEVEL").unwrap_or(default.log_level),
            llm_api_url: std::env::var("MOCK_TEST_LLM_API_URL").unwrap_or(default.llm_api_url),
            llm_api_key: std::env::var("MOCK_TEST_LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_version: std::env::var("MOCK_TEST_LLM_API_VERSION").unwrap_or(default.llm_api_version),
            llm_model_name: std::env::var("MOCK_TEST_LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_tokens: std::env::var("MOCK_TEST_LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
        }
    }

    /// 从 TOML 文件加载配置，文件中缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        Self::from_toml_str(&content).map_err(|e| {
            ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            }
            .into()
        })
    }

    fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            default_duration_minutes = 15
            llm_model_name = "claude-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_duration_minutes, 15);
        assert_eq!(config.llm_model_name, "claude-test");
        assert_eq!(config.storage_key, "quiz-topics");
        assert_eq!(config.llm_max_tokens, 1000);
    }

    #[test]
    fn test_configured_log_level_reaches_filter() {
        let config = Config::from_toml_str(r#"log_level = "debug""#).unwrap();
        assert_eq!(config.log_level, "debug");

        let filter = crate::logger::build_filter(None, &config.log_level);
        assert_eq!(
            filter.max_level_hint(),
            Some(tracing_subscriber::filter::LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_missing_toml_file_is_config_error() {
        let result = Config::from_toml_file(Path::new("/nonexistent/mock_test.toml"));
        assert!(matches!(
            result,
            Err(crate::error::AppError::Config(ConfigError::FileReadFailed { .. }))
        ));
    }
}
