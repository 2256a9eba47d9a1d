//! 日志初始化

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// 使用配置中的 `log_level` 初始化日志
pub fn init_with_config(config: &Config) {
    init_with_level(&config.log_level);
}

/// 初始化全局日志订阅者
///
/// 优先读取 `RUST_LOG`，未设置时使用 `default_level`。
/// 重复调用不会报错（测试中每个用例都可能调用一次）。
pub fn init_with_level(default_level: &str) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref(), default_level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// `RUST_LOG` 为空或无法解析时回退到 `default_level`
pub(crate) fn build_filter(rust_log: Option<&str>, default_level: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}
