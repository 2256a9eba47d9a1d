/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use crate::config::Config;
use crate::workflow::ScoreReport;
use tracing::info;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 模拟测验启动");
    info!("📁 存储目录: {}", config.storage_dir);
    info!("⏱️ 默认时长: {} 分钟", config.default_duration_minutes);
    info!("🤖 生成模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

/// 记录交卷成绩
pub fn log_score(report: &ScoreReport) {
    info!("\n{}", "─".repeat(60));
    info!("📊 {}", report);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 把剩余秒数格式化为 `m:ss`
///
/// # 参数
/// - `seconds`: 剩余秒数
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
