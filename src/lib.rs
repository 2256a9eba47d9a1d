//! # Mock Test
//!
//! 限时自测的数学小测验：选择或编写专题，随机抽题，倒计时作答，交卷判分
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 不透明的键值存储（`BlobStore`），只暴露 get / set
//! - `clients/` - 外部文本生成服务（`QuestionGenerator`），文本进、文本出
//!
//! ### ② 业务能力层（Services）
//! - `TopicStore` - 专题增删改查，整块写回存储
//! - `question_sampler` - 无放回抽题 / 默认题型生成
//! - `pdf_scraper` - 尽力而为的 PDF 文本抓取
//!
//! ### ③ 流程层（Workflow）
//! - `TestSession` - Idle → Running → Submitted 状态机与判分
//! - `SessionTimer` - 每秒一次的倒计时，时间到自动交卷
//! - `TopicEditor` - 草稿编辑、AI 扩充（单槽）、保存
//!
//! ### ④ 编排层（Orchestration）
//! - `QuizApp` - 持有全部状态，渲染层只和它打交道
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{AnthropicClient, QuestionGenerator};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use models::{PendingTopicEdit, QuestionInstance, Topic};
pub use orchestrator::QuizApp;
pub use services::{LoadResult, TopicStore};
pub use workflow::{QuestionFeedback, ScoreReport, SessionStatus, TestSession, TopicEditor};
