//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! quiz_app (持有全部状态，对外暴露操作)
//!     ↓
//! workflow (TestSession / SessionTimer / TopicEditor)
//!     ↓
//! services (TopicStore / question_sampler / pdf_scraper)
//!     ↓
//! infrastructure / clients (BlobStore / QuestionGenerator)
//! ```

pub mod quiz_app;

pub use quiz_app::QuizApp;
