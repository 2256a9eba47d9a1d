//! 测验应用 - 编排层
//!
//! ## 职责
//!
//! 持有所有状态并把操作分发到下层：
//! - 专题存储与当前选中的专题
//! - 考试会话与倒计时
//! - 专题编辑器
//!
//! 渲染层只调用这里的方法并展示返回结果

use crate::clients::QuestionGenerator;
use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::infrastructure::BlobStore;
use crate::models::Topic;
use crate::services::{LoadResult, TopicStore};
use crate::utils::logging::{log_score, log_startup};
use crate::workflow::session_timer::shared;
use crate::workflow::{
    clamp_generate_count, lock_session, ScoreReport, SessionStatus, SessionTimer, SharedSession,
    TestSession, TopicEditor,
};
use tracing::{info, warn};

/// 测验应用
pub struct QuizApp<S: BlobStore, G: QuestionGenerator> {
    store: TopicStore<S>,
    selected_topic: Option<String>,
    session: SharedSession,
    timer: SessionTimer,
    editor: TopicEditor<G>,
    generate_count: u32,
}

impl<S: BlobStore, G: QuestionGenerator> QuizApp<S, G> {
    /// 创建应用（不读取存储，需要再调用 `load`）
    pub fn new(config: &Config, blob_store: S, generator: G) -> Self {
        log_startup(config);
        Self {
            store: TopicStore::new(blob_store, config.storage_key.clone()),
            selected_topic: None,
            session: shared(TestSession::new(config.default_duration_minutes)),
            timer: SessionTimer::new(),
            editor: TopicEditor::new(generator),
            generate_count: clamp_generate_count(config.default_generate_count),
        }
    }

    /// 读取专题并选中第一个；没有专题时直接生成一组默认题
    pub fn load(&mut self) -> LoadResult {
        let result = self.store.load();
        self.selected_topic = self.store.topics().first().map(|t| t.name.clone());

        if self.store.topics().is_empty() {
            self.generate();
        }
        result
    }

    // ========== 专题 ==========

    pub fn topics(&self) -> &[Topic] {
        self.store.topics()
    }

    pub fn selected_topic_name(&self) -> Option<&str> {
        self.selected_topic.as_deref()
    }

    /// 当前选中的专题
    pub fn selected_topic(&self) -> Option<&Topic> {
        self.selected_topic
            .as_deref()
            .and_then(|name| self.store.find(name))
    }

    /// 切换选中专题（不会重新抽题）；传 `None` 表示使用默认题
    pub fn select_topic(&mut self, name: Option<&str>) -> AppResult<()> {
        if let Some(name) = name {
            if self.store.find(name).is_none() {
                return Err(ValidationError::UnknownTopic {
                    name: name.to_string(),
                }
                .into());
            }
        }
        self.selected_topic = name.map(str::to_string);
        info!("📚 当前专题: {}", name.unwrap_or("(默认题)"));
        Ok(())
    }

    /// 删除专题；若删除的是当前专题，改选剩下的第一个
    pub fn delete_topic(&mut self, name: &str) -> AppResult<()> {
        self.store.remove(name)?;

        if self.selected_topic.as_deref() == Some(name) {
            self.selected_topic = self.store.topics().first().map(|t| t.name.clone());
        }
        Ok(())
    }

    // ========== 专题编辑 ==========

    pub fn editor(&self) -> &TopicEditor<G> {
        &self.editor
    }

    pub fn begin_create(&self) {
        self.editor.begin_create();
    }

    pub fn begin_edit(&self, name: &str) -> AppResult<()> {
        let topic = self.find_topic(name)?;
        self.editor.begin_edit(topic);
        Ok(())
    }

    /// 给当前选中的专题追加题目
    pub fn begin_append(&self) -> AppResult<()> {
        let name = self.selected_topic.as_deref().unwrap_or_default();
        let topic = self.find_topic(name)?;
        self.editor.begin_append(topic);
        Ok(())
    }

    fn find_topic(&self, name: &str) -> AppResult<&Topic> {
        self.store.find(name).ok_or_else(|| {
            ValidationError::UnknownTopic {
                name: name.to_string(),
            }
            .into()
        })
    }

    pub fn generate_count(&self) -> u32 {
        self.generate_count
    }

    pub fn set_generate_count(&mut self, count: u32) {
        self.generate_count = clamp_generate_count(count);
    }

    /// 用 AI 扩充草稿
    pub async fn request_ai_expansion(&self) -> AppResult<usize> {
        self.editor.request_ai_expansion(self.generate_count).await
    }

    /// 保存草稿为专题，并选中它
    pub fn commit_topic(&mut self) -> AppResult<String> {
        let name = self.editor.commit(&mut self.store)?;
        self.selected_topic = Some(name.clone());
        Ok(name)
    }

    // ========== 考试会话 ==========

    /// 共享的会话句柄（渲染层读取用）
    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// 当前会话的快照
    pub fn snapshot(&self) -> TestSession {
        lock_session(&self.session).clone()
    }

    /// 重新抽题并回到 Idle
    pub fn generate(&mut self) {
        self.timer.cancel();
        let topic = self.selected_topic();
        lock_session(&self.session).generate(topic);
    }

    /// 开始考试并启动倒计时
    pub fn start(&mut self) -> bool {
        let started = {
            let topic = self.selected_topic();
            lock_session(&self.session).start(topic)
        };

        if started && !self.timer.start(self.session.clone()) {
            warn!("倒计时未能启动，需要手动驱动 tick");
        }
        started
    }

    pub fn record_answer(&self, question_id: usize, text: impl Into<String>) {
        lock_session(&self.session).record_answer(question_id, text);
    }

    /// 交卷，返回成绩（不在进行中时返回已有成绩或 `None`）
    pub fn submit(&mut self) -> Option<ScoreReport> {
        self.timer.cancel();
        let report = {
            let mut session = lock_session(&self.session);
            session.submit();
            session.score_report()
        };

        if let Some(report) = &report {
            log_score(report);
        }
        report
    }

    /// 重新开始
    pub fn reset(&mut self) {
        self.generate();
    }

    /// 设置考试时长（分钟）
    pub fn apply_duration(&self, minutes: u32) {
        lock_session(&self.session).apply_duration(minutes);
    }

    pub fn status(&self) -> SessionStatus {
        lock_session(&self.session).status()
    }

    pub fn score_report(&self) -> Option<ScoreReport> {
        lock_session(&self.session).score_report()
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::infrastructure::MemoryBlobStore;
    use std::future::Future;

    struct NoGenerator;

    impl QuestionGenerator for NoGenerator {
        fn generate(&self, _prompt: &str) -> impl Future<Output = AppResult<String>> + Send {
            async { Err(AppError::malformed_response("unused")) }
        }
    }

    fn app_with(blob: Option<&str>) -> QuizApp<MemoryBlobStore, NoGenerator> {
        let store = match blob {
            Some(blob) => MemoryBlobStore::with_entry("quiz-topics", blob),
            None => MemoryBlobStore::new(),
        };
        QuizApp::new(&Config::default(), store, NoGenerator)
    }

    const TWO_TOPICS: &str = r#"[
        {"name":"A","questions":["a1","a2"],"dateModified":"2024-05-01T10:00:00Z"},
        {"name":"B","questions":["b1"],"dateModified":"2024-05-02T10:00:00Z"}
    ]"#;

    #[test]
    fn test_load_without_topics_generates_defaults() {
        let mut app = app_with(None);
        assert_eq!(app.load(), LoadResult::Empty);
        assert!(app.selected_topic_name().is_none());

        let snapshot = app.snapshot();
        assert_eq!(snapshot.questions().len(), 10);
        assert_eq!(snapshot.status(), SessionStatus::Idle);
        assert_eq!(snapshot.remaining_seconds(), 360);
    }

    #[test]
    fn test_load_selects_first_topic() {
        let mut app = app_with(Some(TWO_TOPICS));
        assert!(matches!(app.load(), LoadResult::Topics(ref t) if t.len() == 2));
        assert_eq!(app.selected_topic_name(), Some("A"));
        assert!(app.snapshot().questions().is_empty());
    }

    #[test]
    fn test_delete_selected_topic_reselects_first() {
        let mut app = app_with(Some(TWO_TOPICS));
        app.load();

        app.delete_topic("A").unwrap();
        assert_eq!(app.selected_topic_name(), Some("B"));

        app.delete_topic("B").unwrap();
        assert_eq!(app.selected_topic_name(), None);
    }

    #[test]
    fn test_select_unknown_topic_is_rejected() {
        let mut app = app_with(Some(TWO_TOPICS));
        app.load();

        assert!(app.select_topic(Some("C")).is_err());
        assert_eq!(app.selected_topic_name(), Some("A"));

        app.select_topic(None).unwrap();
        app.generate();
        assert!(app.snapshot().questions().iter().all(|q| q.is_graded()));
    }

    #[test]
    fn test_begin_append_uses_selected_topic() {
        let mut app = app_with(Some(TWO_TOPICS));
        app.load();
        app.select_topic(Some("B")).unwrap();

        app.begin_append().unwrap();
        let draft = app.editor().draft();
        assert_eq!(draft.original_name.as_deref(), Some("B"));
        assert_eq!(draft.draft_questions_text, "b1");

        app.select_topic(None).unwrap();
        assert!(app.begin_append().is_err());
    }

    #[test]
    fn test_generate_count_stays_within_limits() {
        let mut app = app_with(None);
        assert_eq!(app.generate_count(), 10);

        app.set_generate_count(500);
        assert_eq!(app.generate_count(), 50);
        app.set_generate_count(0);
        assert_eq!(app.generate_count(), 1);

        let config = Config {
            default_generate_count: 999,
            ..Config::default()
        };
        let app = QuizApp::new(&config, MemoryBlobStore::new(), NoGenerator);
        assert_eq!(app.generate_count(), 50);
    }

    #[test]
    fn test_submit_from_idle_has_no_report() {
        let mut app = app_with(None);
        app.load();
        assert!(app.submit().is_none());
        assert_eq!(app.status(), SessionStatus::Idle);
    }
}
