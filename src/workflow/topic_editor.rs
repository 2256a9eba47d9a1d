//! 专题编辑流程
//!
//! 草稿来源：手动输入、PDF 抓取、AI 扩充。确认后写入专题存储

use crate::clients::QuestionGenerator;
use crate::error::{AppResult, GenerationError, ValidationError};
use crate::infrastructure::BlobStore;
use crate::models::{PendingTopicEdit, Topic};
use crate::services::pdf_scraper::scrape_pdf_text;
use crate::services::TopicStore;
use crate::utils::logging::truncate_text;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// 单次 AI 扩充最多生成的题目数量
pub const MAX_GENERATE_COUNT: u32 = 50;

/// 把生成数量限制在 1..=50
pub fn clamp_generate_count(count: u32) -> u32 {
    count.clamp(1, MAX_GENERATE_COUNT)
}

/// 构建 AI 扩充用的提示词
pub fn build_expansion_prompt(sample_questions: &str, count: u32) -> String {
    format!(
        "Based on these sample questions, generate {} similar questions for a Year 5 math test. Keep the same style, difficulty level, and format.

Sample questions:
{}

Generate ONLY the questions, one per line, without numbering or explanations.",
        count, sample_questions
    )
}

/// 单槽请求守卫，离开作用域时释放
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 专题编辑器
///
/// 职责：
/// - 持有编辑中的草稿
/// - 同一时间最多一个 AI 扩充请求，第二个直接拒绝
/// - 失败时草稿保持不变
/// - 请求期间换了草稿（新建、编辑、保存）时丢弃生成结果
pub struct TopicEditor<G: QuestionGenerator> {
    generator: G,
    draft: Mutex<PendingTopicEdit>,
    in_flight: AtomicBool,
    /// 每次替换草稿时递增
    revision: AtomicU64,
}

impl<G: QuestionGenerator> TopicEditor<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            draft: Mutex::new(PendingTopicEdit::default()),
            in_flight: AtomicBool::new(false),
            revision: AtomicU64::new(0),
        }
    }

    fn lock_draft(&self) -> MutexGuard<'_, PendingTopicEdit> {
        self.draft
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 替换整个草稿，调用方需持有锁
    fn replace_draft(&self, draft: &mut PendingTopicEdit, next: PendingTopicEdit) {
        *draft = next;
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    /// 当前草稿的快照
    pub fn draft(&self) -> PendingTopicEdit {
        self.lock_draft().clone()
    }

    /// 是否有 AI 请求在进行
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 新建专题：清空草稿
    pub fn begin_create(&self) {
        self.replace_draft(&mut self.lock_draft(), PendingTopicEdit::default());
        info!("✏️ 开始新建专题");
    }

    /// 编辑已有专题
    pub fn begin_edit(&self, topic: &Topic) {
        self.replace_draft(&mut self.lock_draft(), PendingTopicEdit::from_topic(topic));
        info!("✏️ 开始编辑专题: {} ({} 道题)", topic.name, topic.questions.len());
    }

    /// 给已有专题追加题目，草稿内容与 `begin_edit` 相同
    pub fn begin_append(&self, topic: &Topic) {
        self.begin_edit(topic);
    }

    pub fn set_draft_name(&self, name: impl Into<String>) {
        self.lock_draft().draft_name = name.into();
    }

    pub fn set_draft_questions_text(&self, text: impl Into<String>) {
        self.lock_draft().draft_questions_text = text.into();
    }

    /// 把外部文本（例如 PDF 抓取结果）追加到草稿
    pub fn import_text(&self, text: &str) -> usize {
        let added = count_lines(text);
        self.lock_draft().append_text(text);
        info!("📄 已导入 {} 行文本", added);
        added
    }

    /// 抓取 PDF 文本并追加到草稿
    pub fn import_pdf(&self, bytes: &[u8], mime: &str) -> AppResult<usize> {
        let text = scrape_pdf_text(bytes, mime)?;
        Ok(self.import_text(&text))
    }

    /// 请求 AI 按草稿生成相似题目，成功后追加到草稿
    ///
    /// 返回新增的题目行数。`count` 会被限制在 1..=50；
    /// 等待期间草稿被替换时结果作废，返回 0
    pub async fn request_ai_expansion(&self, count: u32) -> AppResult<usize> {
        let (sample_questions, revision) = {
            let draft = self.lock_draft();
            (
                draft.draft_questions_text.clone(),
                self.revision.load(Ordering::Acquire),
            )
        };
        if sample_questions.trim().is_empty() {
            return Err(ValidationError::BlankGenerationSource.into());
        }

        let _guard = match InFlightGuard::acquire(&self.in_flight) {
            Some(guard) => guard,
            None => {
                warn!("已有生成请求在进行，拒绝新的请求");
                return Err(GenerationError::AlreadyInFlight.into());
            }
        };

        let count = clamp_generate_count(count);
        let prompt = build_expansion_prompt(&sample_questions, count);
        info!(
            "🤖 请求生成 {} 道相似题目，样题: {}",
            count,
            truncate_text(sample_questions.trim(), 60)
        );

        let generated = match self.generator.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("生成题目失败，草稿保持不变: {}", e);
                return Err(e);
            }
        };

        let mut draft = self.lock_draft();
        if self.revision.load(Ordering::Acquire) != revision {
            warn!("生成期间草稿已更换，丢弃生成结果");
            return Ok(0);
        }
        let added = count_lines(&generated);
        draft.append_text(&generated);
        drop(draft);
        info!("✓ 已追加 {} 道生成的题目", added);
        Ok(added)
    }

    /// 校验草稿并写入专题存储
    ///
    /// 成功后清空草稿并返回专题名称；失败时草稿保持不变
    pub fn commit<S: BlobStore>(&self, store: &mut TopicStore<S>) -> AppResult<String> {
        let draft = self.draft();

        let name = draft.draft_name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTopicName.into());
        }

        let questions = draft.question_lines();
        if questions.is_empty() {
            return Err(ValidationError::EmptyQuestionList.into());
        }

        let topic = Topic::new(name, questions);
        store.upsert(topic, draft.original_name.as_deref())?;

        self.replace_draft(&mut self.lock_draft(), PendingTopicEdit::default());
        Ok(name.to_string())
    }
}

fn count_lines(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}
