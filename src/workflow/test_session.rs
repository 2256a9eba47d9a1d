//! 考试会话状态机 - 流程层
//!
//! 状态流转：
//! 1. Idle（初始 / 刚生成题目）
//! 2. Running（倒计时中）
//! 3. Submitted（已交卷，分数有效）
//!
//! 这里不持有计时器，每秒一次的 `tick` 由 `SessionTimer` 驱动

use crate::models::{AnswerMap, QuestionInstance, Topic};
use crate::services::question_sampler::{sample_from_topic, QUESTIONS_PER_TEST};
use crate::utils::logging::format_time;
use rand::Rng;
use std::fmt;
use tracing::{debug, info, trace};

pub const MIN_DURATION_MINUTES: u32 = 1;
pub const MAX_DURATION_MINUTES: u32 = 120;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Submitted,
}

/// 一次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 不在 Running 状态，什么也没做
    Ignored,
    /// 继续倒计时，附带剩余秒数
    Counting(u32),
    /// 时间到，已自动交卷，附带分数
    AutoSubmitted(usize),
}

/// 单题判分结果（交卷后有效）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionFeedback {
    Correct,
    Incorrect { expected: String },
    /// 没有标准答案
    Ungraded,
}

/// 成绩汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreReport {
    pub score: usize,
    /// 分母固定为每次考试的题目数量，与实际计分题数无关
    pub out_of: usize,
    pub percent: u32,
}

impl ScoreReport {
    fn new(score: usize) -> Self {
        let out_of = QUESTIONS_PER_TEST;
        let percent = ((score as f64 / out_of as f64) * 100.0).round() as u32;
        Self {
            score,
            out_of,
            percent,
        }
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {}/{} ({}%)", self.score, self.out_of, self.percent)
    }
}

/// 考试会话
#[derive(Debug, Clone)]
pub struct TestSession {
    status: SessionStatus,
    remaining_seconds: u32,
    configured_duration_seconds: u32,
    questions: Vec<QuestionInstance>,
    answers: AnswerMap,
    score: usize,
}

impl TestSession {
    pub fn new(duration_minutes: u32) -> Self {
        let configured = clamp_minutes(duration_minutes) * 60;
        Self {
            status: SessionStatus::Idle,
            remaining_seconds: configured,
            configured_duration_seconds: configured,
            questions: Vec::new(),
            answers: AnswerMap::new(),
            score: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn configured_duration_seconds(&self) -> u32 {
        self.configured_duration_seconds
    }

    pub fn questions(&self) -> &[QuestionInstance] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn answer(&self, question_id: usize) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    /// 分数，仅在 Submitted 状态下有意义
    pub fn score(&self) -> usize {
        self.score
    }

    /// 用所选专题重新抽题，并回到 Idle（会停止进行中的倒计时）
    pub fn generate(&mut self, topic: Option<&Topic>) {
        self.generate_with(topic, &mut rand::thread_rng());
    }

    pub fn generate_with<R: Rng + ?Sized>(&mut self, topic: Option<&Topic>, rng: &mut R) {
        let questions = sample_from_topic(topic, rng);
        self.load_questions(questions);
    }

    /// 换上一组新题，清空答案和分数，重置倒计时
    pub fn load_questions(&mut self, questions: Vec<QuestionInstance>) {
        let previous = self.status;
        self.questions = questions;
        self.answers.clear();
        self.score = 0;
        self.remaining_seconds = self.configured_duration_seconds;
        self.status = SessionStatus::Idle;

        info!(
            "📝 已生成 {} 道题，时长 {} 秒 ({:?} → Idle)",
            self.questions.len(),
            self.configured_duration_seconds,
            previous
        );
    }

    /// 开始考试，仅在 Idle 状态下生效
    ///
    /// 还没有题目时先抽题。返回是否真的进入了 Running
    pub fn start(&mut self, topic: Option<&Topic>) -> bool {
        self.start_with(topic, &mut rand::thread_rng())
    }

    pub fn start_with<R: Rng + ?Sized>(&mut self, topic: Option<&Topic>, rng: &mut R) -> bool {
        if self.status != SessionStatus::Idle {
            debug!("当前状态 {:?}，忽略开始请求", self.status);
            return false;
        }

        if self.questions.is_empty() {
            self.generate_with(topic, rng);
        }

        self.status = SessionStatus::Running;
        info!("⏱️ 考试开始，剩余 {} 秒", self.remaining_seconds);
        true
    }

    /// 每秒调用一次
    ///
    /// 倒计时归零时自动交卷
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        trace!("剩余时间 {}", format_time(self.remaining_seconds));

        if self.remaining_seconds == 0 {
            info!("⏰ 时间到，自动交卷");
            self.submit();
            return TickOutcome::AutoSubmitted(self.score);
        }

        TickOutcome::Counting(self.remaining_seconds)
    }

    /// 记录答案（原样保存，不修剪）
    ///
    /// 状态机本身不拒绝非 Running 状态下的写入
    pub fn record_answer(&mut self, question_id: usize, text: impl Into<String>) {
        self.answers.insert(question_id, text.into());
    }

    /// 交卷并判分
    ///
    /// 只有 Running → Submitted 会发生变化，其他状态下是空操作。返回当前分数
    pub fn submit(&mut self) -> usize {
        if self.status != SessionStatus::Running {
            debug!("当前状态 {:?}，忽略交卷请求", self.status);
            return self.score;
        }

        self.score = self
            .questions
            .iter()
            .filter(|q| {
                let answer = self.answers.get(&q.id).map(String::as_str).unwrap_or("");
                q.is_correct(answer)
            })
            .count();
        self.status = SessionStatus::Submitted;

        info!("✅ 已交卷: {}", ScoreReport::new(self.score));
        self.score
    }

    /// 重新开始：等同于重新抽题
    pub fn reset(&mut self, topic: Option<&Topic>) {
        self.generate(topic);
    }

    /// 设置考试时长（分钟，限制在 1 ~ 120），并立即重置剩余时间
    pub fn apply_duration(&mut self, minutes: u32) {
        let clamped = clamp_minutes(minutes);
        if clamped != minutes {
            debug!("时长 {} 分钟超出范围，调整为 {} 分钟", minutes, clamped);
        }
        self.configured_duration_seconds = clamped * 60;
        self.remaining_seconds = self.configured_duration_seconds;
        info!("⚙️ 考试时长设置为 {} 分钟", clamped);
    }

    /// 成绩汇总，未交卷时为 `None`
    pub fn score_report(&self) -> Option<ScoreReport> {
        (self.status == SessionStatus::Submitted).then(|| ScoreReport::new(self.score))
    }

    /// 单题判分结果，未交卷时为 `None`
    pub fn feedback(&self, question_id: usize) -> Option<QuestionFeedback> {
        if self.status != SessionStatus::Submitted {
            return None;
        }
        let question = self.questions.iter().find(|q| q.id == question_id)?;
        if !question.is_graded() {
            return Some(QuestionFeedback::Ungraded);
        }

        let answer = self.answer(question_id).unwrap_or("");
        Some(if question.is_correct(answer) {
            QuestionFeedback::Correct
        } else {
            QuestionFeedback::Incorrect {
                expected: question.expected_answer.clone(),
            }
        })
    }
}

fn clamp_minutes(minutes: u32) -> u32 {
    minutes.clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES)
}
