use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 题目编号 → 用户原始输入
///
/// 录入时不做任何修剪，只在判分时归一化
pub type AnswerMap = BTreeMap<usize, String>;

/// 单次考试中的一道题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionInstance {
    /// 本次考试内的位置编号，同时作为答案的键
    pub id: usize,
    pub question_text: String,
    /// 为空表示没有标准答案（不计分）
    pub expected_answer: String,
}

impl QuestionInstance {
    pub fn new(id: usize, question_text: impl Into<String>, expected_answer: impl Into<String>) -> Self {
        Self {
            id,
            question_text: question_text.into(),
            expected_answer: expected_answer.into(),
        }
    }

    /// 用户自编专题的题目，没有标准答案
    pub fn ungraded(id: usize, question_text: impl Into<String>) -> Self {
        Self::new(id, question_text, String::new())
    }

    pub fn is_graded(&self) -> bool {
        !self.expected_answer.is_empty()
    }

    /// 修剪并转小写后精确比较
    pub fn is_correct(&self, answer: &str) -> bool {
        self.is_graded() && normalize(answer) == normalize(&self.expected_answer)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 内置默认题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionFamily {
    /// 分数化小数
    FractionToDecimal,
    /// 小数化最简分数
    DecimalToFraction,
    /// 百分数化小数
    PercentToDecimal,
    /// 求某数的百分之几
    PercentOfAmount,
}

impl QuestionFamily {
    pub const ALL: [QuestionFamily; 4] = [
        QuestionFamily::FractionToDecimal,
        QuestionFamily::DecimalToFraction,
        QuestionFamily::PercentToDecimal,
        QuestionFamily::PercentOfAmount,
    ];

    /// 根据题干识别题型
    pub fn classify(question_text: &str) -> Option<Self> {
        if question_text.starts_with("Calculate ") && question_text.contains("% of ") {
            Some(QuestionFamily::PercentOfAmount)
        } else if question_text.ends_with("to a fraction in its simplest form") {
            Some(QuestionFamily::DecimalToFraction)
        } else if question_text.ends_with("% to a decimal") {
            Some(QuestionFamily::PercentToDecimal)
        } else if question_text.starts_with("Convert ")
            && question_text.contains('/')
            && question_text.ends_with(" to a decimal")
        {
            Some(QuestionFamily::FractionToDecimal)
        } else {
            None
        }
    }
}
