//! 抽题服务 - 业务能力层
//!
//! 从专题题库中无放回抽题；没有可用专题时使用内置的四种默认题型

use crate::models::{QuestionFamily, QuestionInstance, Topic};
use phf::phf_map;
use rand::Rng;
use tracing::debug;

/// 每次考试的题目数量
pub const QUESTIONS_PER_TEST: usize = 10;

const FRACTION_DENOMINATORS: [u32; 9] = [2, 4, 5, 8, 10, 20, 25, 50, 100];

const DECIMALS: [&str; 10] = [
    "0.25", "0.5", "0.75", "0.2", "0.4", "0.6", "0.8", "0.1", "0.3", "0.7",
];

/// 小数 → 最简分数
static FRACTIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "0.25" => "1/4",
    "0.5" => "1/2",
    "0.75" => "3/4",
    "0.2" => "1/5",
    "0.4" => "2/5",
    "0.6" => "3/5",
    "0.8" => "4/5",
    "0.1" => "1/10",
    "0.3" => "3/10",
    "0.7" => "7/10",
};

const PERCENT_TO_DECIMAL_CHOICES: [u32; 11] = [10, 20, 25, 30, 40, 50, 60, 70, 75, 80, 90];
const PERCENT_OF_CHOICES: [u32; 5] = [10, 20, 25, 50, 75];
const AMOUNT_CHOICES: [u32; 6] = [100, 200, 400, 500, 800, 1000];

/// 生成一次考试的题目
///
/// 专题不存在或没有题目时退回默认题型
pub fn sample_from_topic<R: Rng + ?Sized>(
    topic: Option<&Topic>,
    rng: &mut R,
) -> Vec<QuestionInstance> {
    let topic = match topic {
        Some(topic) if !topic.questions.is_empty() => topic,
        _ => return sample_default(rng),
    };

    let mut pool = topic.questions.clone();
    let count = QUESTIONS_PER_TEST.min(pool.len());
    let mut instances = Vec::with_capacity(count);

    for id in 0..count {
        let index = rng.gen_range(0..pool.len());
        let question = pool.remove(index);
        instances.push(QuestionInstance::ungraded(id, question));
    }

    debug!(
        "从专题 {} 抽取 {}/{} 道题",
        topic.name,
        instances.len(),
        topic.questions.len()
    );
    instances
}

/// 生成默认题目，每道题独立随机选择题型（可能重复）
pub fn sample_default<R: Rng + ?Sized>(rng: &mut R) -> Vec<QuestionInstance> {
    (0..QUESTIONS_PER_TEST)
        .map(|id| {
            let family = QuestionFamily::ALL[rng.gen_range(0..QuestionFamily::ALL.len())];
            let (question, answer) = generate_family(family, rng);
            QuestionInstance::new(id, question, answer)
        })
        .collect()
}

/// 按题型生成一道题，返回 (题干, 标准答案)
pub fn generate_family<R: Rng + ?Sized>(family: QuestionFamily, rng: &mut R) -> (String, String) {
    match family {
        QuestionFamily::FractionToDecimal => {
            let denominator = pick(&FRACTION_DENOMINATORS, rng);
            let numerator = rng.gen_range(1..denominator);
            fraction_to_decimal(numerator, denominator)
        }
        QuestionFamily::DecimalToFraction => {
            let decimal = pick(&DECIMALS, rng);
            decimal_to_fraction(decimal)
        }
        QuestionFamily::PercentToDecimal => {
            let percent = pick(&PERCENT_TO_DECIMAL_CHOICES, rng);
            percent_to_decimal(percent)
        }
        QuestionFamily::PercentOfAmount => {
            let percent = pick(&PERCENT_OF_CHOICES, rng);
            let amount = pick(&AMOUNT_CHOICES, rng);
            percent_of_amount(percent, amount)
        }
    }
}

fn pick<T: Copy, R: Rng + ?Sized>(choices: &[T], rng: &mut R) -> T {
    choices[rng.gen_range(0..choices.len())]
}

/// 分数化小数：保留两位（四舍五入），去掉末尾的 0 和小数点
pub fn fraction_to_decimal(numerator: u32, denominator: u32) -> (String, String) {
    // 整数运算避免 0.125 之类的“银行家舍入”
    let hundredths = (numerator * 200 + denominator) / (denominator * 2);
    let fixed = format!("{}.{:02}", hundredths / 100, hundredths % 100);
    let answer = fixed.trim_end_matches('0').trim_end_matches('.').to_string();

    (
        format!("Convert {}/{} to a decimal", numerator, denominator),
        answer,
    )
}

/// 小数化最简分数，表中查不到时答案为空（不计分）
pub fn decimal_to_fraction(decimal: &str) -> (String, String) {
    let answer = FRACTIONS.get(decimal).copied().unwrap_or_default();
    (
        format!("Convert {} to a fraction in its simplest form", decimal),
        answer.to_string(),
    )
}

/// 百分数化小数
pub fn percent_to_decimal(percent: u32) -> (String, String) {
    (
        format!("Convert {}% to a decimal", percent),
        (percent as f64 / 100.0).to_string(),
    )
}

/// 求某数的百分之几
pub fn percent_of_amount(percent: u32, amount: u32) -> (String, String) {
    (
        format!("Calculate {}% of {}", percent, amount),
        ((percent as f64 / 100.0) * amount as f64).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn topic_with(count: usize) -> Topic {
        Topic::new(
            "Bank",
            (0..count).map(|i| format!("Question {}", i)).collect(),
        )
    }

    #[test]
    fn test_large_topic_draws_ten_distinct() {
        let topic = topic_with(25);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let instances = sample_from_topic(Some(&topic), &mut rng);

            assert_eq!(instances.len(), QUESTIONS_PER_TEST);
            let distinct: HashSet<_> = instances.iter().map(|q| &q.question_text).collect();
            assert_eq!(distinct.len(), QUESTIONS_PER_TEST);
            assert!(instances.iter().all(|q| q.expected_answer.is_empty()));
            let ids: Vec<usize> = instances.iter().map(|q| q.id).collect();
            assert_eq!(ids, (0..QUESTIONS_PER_TEST).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_small_topic_uses_every_question_once() {
        let topic = topic_with(4);
        let mut rng = StdRng::seed_from_u64(7);
        let instances = sample_from_topic(Some(&topic), &mut rng);

        assert_eq!(instances.len(), 4);
        let drawn: HashSet<_> = instances.iter().map(|q| q.question_text.clone()).collect();
        let expected: HashSet<_> = topic.questions.iter().cloned().collect();
        assert_eq!(drawn, expected);
    }

    #[test]
    fn test_missing_or_empty_topic_falls_back_to_defaults() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty = Topic::new("Empty", Vec::new());

        for topic in [None, Some(&empty)] {
            let instances = sample_from_topic(topic, &mut rng);
            assert_eq!(instances.len(), QUESTIONS_PER_TEST);
            for q in &instances {
                assert!(QuestionFamily::classify(&q.question_text).is_some(), "{}", q.question_text);
                assert!(q.is_graded());
            }
        }
    }

    #[test]
    fn test_fraction_to_decimal_formatting() {
        assert_eq!(
            fraction_to_decimal(1, 4),
            ("Convert 1/4 to a decimal".to_string(), "0.25".to_string())
        );
        assert_eq!(fraction_to_decimal(1, 2).1, "0.5");
        assert_eq!(fraction_to_decimal(3, 10).1, "0.3");
        assert_eq!(fraction_to_decimal(1, 8).1, "0.13");
        assert_eq!(fraction_to_decimal(7, 8).1, "0.88");
        assert_eq!(fraction_to_decimal(99, 100).1, "0.99");
        assert_eq!(fraction_to_decimal(1, 100).1, "0.01");
    }

    #[test]
    fn test_fraction_table_covers_every_decimal() {
        for decimal in DECIMALS {
            assert!(!decimal_to_fraction(decimal).1.is_empty(), "{}", decimal);
        }
        assert_eq!(decimal_to_fraction("0.75").1, "3/4");
        assert_eq!(decimal_to_fraction("0.33").1, "");
    }

    #[test]
    fn test_percent_answers_render_plain_numbers() {
        assert_eq!(percent_to_decimal(10).1, "0.1");
        assert_eq!(percent_to_decimal(25).1, "0.25");
        assert_eq!(percent_to_decimal(30).1, "0.3");
        assert_eq!(percent_to_decimal(70).1, "0.7");
        assert_eq!(
            percent_of_amount(25, 400),
            ("Calculate 25% of 400".to_string(), "100".to_string())
        );
        assert_eq!(percent_of_amount(75, 200).1, "150");
        assert_eq!(percent_of_amount(10, 500).1, "50");
    }

    #[test]
    fn test_generated_fraction_numerator_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let (question, answer) = generate_family(QuestionFamily::FractionToDecimal, &mut rng);
            assert!(question.starts_with("Convert "));
            let value: f64 = answer.parse().unwrap();
            assert!(value > 0.0 && value < 1.0, "{} -> {}", question, answer);
        }
    }
}
