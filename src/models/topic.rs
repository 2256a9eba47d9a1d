use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 专题：一组用户编写的样题
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default = "Utc::now")]
    pub date_modified: DateTime<Utc>,
}

impl Topic {
    pub fn new(name: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            name: name.into(),
            questions,
            date_modified: Utc::now(),
        }
    }

    /// 每行一道题，用于编辑框回显
    pub fn questions_text(&self) -> String {
        self.questions.join("\n")
    }
}

/// 编辑中的专题草稿（不会直接持久化）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTopicEdit {
    pub draft_name: String,
    /// 每行一道题
    pub draft_questions_text: String,
    /// 仅在编辑已有专题时存在，用于区分改名和新建
    pub original_name: Option<String>,
}

impl PendingTopicEdit {
    pub fn from_topic(topic: &Topic) -> Self {
        Self {
            draft_name: topic.name.clone(),
            draft_questions_text: topic.questions_text(),
            original_name: Some(topic.name.clone()),
        }
    }

    /// 按行拆分并去掉空白行，保留原顺序
    pub fn question_lines(&self) -> Vec<String> {
        self.draft_questions_text
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 把一段新文本追加到草稿末尾
    pub fn append_text(&mut self, text: &str) {
        let existing = self.draft_questions_text.trim();
        let addition = text.trim();
        self.draft_questions_text = match (existing.is_empty(), addition.is_empty()) {
            (_, true) => existing.to_string(),
            (true, false) => addition.to_string(),
            (false, false) => format!("{}\n{}", existing, addition),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_lines_skip_blank_and_trim() {
        let edit = PendingTopicEdit {
            draft_name: "Fractions".to_string(),
            draft_questions_text: "  Convert 3/4 to a decimal \n\n   \nConvert 1/2 to a decimal\r\n".to_string(),
            original_name: None,
        };

        assert_eq!(
            edit.question_lines(),
            vec!["Convert 3/4 to a decimal", "Convert 1/2 to a decimal"]
        );
    }

    #[test]
    fn test_append_text_joins_with_newline() {
        let mut edit = PendingTopicEdit {
            draft_questions_text: "What is 25% of 80?\n".to_string(),
            ..Default::default()
        };
        edit.append_text("\nWhat is 10% of 50?\nWhat is 50% of 12?\n");

        assert_eq!(
            edit.draft_questions_text,
            "What is 25% of 80?\nWhat is 10% of 50?\nWhat is 50% of 12?"
        );
    }

    #[test]
    fn test_topic_json_uses_camel_case_date() {
        let topic = Topic::new("Percentages", vec!["Calculate 10% of 100".to_string()]);
        let json = serde_json::to_value(&topic).unwrap();

        assert!(json.get("dateModified").and_then(|v| v.as_str()).is_some());
        assert_eq!(json["questions"][0], "Calculate 10% of 100");
    }

    #[test]
    fn test_topic_without_date_still_parses() {
        let topic: Topic = serde_json::from_str(r#"{"name":"Old","questions":["Q1"]}"#).unwrap();
        assert_eq!(topic.name, "Old");
        assert_eq!(topic.questions, vec!["Q1"]);
    }
}
