pub mod question;
pub mod topic;

pub use question::{AnswerMap, QuestionFamily, QuestionInstance};
pub use topic::{PendingTopicEdit, Topic};
